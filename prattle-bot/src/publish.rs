//! Outbound side of the bot.

use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audience of a status, mirroring the usual fediverse levels.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
	Public,
	Unlisted,
	Private,
	Direct,
}

impl fmt::Display for Visibility {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Public => "public",
			Self::Unlisted => "unlisted",
			Self::Private => "private",
			Self::Direct => "direct",
		};
		write!(f, "{name}")
	}
}

/// Server-side identifier of a published status.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct PostId(pub String);

impl fmt::Display for PostId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// One status ready to go out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
	pub text: String,
	pub visibility: Visibility,
	pub in_reply_to: Option<PostId>,
}

impl Post {
	/// A fresh top-level status.
	pub fn toplevel(text: String, visibility: Visibility) -> Self {
		Self { text, visibility, in_reply_to: None }
	}

	/// A reply threaded under an existing status.
	pub fn reply(text: String, visibility: Visibility, parent: PostId) -> Self {
		Self { text, visibility, in_reply_to: Some(parent) }
	}
}

/// A status could not be sent.
#[derive(Debug, Error)]
pub enum PublishError {
	#[error("i/o failure: {0}")]
	Io(#[from] io::Error),

	/// The receiving end refused the status.
	#[error("status rejected: {0}")]
	Rejected(String),
}

/// Where composed statuses land.
///
/// The bot only ever talks to this trait, so the same behavior drives a
/// real server connection, a terminal, or a test buffer.
pub trait Publisher {
	/// Sends one status and returns its assigned identifier.
	fn publish(&mut self, post: &Post) -> Result<PostId, PublishError>;
}

/// Publisher writing statuses to a local sink, assigning sequential ids.
///
/// Serves dry runs and deployments with no server wired up.
pub struct ConsolePublisher<W: Write> {
	sink: W,
	sequence: u64,
}

impl ConsolePublisher<io::Stdout> {
	/// Publisher printing to standard output.
	pub fn stdout() -> Self {
		Self::new(io::stdout())
	}
}

impl<W: Write> ConsolePublisher<W> {
	pub fn new(sink: W) -> Self {
		Self { sink, sequence: 0 }
	}

	/// Consumes the publisher and hands the sink back.
	#[allow(dead_code)]
	pub fn into_inner(self) -> W {
		self.sink
	}
}

impl<W: Write> Publisher for ConsolePublisher<W> {
	fn publish(&mut self, post: &Post) -> Result<PostId, PublishError> {
		self.sequence += 1;
		let id = PostId(self.sequence.to_string());

		match &post.in_reply_to {
			Some(parent) => writeln!(self.sink, "--- {} ({}, reply to {}) ---", id, post.visibility, parent)?,
			None => writeln!(self.sink, "--- {} ({}) ---", id, post.visibility)?,
		}
		writeln!(self.sink, "{}", post.text)?;
		self.sink.flush()?;

		Ok(id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn console_publisher_assigns_sequential_ids() {
		let mut publisher = ConsolePublisher::new(Vec::new());
		let first = publisher.publish(&Post::toplevel("one".into(), Visibility::Public)).unwrap();
		let second = publisher.publish(&Post::toplevel("two".into(), Visibility::Public)).unwrap();
		assert_eq!(first, PostId("1".into()));
		assert_eq!(second, PostId("2".into()));
	}

	#[test]
	fn console_publisher_writes_text_and_audience() {
		let mut publisher = ConsolePublisher::new(Vec::new());
		publisher.publish(&Post::toplevel("hello there".into(), Visibility::Unlisted)).unwrap();

		let written = String::from_utf8(publisher.into_inner()).unwrap();
		assert!(written.contains("--- 1 (unlisted) ---"));
		assert!(written.contains("hello there"));
	}

	#[test]
	fn console_publisher_marks_replies() {
		let mut publisher = ConsolePublisher::new(Vec::new());
		let post = Post::reply("welcome".into(), Visibility::Direct, PostId("77".into()));
		publisher.publish(&post).unwrap();

		let written = String::from_utf8(publisher.into_inner()).unwrap();
		assert!(written.contains("--- 1 (direct, reply to 77) ---"));
	}
}
