//! The posting bot itself.

use chrono::{TimeDelta, Utc};
use log::{info, trace};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use prattle_core::error::EmptyModelError;
use prattle_core::model::chain::MarkovChain;

use crate::config::Config;
use crate::events::{Engagement, EngagementKind};
use crate::publish::{Post, PublishError, Publisher, Visibility};
use crate::schedule::{StoreError, Throttle};

/// Throttle key of the scheduled top-level post.
const LAST_POST_KEY: &str = "last-post";

/// Canned reply bodies for engagements.
const FAVORITED_REPLY: &str = "glad that one landed";
const BOOSTED_REPLY: &str = "thanks for passing it along";

/// Bounds on the number of lines in one composed status.
const MIN_LINES: usize = 3;
const MAX_LINES: usize = 7;

/// A bot action failed.
#[derive(Debug, Error)]
pub enum BotError {
	#[error(transparent)]
	Empty(#[from] EmptyModelError),

	#[error(transparent)]
	Publish(#[from] PublishError),

	#[error(transparent)]
	Store(#[from] StoreError),
}

/// Markov chain posting bot.
///
/// Owns the trained chain, the outbound publisher and the durable throttle.
/// All behavior is driven from outside: the scheduler calls
/// [`on_interval`](Self::on_interval) and the event feed calls
/// [`on_event`](Self::on_event).
///
/// # Invariants
/// - The throttle only advances after a status was accepted, so a failed
///   attempt is retried on the next tick.
/// - Replies mirror the audience of the engaged status.
pub struct Bot<P: Publisher> {
	chain: MarkovChain,
	publisher: P,
	throttle: Throttle,
	config: Config,
	rng: StdRng,
}

impl<P: Publisher> Bot<P> {
	/// Creates a bot drawing randomness from the operating system.
	pub fn new(chain: MarkovChain, publisher: P, throttle: Throttle, config: Config) -> Self {
		Self::with_rng(chain, publisher, throttle, config, StdRng::from_os_rng())
	}

	/// Creates a bot with a caller-controlled randomness source.
	pub fn with_rng(chain: MarkovChain, publisher: P, throttle: Throttle, config: Config, rng: StdRng) -> Self {
		Self { chain, publisher, throttle, config, rng }
	}

	/// Composes one multi-line status from the chain.
	///
	/// Draws between `MIN_LINES` and `MAX_LINES` generated sequences and
	/// joins them with newlines.
	///
	/// # Errors
	/// Fails when the chain has no training data.
	pub fn compose(&mut self) -> Result<String, EmptyModelError> {
		let line_count = self.rng.random_range(MIN_LINES..=MAX_LINES);
		let mut lines = Vec::with_capacity(line_count);
		for _ in 0..line_count {
			lines.push(self.chain.generate_with(&mut self.rng)?);
		}
		Ok(lines.join("\n"))
	}

	/// Scheduler tick.
	///
	/// Publishes a fresh public status when the posting interval has
	/// elapsed, otherwise does nothing.
	pub fn on_interval(&mut self) -> Result<(), BotError> {
		trace!("interval");

		let interval = TimeDelta::milliseconds(self.config.post_interval as i64);
		if let Some(remaining) = self.throttle.remaining(LAST_POST_KEY, interval)? {
			trace!("not due yet, {}s remaining", remaining.num_seconds());
			return Ok(());
		}

		info!("posting a new creation");
		let text = self.compose()?;
		let receipt = self.publisher.publish(&Post::toplevel(text, Visibility::Public))?;
		trace!("posted as {receipt}");

		self.throttle.mark_ran(LAST_POST_KEY, Utc::now())?;
		Ok(())
	}

	/// Feed event: dispatches one engagement notification.
	pub fn on_event(&mut self, event: &Engagement) -> Result<(), BotError> {
		match event.kind {
			EngagementKind::Favorited => self.on_favorited(event),
			EngagementKind::Boosted => self.on_boosted(event),
		}
	}

	fn on_favorited(&mut self, event: &Engagement) -> Result<(), BotError> {
		info!("favorited by {}", event.acct);
		trace!("favorite of {} at {}", event.status.id, event.created_at);
		self.reply_to(event, FAVORITED_REPLY)
	}

	fn on_boosted(&mut self, event: &Engagement) -> Result<(), BotError> {
		info!("boosted by {}", event.acct);
		trace!("boost of {} at {}", event.status.id, event.created_at);
		self.reply_to(event, BOOSTED_REPLY)
	}

	/// Occasionally thanks the engaging account, mirroring the audience of
	/// the engaged status and threading under it.
	fn reply_to(&mut self, event: &Engagement, body: &str) -> Result<(), BotError> {
		// random_bool rejects probabilities outside [0, 1]
		let chance = self.config.reply_chance.clamp(0.0, 1.0);
		if !self.rng.random_bool(chance) {
			trace!("letting this one pass");
			return Ok(());
		}

		let text = format!("@{} {}", event.acct, body);
		let post = Post::reply(text, event.status.visibility, event.status.id.clone());
		let receipt = self.publisher.publish(&post)?;
		trace!("replied as {receipt}");

		Ok(())
	}
}
