//! Continuations observed after a single context.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

/// Every token seen immediately after one context, in arrival order.
///
/// Duplicates are kept: a token recorded twice is twice as likely to be
/// drawn, so the list doubles as a frequency table.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub(crate) struct Followers {
	tokens: Vec<String>,
}

impl Followers {
	/// Record one observed continuation.
	pub(crate) fn record(&mut self, token: &str) {
		self.tokens.push(token.to_string());
	}

	/// Pick one continuation, weighted by how often each was observed.
	///
	/// # Arguments
	/// * `rng` - Randomness source used for the draw.
	///
	/// # Returns
	/// * `Option<&str>` - A follower, or `None` if nothing was ever recorded.
	pub(crate) fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		self.tokens.choose(rng).map(String::as_str)
	}

	/// Append every continuation from `other`, keeping arrival order.
	pub(crate) fn merge(&mut self, other: &Self) {
		self.tokens.extend_from_slice(&other.tokens);
	}

	/// View the recorded continuations.
	pub(crate) fn as_slice(&self) -> &[String] {
		&self.tokens
	}

	/// True when no continuation was ever recorded.
	pub(crate) fn is_empty(&self) -> bool {
		self.tokens.is_empty()
	}
}
