use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EmptyModelError, LoadError, OrderMismatch};
use crate::io::{build_output_path, read_lines};
use super::followers::Followers;

/// Splits a line into word tokens on runs of whitespace.
///
/// Leading and trailing whitespace is discarded and consecutive separators
/// collapse, so the result never contains an empty token.
pub fn tokenize(line: &str) -> Vec<&str> {
	line.split_whitespace().collect()
}

/// Word-level Markov chain of fixed order.
///
/// For each context of `order` consecutive tokens the chain stores every
/// token observed immediately after it, plus the list of openings that
/// ingested lines began with. Generation walks those observations.
///
/// # Responsibilities
/// - Ingest lines of text and accumulate transitions
/// - Generate new sequences by frequency-weighted random walk
/// - Persist to and restore from a JSON document
/// - Merge with another chain of the same order
///
/// # Invariants
/// - Context keys hold exactly `order` tokens joined by single spaces
/// - Follower lists are never empty
/// - `starts` gains one entry per ingested line of at least `order` tokens
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkovChain {
	/// Number of consecutive tokens forming one context
	order: usize,

	/// Upper bound on tokens appended beyond the opening
	max_length: usize,

	/// Observed continuations, keyed by space-joined context
	transitions: HashMap<String, Followers>,

	/// Openings recorded from ingested lines, duplicates kept
	starts: Vec<String>,
}

impl MarkovChain {
	/// Creates an empty chain with the given context size and growth bound.
	pub fn new(order: usize, max_length: usize) -> Self {
		Self {
			order,
			max_length,
			transitions: HashMap::new(),
			starts: Vec::new(),
		}
	}

	/// Number of consecutive tokens forming one context.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Upper bound on tokens appended beyond the opening.
	pub fn max_length(&self) -> usize {
		self.max_length
	}

	/// Read-only view of the recorded openings.
	///
	/// One entry per successfully ingested line, duplicates kept, so the
	/// slice doubles as a frequency table over openings.
	pub fn starts(&self) -> &[String] {
		&self.starts
	}

	/// Continuations observed after `context`, in arrival order.
	///
	/// Returns `None` for a context that was never continued, which is how
	/// terminal tokens appear. An empty list is never returned.
	pub fn followers(&self, context: &str) -> Option<&[String]> {
		self.transitions.get(context).map(Followers::as_slice)
	}

	/// Number of distinct contexts with at least one observed continuation.
	pub fn context_count(&self) -> usize {
		self.transitions.len()
	}

	/// True until a line was successfully ingested.
	pub fn is_empty(&self) -> bool {
		self.starts.is_empty()
	}

	/// Ingests one line of training text.
	///
	/// # Parameters
	/// - `line`: Raw text; tokens are separated by runs of whitespace.
	///
	/// # Returns
	/// - `true` when the line contributed an opening.
	/// - `false` when it held fewer than `order` tokens and was discarded.
	///
	/// # Behavior
	/// - Records the first `order` tokens as one opening.
	/// - Slides a window of `order + 1` tokens over the line and records the
	///   final token of each window as a follower of the preceding context.
	///
	/// # Notes
	/// - A line of exactly `order` tokens yields an opening but no transition.
	/// - Tokens are stored verbatim, punctuation and casing included.
	pub fn feed(&mut self, line: &str) -> bool {
		let tokens = tokenize(line);
		if tokens.len() < self.order {
			// Too short, not even an opening to record
			return false;
		}

		self.starts.push(tokens[..self.order].join(" "));

		// Each window pairs one context with the token observed after it
		for window in tokens.windows(self.order + 1) {
			let context = window[..self.order].join(" ");
			self.transitions.entry(context).or_default().record(window[self.order]);
		}

		true
	}

	/// Generates one sequence from the chain.
	///
	/// Starts from a uniformly drawn opening, then repeatedly draws one of
	/// the observed followers of the trailing `order` tokens until
	/// `max_length` tokens were appended or the walk hits a context that was
	/// never continued.
	///
	/// # Errors
	/// Returns [`EmptyModelError`] if no line was ever ingested.
	pub fn generate(&self) -> Result<String, EmptyModelError> {
		self.generate_with(&mut rand::rng())
	}

	/// Generates one sequence using a caller-provided randomness source.
	///
	/// Same walk as [`generate`](Self::generate) with the draw sequence
	/// under the caller's control, so a seeded source reproduces a run
	/// exactly.
	///
	/// # Errors
	/// Returns [`EmptyModelError`] if no line was ever ingested.
	pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, EmptyModelError> {
		let opening = self.starts.choose(rng).ok_or(EmptyModelError)?;
		let mut output: Vec<String> = tokenize(opening).into_iter().map(String::from).collect();

		for _ in 0..self.max_length {
			let context = output[output.len().saturating_sub(self.order)..].join(" ");
			match self.transitions.get(&context).and_then(|followers| followers.choose(rng)) {
				Some(token) => output.push(token.to_string()),
				// Dead end, nothing was ever observed after this context
				None => break,
			}
		}

		Ok(output.join(" "))
	}

	/// Serializes the chain to a pretty-printed JSON document.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string_pretty(self)
	}

	/// Rebuilds a chain from a document produced by [`to_json`](Self::to_json).
	///
	/// The document is checked after parsing: bounds must be positive, every
	/// transitions key and every starts entry must hold exactly `order`
	/// tokens, and no follower list may be empty.
	///
	/// # Errors
	/// Returns a [`DecodeError`] describing the first violation found.
	pub fn from_json(document: &str) -> Result<Self, DecodeError> {
		let chain: Self = serde_json::from_str(document)?;
		chain.validate()?;
		Ok(chain)
	}

	/// Checks the structural invariants of a freshly parsed chain.
	fn validate(&self) -> Result<(), DecodeError> {
		if self.order == 0 || self.max_length == 0 {
			return Err(DecodeError::InvalidBounds { order: self.order, max_length: self.max_length });
		}

		for (context, followers) in &self.transitions {
			let found = tokenize(context).len();
			if found != self.order {
				return Err(DecodeError::ContextArity {
					context: context.clone(),
					found,
					expected: self.order,
				});
			}
			if followers.is_empty() {
				return Err(DecodeError::EmptyFollowers(context.clone()));
			}
		}

		for start in &self.starts {
			let found = tokenize(start).len();
			if found != self.order {
				return Err(DecodeError::StartArity {
					context: start.clone(),
					found,
					expected: self.order,
				});
			}
		}

		Ok(())
	}

	/// Merges another chain into this one.
	///
	/// # Notes
	/// - Both chains must have the same `order`.
	/// - Follower lists are concatenated and openings appended, so relative
	///   frequencies from both sides are preserved.
	/// - `max_length` keeps the receiver's value.
	///
	/// # Errors
	/// Returns an [`OrderMismatch`] if the orders differ; the receiver is
	/// left untouched in that case.
	pub fn merge(&mut self, other: &Self) -> Result<(), OrderMismatch> {
		if self.order != other.order {
			return Err(OrderMismatch { ours: self.order, theirs: other.order });
		}

		for (context, followers) in &other.transitions {
			self.transitions.entry(context.clone()).or_default().merge(followers);
		}
		self.starts.extend_from_slice(&other.starts);

		Ok(())
	}

	/// Loads a chain from a JSON document on disk.
	///
	/// # Errors
	/// Returns a [`LoadError`] if the file cannot be read or the document
	/// fails to decode.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
		let document = fs::read_to_string(path)?;
		Ok(Self::from_json(&document)?)
	}

	/// Builds a chain from a corpus file, one training line per text line.
	///
	/// A binary snapshot is written next to the corpus for fast reloading.
	/// When a snapshot trained with the same `order` and `max_length`
	/// already exists it is loaded instead of retraining; a snapshot with
	/// different bounds is rebuilt and overwritten.
	///
	/// # Parameters
	/// - `path`: Input corpus file.
	/// - `order`: Number of consecutive tokens forming one context.
	/// - `max_length`: Upper bound on tokens appended beyond the opening.
	///
	/// # Behavior
	/// - Splits corpus lines into chunks (based on CPU cores * factor).
	/// - Spawns threads training a partial chain per chunk.
	/// - Merges all partial chains sequentially.
	/// - Serializes the merged chain to the snapshot for future fast loading.
	///
	/// # Notes
	/// - Uses MPSC channels to collect partial chains from threads.
	/// - Follower frequencies come out identical however lines are chunked.
	///
	/// # Errors
	/// Returns a [`LoadError`] if file I/O, snapshot decoding or merging fails.
	pub fn from_corpus<P: AsRef<Path>>(path: P, order: usize, max_length: usize) -> Result<Self, LoadError> {
		let snapshot_path = build_output_path(&path, "bin")?;
		if snapshot_path.exists() {
			let bytes = fs::read(&snapshot_path)?;
			let chain: Self = postcard::from_bytes(&bytes)?;
			if chain.order == order && chain.max_length == max_length {
				return Ok(chain);
			}
			// Bounds changed since the snapshot was trained, rebuild it
		}

		let lines = read_lines(&path)?;
		let mut chain = Self::new(order, max_length);
		if lines.is_empty() {
			// Nothing to train on, also nothing worth snapshotting
			return Ok(chain);
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = lines.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		for chunk in lines.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();

			thread::spawn(move || {
				let mut partial = MarkovChain::new(order, max_length);
				for line in chunk {
					partial.feed(&line);
				}
				tx.send(partial).expect("Failed to send from thread");
			});
		}
		drop(tx);

		for partial in rx.iter() {
			chain.merge(&partial)?;
		}

		let bytes = postcard::to_stdvec(&chain)?;
		fs::write(snapshot_path, bytes)?;

		Ok(chain)
	}
}


#[cfg(test)]
mod proptests {
	use super::*;
	use proptest::prelude::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	proptest! {
		#[test]
		fn short_lines_never_mutate_the_chain(line in "[a-z]{0,6}", order in 2usize..5) {
			let mut chain = MarkovChain::new(order, 4);
			// At most one token, always below the context arity
			prop_assert!(!chain.feed(&line));
			prop_assert!(chain.is_empty());
			prop_assert_eq!(chain.context_count(), 0);
		}

		#[test]
		fn generated_length_stays_within_bounds(
			lines in proptest::collection::vec("[a-z]{1,4}( [a-z]{1,4}){0,7}", 1..6),
			max_length in 1usize..8,
			seed in any::<u64>(),
		) {
			let mut chain = MarkovChain::new(1, max_length);
			for line in &lines {
				chain.feed(line);
			}

			let mut rng = StdRng::seed_from_u64(seed);
			let sequence = chain.generate_with(&mut rng).unwrap();
			let count = tokenize(&sequence).len();
			prop_assert!(count >= 1 && count <= 1 + max_length);
		}
	}
}
