use thiserror::Error;

/// Generation was requested from a model with no training data.
///
/// A chain with an empty `starts` list has nowhere to begin a walk. This is
/// an expected condition (a freshly constructed or wrongly loaded model) and
/// is reported to the caller rather than recovered internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("model has no training data")]
pub struct EmptyModelError;

/// A persisted model document could not be decoded.
///
/// Raised by [`MarkovChain::from_json`](crate::model::chain::MarkovChain::from_json)
/// for syntactically broken documents, documents with missing or wrongly
/// shaped fields, and documents that break the model invariants. A caller
/// loading its only model at startup should treat this as fatal.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// Not valid JSON, missing fields, or fields of the wrong shape.
	#[error("malformed model document: {0}")]
	Malformed(#[from] serde_json::Error),

	/// `order` or `maxLength` was zero.
	#[error("order and maxLength must be positive (order={order}, maxLength={max_length})")]
	InvalidBounds { order: usize, max_length: usize },

	/// A transitions key does not consist of exactly `order` tokens.
	#[error("transition context `{context}` has {found} tokens, expected {expected}")]
	ContextArity {
		context: String,
		found: usize,
		expected: usize,
	},

	/// A transitions entry mapped to an empty follower list. Absence of a
	/// context means "no observed continuation"; an empty list is never
	/// written and never accepted.
	#[error("transition context `{0}` has an empty follower list")]
	EmptyFollowers(String),

	/// A starts entry does not consist of exactly `order` tokens.
	#[error("start context `{context}` has {found} tokens, expected {expected}")]
	StartArity {
		context: String,
		found: usize,
		expected: usize,
	},
}

/// Two chains of different order cannot be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot merge chains of different order ({ours} vs {theirs})")]
pub struct OrderMismatch {
	pub ours: usize,
	pub theirs: usize,
}

/// A model could not be loaded or built from a file.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("i/o failure: {0}")]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Decode(#[from] DecodeError),

	/// The binary training cache could not be read or written.
	#[error("binary cache failure: {0}")]
	Cache(#[from] postcard::Error),

	#[error(transparent)]
	Merge(#[from] OrderMismatch),
}
