//! Word-level Markov chain text generation library.
//!
//! This crate provides the statistical core of a text-posting bot:
//! - A fixed-order Markov model over word tokens (`MarkovChain`)
//! - Incremental training from raw text, one line at a time
//! - Bounded pseudo-random generation with an injectable random source
//! - A JSON persistence format and a binary fast-load cache for training
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core Markov model and generation logic.
///
/// This module exposes the chain interface while keeping internal
/// per-context bookkeeping private.
pub mod model;

/// Typed failure conditions for training, generation and persistence.
pub mod error;

/// I/O utilities (corpus reading, cache path helpers).
///
/// Not exposed
pub(crate) mod io;
