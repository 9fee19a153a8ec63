//! Top-level module for the Markov generation system.
//!
//! This module provides a word-level Markov text generator, including:
//! - The fixed-order chain itself (`MarkovChain`)
//! - Internal per-context continuation bookkeeping (`Followers`)
//! - Whitespace tokenization shared by training and generation

/// Fixed-order word-level Markov chain.
///
/// Handles line ingestion, start and transition recording, bounded
/// probabilistic generation, persistence and model merging.
pub mod chain;

/// Internal representation of the continuations observed after one context.
///
/// Tracks the follower list and supports frequency-weighted random sampling.
/// This module is not exposed publicly.
mod followers;
