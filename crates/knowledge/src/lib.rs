//! Knowledge retrieval for prompt enrichment.
//!
//! The evaluator asks this crate for short contextual snippets about a
//! candidate before prompting the judge. The reference implementation is
//! a static corpus with keyword-overlap ranking; a real deployment would
//! plug in a vector index behind the same trait.

#![warn(missing_docs)]

mod service;

pub use service::{KnowledgeService, StaticCorpus};
