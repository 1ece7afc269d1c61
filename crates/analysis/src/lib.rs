//! Result analysis.
//!
//! Interprets a fresh evaluation against the run history and recommends
//! whether to continue, stop, or refocus. The analyst is a pure function
//! of its inputs; it never touches storage or the network.

#![warn(missing_docs)]

mod analyst;

pub use analyst::{Analyst, AnalystConfig};
