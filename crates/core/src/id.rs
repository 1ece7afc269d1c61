//! Unique identifiers for evoarch entities.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique identifier for a Candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CandidateId(Ulid);

impl CandidateId {
    /// Generate a new CandidateId
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Build an id from raw bits. The evolver mints child ids from its
    /// seeded RNG so that evolution is replayable.
    pub fn from_u128(bits: u128) -> Self {
        Self(Ulid(bits))
    }

    /// Raw bits of the id. Fallback scoring folds these into its seed.
    pub fn as_u128(&self) -> u128 {
        self.0 .0
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for CandidateId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}
