//! Candidate designs under evaluation.

use crate::{CandidateId, Time};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value of a single named design parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer-valued parameter (layer counts, widths, ...)
    Int(i64),
    /// One of an enumerated set of named choices
    Choice(String),
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => v.fmt(f),
            Self::Choice(v) => v.fmt(f),
        }
    }
}

/// One proposed design description.
///
/// Candidates are immutable once created. A candidate either seeds a run
/// (generation 0, no parent) or was derived from a parent by the evolver;
/// the parent link is a back-reference by id only, resolved through the
/// run store when the full lineage is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Unique identifier
    pub id: CandidateId,
    /// Named design parameters
    pub description: BTreeMap<String, ParamValue>,
    /// Derivation depth; 0 for seeds
    pub generation: u32,
    /// Candidate this one was derived from, if any
    pub parent: Option<CandidateId>,
    /// Creation timestamp
    pub created_at: Time,
}

impl Candidate {
    /// Create a seed candidate (generation 0, no parent).
    pub fn seed(description: BTreeMap<String, ParamValue>) -> Self {
        Self {
            id: CandidateId::new(),
            description,
            generation: 0,
            parent: None,
            created_at: chrono::Utc::now(),
        }
    }

    /// Create a child derived from `parent` with a pre-minted id.
    pub fn child_of(
        parent: &Candidate,
        id: CandidateId,
        description: BTreeMap<String, ParamValue>,
    ) -> Self {
        Self {
            id,
            description,
            generation: parent.generation + 1,
            parent: Some(parent.id),
            created_at: chrono::Utc::now(),
        }
    }

    /// Render the description as a JSON object, for prompts and display.
    pub fn description_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.description).unwrap_or(serde_json::Value::Null)
    }

    /// Short `name=value` listing, for log lines.
    pub fn summary(&self) -> String {
        self.description
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description() -> BTreeMap<String, ParamValue> {
        let mut d = BTreeMap::new();
        d.insert("num_layers".to_string(), ParamValue::Int(6));
        d.insert("attention".to_string(), ParamValue::Choice("linear".to_string()));
        d
    }

    #[test]
    fn seed_has_no_parent() {
        let seed = Candidate::seed(description());
        assert_eq!(seed.generation, 0);
        assert!(seed.parent.is_none());
    }

    #[test]
    fn child_links_back_to_parent() {
        let seed = Candidate::seed(description());
        let child = Candidate::child_of(&seed, CandidateId::new(), description());
        assert_eq!(child.generation, 1);
        assert_eq!(child.parent, Some(seed.id));
    }

    #[test]
    fn description_serializes_untagged() {
        let seed = Candidate::seed(description());
        let json = seed.description_json();
        assert_eq!(json["num_layers"], 6);
        assert_eq!(json["attention"], "linear");
    }
}
