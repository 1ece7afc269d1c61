//! Parameter domains and the search space candidates are drawn from.

use crate::{Candidate, ParamValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared valid domain for one named parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamDomain {
    /// Inclusive integer range
    IntRange {
        /// Smallest allowed value
        min: i64,
        /// Largest allowed value
        max: i64,
    },
    /// Enumerated choice set
    Choice(Vec<String>),
}

impl ParamDomain {
    /// Whether `value` lies inside this domain.
    pub fn contains(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (Self::IntRange { min, max }, ParamValue::Int(v)) => (min..=max).contains(&v),
            (Self::Choice(options), ParamValue::Choice(v)) => options.iter().any(|o| o == v),
            _ => false,
        }
    }

    /// Number of distinct values in the domain.
    pub fn cardinality(&self) -> u64 {
        match self {
            Self::IntRange { min, max } => (max - min + 1).max(0) as u64,
            Self::Choice(options) => options.len() as u64,
        }
    }

    /// Default value used when seeding: mid-range for integers, the first
    /// option for choices.
    pub fn default_value(&self) -> ParamValue {
        match self {
            Self::IntRange { min, max } => ParamValue::Int(min + (max - min) / 2),
            Self::Choice(options) => {
                ParamValue::Choice(options.first().cloned().unwrap_or_default())
            }
        }
    }
}

/// The set of mutable parameters and their domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpace {
    params: BTreeMap<String, ParamDomain>,
}

impl SearchSpace {
    /// Build a space from explicit domains.
    pub fn new(params: BTreeMap<String, ParamDomain>) -> Self {
        Self { params }
    }

    /// Baseline transformer-style space: layer/width/head counts plus an
    /// attention variant.
    pub fn transformer() -> Self {
        let mut params = BTreeMap::new();
        params.insert(
            "hidden_size".to_string(),
            ParamDomain::IntRange { min: 32, max: 2048 },
        );
        params.insert(
            "num_layers".to_string(),
            ParamDomain::IntRange { min: 1, max: 48 },
        );
        params.insert(
            "num_heads".to_string(),
            ParamDomain::IntRange { min: 1, max: 32 },
        );
        params.insert(
            "attention".to_string(),
            ParamDomain::Choice(vec![
                "softmax".to_string(),
                "linear".to_string(),
                "sliding_window".to_string(),
            ]),
        );
        Self { params }
    }

    /// Seed candidate at every domain's default value.
    pub fn seed_candidate(&self) -> Candidate {
        let description = self
            .params
            .iter()
            .map(|(name, domain)| (name.clone(), domain.default_value()))
            .collect();
        Candidate::seed(description)
    }

    /// Domain for `name`, if declared.
    pub fn domain(&self, name: &str) -> Option<&ParamDomain> {
        self.params.get(name)
    }

    /// Iterate domains in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamDomain)> {
        self.params.iter()
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the space declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// True when no domain offers more than one value, so mutation cannot
    /// change anything.
    pub fn is_degenerate(&self) -> bool {
        self.params.values().all(|d| d.cardinality() <= 1)
    }
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self::transformer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_range_membership() {
        let domain = ParamDomain::IntRange { min: 1, max: 48 };
        assert!(domain.contains(&ParamValue::Int(1)));
        assert!(domain.contains(&ParamValue::Int(48)));
        assert!(!domain.contains(&ParamValue::Int(0)));
        assert!(!domain.contains(&ParamValue::Choice("1".to_string())));
    }

    #[test]
    fn choice_membership() {
        let domain = ParamDomain::Choice(vec!["a".to_string(), "b".to_string()]);
        assert!(domain.contains(&ParamValue::Choice("a".to_string())));
        assert!(!domain.contains(&ParamValue::Choice("c".to_string())));
        assert_eq!(domain.cardinality(), 2);
    }

    #[test]
    fn seed_sits_inside_every_domain() {
        let space = SearchSpace::transformer();
        let seed = space.seed_candidate();
        for (name, domain) in space.iter() {
            let value = seed.description.get(name).expect("seed covers all params");
            assert!(domain.contains(value), "{} out of domain", name);
        }
        assert_eq!(seed.generation, 0);
    }

    #[test]
    fn degenerate_space_detection() {
        let mut params = BTreeMap::new();
        params.insert(
            "fixed".to_string(),
            ParamDomain::IntRange { min: 7, max: 7 },
        );
        params.insert(
            "only".to_string(),
            ParamDomain::Choice(vec!["x".to_string()]),
        );
        assert!(SearchSpace::new(params).is_degenerate());
        assert!(!SearchSpace::transformer().is_degenerate());
    }
}
