//! Bounded, seeded candidate mutation.

use evoarch_core::{Candidate, CandidateId, ParamDomain, ParamValue, SearchSpace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Derives child candidates by mutating a parent inside the search space.
pub struct Evolver {
    space: SearchSpace,
    mutation_rate: f64,
}

impl Evolver {
    /// Create an evolver over `space` mutating roughly `mutation_rate` of
    /// the parameters per step.
    pub fn new(space: SearchSpace, mutation_rate: f64) -> Self {
        Self {
            space,
            mutation_rate,
        }
    }

    /// The space this evolver mutates within.
    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// Produce a child of `parent`.
    ///
    /// Pure in (parent, mutation rate, seed): the same inputs always yield
    /// the same child, including its id. The child's description differs
    /// from the parent's unless every domain holds exactly one value.
    pub fn evolve(&self, parent: &Candidate, seed: u64) -> Candidate {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut description = parent.description.clone();

        // Parameters the parent never had are initialized at their domain
        // default before any mutation is applied.
        for (name, domain) in self.space.iter() {
            if !description.contains_key(name) {
                description.insert(name.clone(), domain.default_value());
            }
        }

        // Only parameters whose domain offers an alternative can mutate.
        let mutable: Vec<(&String, &ParamDomain)> = self
            .space
            .iter()
            .filter(|(_, d)| d.cardinality() > 1)
            .collect();

        if mutable.is_empty() {
            // Degenerate space; the child legally equals its parent.
            let id = CandidateId::from_u128(rng.gen());
            return Candidate::child_of(parent, id, description);
        }

        let count = ((self.mutation_rate * self.space.len() as f64).round() as usize)
            .max(1)
            .min(mutable.len());

        let mut picked = pick_indices(&mut rng, mutable.len(), count);
        picked.sort_unstable();

        for idx in picked {
            let (name, domain) = mutable[idx];
            let current = description.get(name).cloned();
            let next = perturb(&mut rng, domain, current.as_ref());
            debug!(
                "Mutating {}: {:?} -> {}",
                name,
                current.map(|v| v.to_string()),
                next
            );
            description.insert(name.clone(), next);
        }

        let id = CandidateId::from_u128(rng.gen());
        Candidate::child_of(parent, id, description)
    }
}

/// Choose `count` distinct indices out of `len`.
fn pick_indices(rng: &mut StdRng, len: usize, count: usize) -> Vec<usize> {
    let mut all: Vec<usize> = (0..len).collect();
    for i in 0..count {
        let j = rng.gen_range(i..len);
        all.swap(i, j);
    }
    all.truncate(count);
    all
}

/// Draw a new value from `domain` distinct from `current`.
///
/// Integer ranges take a bounded local step (about a tenth of the range)
/// rather than resampling uniformly, so lineages drift instead of jumping.
fn perturb(rng: &mut StdRng, domain: &ParamDomain, current: Option<&ParamValue>) -> ParamValue {
    match domain {
        ParamDomain::IntRange { min, max } => {
            let old = match current {
                Some(ParamValue::Int(v)) if domain.contains(&ParamValue::Int(*v)) => *v,
                _ => match domain.default_value() {
                    ParamValue::Int(v) => v,
                    _ => *min,
                },
            };
            let span = max - min;
            let window = ((span as f64 * 0.1).round() as i64).max(1);
            let lo = (old - window).max(*min);
            let hi = (old + window).min(*max);
            // Sample from [lo, hi] minus {old}; hi > lo because the
            // domain holds at least two values and window >= 1.
            let mut v = lo + rng.gen_range(0..(hi - lo));
            if v >= old {
                v += 1;
            }
            ParamValue::Int(v)
        }
        ParamDomain::Choice(options) => {
            let cur_idx = match current {
                Some(ParamValue::Choice(c)) => options.iter().position(|o| o == c),
                _ => None,
            };
            match cur_idx {
                Some(cur) => {
                    let mut j = rng.gen_range(0..options.len() - 1);
                    if j >= cur {
                        j += 1;
                    }
                    ParamValue::Choice(options[j].clone())
                }
                None => ParamValue::Choice(options[rng.gen_range(0..options.len())].clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn evolver(rate: f64) -> Evolver {
        Evolver::new(SearchSpace::transformer(), rate)
    }

    #[test]
    fn same_seed_yields_identical_children() {
        let evolver = evolver(0.5);
        let parent = evolver.space().seed_candidate();

        let a = evolver.evolve(&parent, 7);
        let b = evolver.evolve(&parent, 7);

        assert_eq!(a.id, b.id);
        assert_eq!(a.description, b.description);
        assert_eq!(a.generation, b.generation);
    }

    #[test]
    fn child_differs_from_parent() {
        let evolver = evolver(0.3);
        let parent = evolver.space().seed_candidate();

        for seed in 0..50 {
            let child = evolver.evolve(&parent, seed);
            assert_ne!(
                child.description, parent.description,
                "seed {} produced an identical child",
                seed
            );
        }
    }

    #[test]
    fn generation_and_parent_link() {
        let evolver = evolver(0.3);
        let parent = evolver.space().seed_candidate();
        let child = evolver.evolve(&parent, 1);
        let grandchild = evolver.evolve(&child, 2);

        assert_eq!(child.generation, 1);
        assert_eq!(child.parent, Some(parent.id));
        assert_eq!(grandchild.generation, 2);
        assert_eq!(grandchild.parent, Some(child.id));
        assert_ne!(child.id, grandchild.id);
    }

    #[test]
    fn degenerate_space_is_allowed_to_repeat() {
        let mut params = BTreeMap::new();
        params.insert(
            "fixed".to_string(),
            ParamDomain::IntRange { min: 4, max: 4 },
        );
        params.insert(
            "only".to_string(),
            ParamDomain::Choice(vec!["x".to_string()]),
        );
        let evolver = Evolver::new(SearchSpace::new(params), 1.0);
        let parent = evolver.space().seed_candidate();

        let child = evolver.evolve(&parent, 3);
        assert_eq!(child.description, parent.description);
        assert_eq!(child.generation, 1);
    }

    #[test]
    fn missing_parameter_is_initialized() {
        let evolver = evolver(0.3);
        let mut parent = evolver.space().seed_candidate();
        parent.description.remove("attention");

        let child = evolver.evolve(&parent, 11);
        let value = child.description.get("attention").expect("filled in");
        assert!(evolver.space().domain("attention").unwrap().contains(value));
    }

    #[test]
    fn full_rate_mutates_every_mutable_parameter() {
        let evolver = evolver(1.0);
        let parent = evolver.space().seed_candidate();
        let child = evolver.evolve(&parent, 5);

        for (name, domain) in evolver.space().iter() {
            if domain.cardinality() > 1 {
                assert_ne!(
                    child.description.get(name),
                    parent.description.get(name),
                    "{} did not change at rate 1.0",
                    name
                );
            }
        }
    }

    proptest! {
        #[test]
        fn children_stay_inside_their_domains(seed in any::<u64>(), rate in 0.05f64..1.0) {
            let evolver = Evolver::new(SearchSpace::transformer(), rate);
            let parent = evolver.space().seed_candidate();
            let child = evolver.evolve(&parent, seed);

            for (name, value) in &child.description {
                let domain = evolver.space().domain(name).expect("declared parameter");
                prop_assert!(domain.contains(value), "{} = {} out of domain", name, value);
            }
        }

        #[test]
        fn evolution_is_deterministic(seed in any::<u64>()) {
            let evolver = Evolver::new(SearchSpace::transformer(), 0.4);
            let parent = evolver.space().seed_candidate();
            prop_assert_eq!(
                evolver.evolve(&parent, seed).description,
                evolver.evolve(&parent, seed).description
            );
        }
    }
}
