//! The discovery engine - runs the evolve/evaluate/analyse cycle.

use evoarch_analysis::Analyst;
use evoarch_core::{best_record, Candidate, CycleRecord, Recommendation};
use evoarch_eval::{Evaluator, Judge};
use evoarch_evolve::Evolver;
use evoarch_storage::{RunStore, StorageError};
use tracing::{debug, info};

/// Fatal failures of a discovery run. Judge and knowledge failures never
/// reach this level; they are absorbed inside the evaluator.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The run store failed; the loop halts rather than risk losing
    /// history. Records up to `iteration - 1` are persisted.
    #[error("storage failure at iteration {iteration}: {source}")]
    Storage {
        /// Iteration whose write (or the initial load) failed
        iteration: u64,
        /// Underlying store error
        #[source]
        source: StorageError,
    },
}

/// The discovery orchestrator.
///
/// Runs the cycle:
/// ```text
/// Select Parent → Evolve → Evaluate → Analyse → Persist
/// ```
///
/// Exactly one candidate is in flight at a time; every record is durably
/// persisted before the next iteration starts, so a crash mid-run loses
/// at most the in-flight iteration.
pub struct DiscoveryEngine<S: RunStore, J: Judge> {
    store: S,
    evolver: Evolver,
    evaluator: Evaluator<J>,
    analyst: Analyst,
    base_seed: u64,
    cycles_run: usize,
}

impl<S: RunStore, J: Judge> DiscoveryEngine<S, J> {
    /// Assemble an engine from its components. `base_seed` drives the
    /// per-iteration evolution seeds, so a run with the same config and
    /// judge replies replays identically.
    pub fn new(
        store: S,
        evolver: Evolver,
        evaluator: Evaluator<J>,
        analyst: Analyst,
        base_seed: u64,
    ) -> Self {
        Self {
            store,
            evolver,
            evaluator,
            analyst,
            base_seed,
            cycles_run: 0,
        }
    }

    /// Run up to `num_cycles` iterations and return the full ordered
    /// history, including records from earlier runs against the same
    /// store. A `Stop` recommendation ends the run early; that partial
    /// history is a valid result, not an error.
    pub async fn run(&mut self, num_cycles: usize) -> Result<Vec<CycleRecord>, PipelineError> {
        let mut history = self
            .store
            .list()
            .await
            .map_err(|e| PipelineError::Storage {
                iteration: 0,
                source: e,
            })?;

        let mut next_iteration = history.last().map(|r| r.iteration).unwrap_or(0) + 1;
        let mut parent = match best_record(&history) {
            Some(best) => {
                info!(
                    "Resuming from iteration {} (score {:.3})",
                    best.iteration, best.result.score
                );
                best.candidate.clone()
            }
            None => {
                let seed = self.evolver.space().seed_candidate();
                info!("Seeding run: {}", seed.summary());
                seed
            }
        };

        for _ in 0..num_cycles {
            let iteration = next_iteration;
            let record = self.run_cycle(iteration, &parent, &history).await?;
            let stop = record.recommendation == Recommendation::Stop;

            history.push(record);
            next_iteration += 1;
            self.cycles_run += 1;

            if stop {
                info!("Stop recommended at iteration {}", iteration);
                break;
            }

            // Exploit the best lineage seen so far rather than drifting.
            if let Some(best) = best_record(&history) {
                parent = best.candidate.clone();
            }
        }

        Ok(history)
    }

    /// Run one cycle against `parent` and persist its record.
    async fn run_cycle(
        &mut self,
        iteration: u64,
        parent: &Candidate,
        history: &[CycleRecord],
    ) -> Result<CycleRecord, PipelineError> {
        let child = self
            .evolver
            .evolve(parent, self.base_seed.wrapping_add(iteration));
        debug!(
            "Cycle {}: evolved {} (generation {}) from {}",
            iteration, child.id, child.generation, parent.id
        );

        let result = self.evaluator.evaluate(&child).await;
        let recommendation = self.analyst.analyse(&child, &result, history);
        info!(
            "Cycle {}: score {:.3} ({}) -> {}",
            iteration, result.score, result.provenance, recommendation
        );

        let record = CycleRecord {
            iteration,
            candidate: child,
            result,
            recommendation,
        };
        self.store
            .put(&record)
            .await
            .map_err(|e| PipelineError::Storage {
                iteration,
                source: e,
            })?;

        Ok(record)
    }

    /// Cycles run by this engine instance.
    pub fn cycles(&self) -> usize {
        self.cycles_run
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a mutable reference to the store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
