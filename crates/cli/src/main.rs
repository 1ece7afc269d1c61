//! Evoarch CLI - autonomous architecture discovery loop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};

use evoarch_analysis::Analyst;
use evoarch_core::{best_record, CycleRecord, SearchSpace};
use evoarch_eval::{Evaluator, OllamaJudge};
use evoarch_evolve::Evolver;
use evoarch_knowledge::StaticCorpus;
use evoarch_pipeline::{DiscoveryConfig, DiscoveryEngine, PipelineError};
use evoarch_storage::{JsonStore, RunStore};

#[derive(Parser)]
#[command(name = "evoarch")]
#[command(about = "Autonomous architecture discovery loop", long_about = None)]
struct Cli {
    /// Path to the JSON config file; defaults are used if it is absent
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run discovery cycles
    Run {
        /// Number of cycles, overriding the config
        #[arg(long)]
        cycles: Option<usize>,
    },
    /// List the recorded history
    History,
    /// Show the best-known candidate
    Best,
    /// Write a default config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { cycles } => {
            let config = load_config(&cli.config)?;
            let cycles = cycles.unwrap_or(config.num_cycles);
            run_discovery(&config, cycles).await?;
        }
        Commands::History => {
            let config = load_config(&cli.config)?;
            let store = JsonStore::new(&config.database_path).await?;
            let history = store.list().await?;
            println!("History ({} cycles)", history.len());
            for record in &history {
                println!("  {}", record_line(record));
            }
        }
        Commands::Best => {
            let config = load_config(&cli.config)?;
            let store = JsonStore::new(&config.database_path).await?;
            let history = store.list().await?;
            let Some(best) = best_record(&history) else {
                println!("No cycles recorded yet");
                return Ok(());
            };

            println!("Best candidate: {}", best.candidate.id);
            println!("  Iteration: {}", best.iteration);
            println!("  Generation: {}", best.candidate.generation);
            println!("  Score: {:.3} ({})", best.result.score, best.result.provenance);
            println!(
                "  Description: {}",
                serde_json::to_string_pretty(&best.candidate.description_json())?
            );
        }
        Commands::InitConfig => {
            let json = serde_json::to_string_pretty(&DiscoveryConfig::default())?;
            std::fs::write(&cli.config, json)?;
            println!("Wrote default config to {}", cli.config.display());
        }
    }

    Ok(())
}

/// Load the config file, falling back to defaults when it is absent.
/// A present-but-invalid file is fatal before any cycle runs.
fn load_config(path: &PathBuf) -> Result<DiscoveryConfig> {
    if path.exists() {
        Ok(DiscoveryConfig::load(path)?)
    } else {
        info!("No config at {}, using defaults", path.display());
        let config = DiscoveryConfig::default();
        config.validate()?;
        Ok(config)
    }
}

async fn run_discovery(config: &DiscoveryConfig, cycles: usize) -> Result<()> {
    let store = JsonStore::new(&config.database_path).await?;

    let judge = OllamaJudge::new(
        config.judge_url.clone(),
        config.model_name.clone(),
        config.judge_timeout(),
    );
    let mut evaluator = Evaluator::new(judge, config.evaluator_config());
    if config.rag_enabled {
        let corpus = match &config.corpus_path {
            Some(path) => StaticCorpus::with_corpus_file(path).await?,
            None => StaticCorpus::builtin(),
        };
        evaluator = evaluator.with_knowledge(Arc::new(corpus));
    }

    let mut engine = DiscoveryEngine::new(
        store,
        Evolver::new(SearchSpace::transformer(), config.mutation_rate),
        evaluator,
        Analyst::new(config.analyst_config()),
        config.seed,
    );

    match engine.run(cycles).await {
        Ok(history) => {
            print_summary(&history, engine.cycles());
            Ok(())
        }
        Err(PipelineError::Storage { iteration, source }) => {
            let persisted = iteration.saturating_sub(1);
            eprintln!(
                "Run halted: storage failure at iteration {} ({}). \
                 Last persisted iteration: {}",
                iteration, source, persisted
            );
            Err(source.into())
        }
    }
}

fn print_summary(history: &[CycleRecord], ran: usize) {
    println!("Ran {} cycles ({} total in history)", ran, history.len());

    let Some(best) = best_record(history) else {
        println!("No cycles recorded");
        return;
    };
    println!("Best: {}", record_line(best));

    let reason = match history.last().map(|r| &r.recommendation) {
        Some(evoarch_core::Recommendation::Stop) => "stop recommended (target or cap reached)",
        Some(evoarch_core::Recommendation::Refocus(_)) => "completed; search was stagnating",
        _ => "completed requested cycles",
    };
    println!("Stop reason: {}", reason);
}

fn record_line(record: &CycleRecord) -> String {
    let mark = if record.result.is_fallback() {
        " [fallback]"
    } else {
        ""
    };
    format!(
        "{:>4} | gen {:>3} | {:.3}{} | {} | {}",
        record.iteration,
        record.candidate.generation,
        record.result.score,
        mark,
        record.recommendation,
        record.candidate.summary(),
    )
}
