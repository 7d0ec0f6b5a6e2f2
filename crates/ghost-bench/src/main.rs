use std::path::PathBuf;

use clap::Parser;

use ghost_bench::config::{BenchmarkConfig, ResolvedOutputs};
use ghost_bench::logging::init_logging;
use ghost_bench::runner::BenchRunner;

/// Benchmarking harness for ghost-hunting bots.
#[derive(Debug, Parser)]
#[command(
    name = "ghost-bench",
    author,
    version,
    about = "Deterministic ghost-hunting benchmark harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "bench/bench.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    /// Override the number of episodes per agent.
    #[arg(long, value_name = "COUNT")]
    episodes: Option<usize>,

    /// Override the RNG seed for episode generation.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Exit after validating the configuration (no episodes are played).
    #[arg(long)]
    validate_only: bool,

    /// Trace every belief update regardless of config.
    #[arg(long)]
    log_belief_details: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = BenchmarkConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    if let Some(episodes) = cli.episodes {
        config.episodes.count = episodes;
    }

    if let Some(seed) = cli.seed {
        config.episodes.seed = Some(seed);
    }

    if cli.log_belief_details {
        config.logging.belief_details = true;
    }

    config.validate()?;

    let outputs: ResolvedOutputs = config.resolved_outputs();
    let agent_count = config.agents.len();
    let run_id = config.run_id.clone();
    let episodes = config.episodes.count;
    let grid = format!("{}x{}", config.session.rows, config.session.cols);

    println!(
        "Loaded configuration '{run_id}' with {agent_count} agent{} ({episodes} episodes on a {grid} grid)",
        if agent_count == 1 { "" } else { "s" }
    );

    if cli.validate_only {
        BenchRunner::new(config, outputs)?;
        println!("Validation-only mode: benchmark execution skipped.");
        return Ok(());
    }

    let logging_guard = init_logging(&config.logging, &outputs)?;
    let runner = BenchRunner::new(config, outputs)?;

    let mut summary = runner.run()?;
    // Flushes buffered log lines before they are summarised.
    drop(logging_guard);
    runner.summarise_telemetry(&mut summary)?;
    println!(
        "Benchmark complete for '{run_id}': {} episodes × {} agents → {} rows at {}",
        summary.episodes_played,
        summary.agents,
        summary.rows_written,
        summary.jsonl_path.display()
    );
    println!("Summary table: {}", summary.summary_path.display());
    if let Some(telemetry_path) = summary.telemetry_path.as_ref() {
        println!("Telemetry log: {}", telemetry_path.display());
    }
    if let Some(outputs) = summary.telemetry_outputs.as_ref() {
        println!("Telemetry summary (JSON): {}", outputs.json_path.display());
        println!(
            "Telemetry summary (Markdown): {}",
            outputs.markdown_path.display()
        );
        println!(
            "  Decisions: {} events, {} belief resets",
            outputs.summary.decisions.count, outputs.summary.belief.resets
        );
        if !outputs.summary.episodes.status_counts.is_empty() {
            println!(
                "  Outcomes: {:?}",
                outputs.summary.episodes.status_counts
            );
        }
    }

    Ok(())
}
