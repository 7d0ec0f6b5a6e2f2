use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use ghost_bot::{BotKind, BotParams, EpisodeOutcome, build_policy, play_episode};
use ghost_core::game::config::ConfigError as SessionConfigError;
use ghost_core::game::session::{GameSession, SessionStatus};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{AgentConfig, BenchmarkConfig, ResolvedOutputs, ValidationError};
use crate::telemetry::{
    TelemetryError, TelemetryOutputs, append_highlights_to_markdown, write_summary_outputs,
};

/// Plays every configured agent against the same sequence of seeded sessions.
pub struct BenchRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub episodes_played: usize,
    pub agents: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
    pub telemetry_outputs: Option<TelemetryOutputs>,
}

impl BenchRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        config.session.validate()?;
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
        })
    }

    /// Execute the benchmark, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.episodes.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config)?;

        for episode_index in 0..self.config.episodes.count {
            let episode_seed = rng.next_u64();

            for agent in &self.agents {
                let start = Instant::now();
                let outcome = self.play_agent(agent, episode_seed)?;
                let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

                analytics.record_episode(&agent.name, &outcome)?;

                let row = EpisodeLogRow::new(
                    &self.config.run_id,
                    episode_index,
                    episode_seed,
                    agent,
                    &outcome,
                    elapsed_ms,
                );
                serde_json::to_writer(&mut writer, &row)?;
                writer.write_all(b"\n")?;
                rows_written += 1;

                if self.logging_enabled && tracing::enabled!(Level::INFO) {
                    event!(
                        target: "ghost_bench::episode",
                        Level::INFO,
                        run_id = %self.config.run_id,
                        episode_index = episode_index as u64,
                        agent = %agent.name,
                        status = %outcome.status,
                        probes = outcome.probes,
                        elapsed_ms
                    );
                }
            }
        }

        writer.flush()?;

        let summary = analytics.finalize()?;
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_dir = self
            .outputs
            .summary_md
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let telemetry_path = if self.logging_enabled {
            Some(telemetry_dir.join("telemetry.jsonl"))
        } else {
            None
        };

        Ok(RunSummary {
            episodes_played: self.config.episodes.count,
            agents: self.agents.len(),
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
            telemetry_outputs: None,
        })
    }

    /// Summarise the structured log written during [`BenchRunner::run`].
    ///
    /// The log writer must be flushed first (drop the logging guard), or the
    /// tail of the run is missing from the summary.
    pub fn summarise_telemetry(&self, summary: &mut RunSummary) -> Result<(), RunnerError> {
        let Some(path) = summary.telemetry_path.as_ref() else {
            return Ok(());
        };
        let telemetry_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        summary.telemetry_outputs = write_summary_outputs(path, &telemetry_dir)?;
        if let Some(outputs) = summary.telemetry_outputs.as_ref() {
            append_highlights_to_markdown(&summary.summary_path, outputs)?;
        }
        Ok(())
    }

    fn play_agent(
        &self,
        agent: &AgentBlueprint,
        episode_seed: u64,
    ) -> Result<EpisodeOutcome, RunnerError> {
        let mut session = GameSession::with_seed(self.config.session, episode_seed)?;
        // Policy randomness is decorrelated from the ghost placement.
        let mut policy = build_policy(agent.kind, &agent.params, episode_seed.rotate_left(17));
        Ok(play_episode(&mut session, policy.as_mut()))
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

struct AgentBlueprint {
    name: String,
    kind: BotKind,
    params: BotParams,
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, RunnerError> {
        configs.iter().map(Self::from_config).collect()
    }

    fn from_config(config: &AgentConfig) -> Result<Self, RunnerError> {
        Ok(Self {
            name: config.name.clone(),
            kind: config.kind.bot_kind(),
            params: config.bot_params()?,
        })
    }
}

#[derive(Serialize)]
struct EpisodeLogRow<'a> {
    run_id: &'a str,
    episode_id: String,
    episode_index: usize,
    episode_seed: u64,
    agent: &'a str,
    kind: &'static str,
    status: &'static str,
    won: bool,
    probes: u32,
    busts: u32,
    credits_left: u32,
    target: Option<(usize, usize)>,
    target_probability: Option<f64>,
    final_entropy: f64,
    peak_probability: f64,
    rejected_actions: u32,
    elapsed_ms: f64,
}

impl<'a> EpisodeLogRow<'a> {
    fn new(
        run_id: &'a str,
        episode_index: usize,
        episode_seed: u64,
        agent: &'a AgentBlueprint,
        outcome: &EpisodeOutcome,
        elapsed_ms: f64,
    ) -> Self {
        Self {
            run_id,
            episode_id: format!("E{episode_index:05}"),
            episode_index,
            episode_seed,
            agent: &agent.name,
            kind: agent.kind.as_str(),
            status: outcome.status.as_str(),
            won: outcome.status == SessionStatus::Won,
            probes: outcome.probes,
            busts: outcome.busts,
            credits_left: outcome.credits_left,
            target: outcome.target.map(|cell| (cell.col, cell.row)),
            target_probability: outcome.target_probability,
            final_entropy: outcome.final_metrics.entropy,
            peak_probability: outcome.final_metrics.peak_probability,
            rejected_actions: outcome.rejected_actions,
            elapsed_ms,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid agent configuration: {0}")]
    Agent(#[from] ValidationError),
    #[error("invalid session configuration: {0}")]
    Session(#[from] SessionConfigError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("telemetry summarisation failed: {0}")]
    Telemetry(#[from] TelemetryError),
}
