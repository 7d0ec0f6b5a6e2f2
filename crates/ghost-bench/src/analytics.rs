use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ghost_bot::EpisodeOutcome;
use ghost_core::game::session::SessionStatus;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::{AgentKind, BenchmarkConfig};

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("baseline agent '{0}' not present in benchmark results")]
    MissingBaseline(String),
    #[error("agent '{0}' defined in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub struct AnalyticsCollector {
    baseline: String,
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
    session: String,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Result<Self, AnalyticsError> {
        let baseline = config
            .metrics
            .baseline
            .clone()
            .ok_or_else(|| AnalyticsError::MissingBaseline("<unset>".into()))?;

        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.kind, agent.params.clone()),
            );
            order.push(agent.name.clone());
        }

        if !agents.contains_key(&baseline) {
            return Err(AnalyticsError::MissingBaseline(baseline));
        }

        let session = config.session;
        Ok(Self {
            baseline,
            agents,
            agent_order: order,
            session: format!(
                "{}x{} grid, {} credits, {} bust attempts",
                session.rows, session.cols, session.starting_credits, session.max_bust_attempts
            ),
        })
    }

    pub fn record_episode(
        &mut self,
        agent: &str,
        outcome: &EpisodeOutcome,
    ) -> Result<(), AnalyticsError> {
        let acc = self
            .agents
            .get_mut(agent)
            .ok_or_else(|| AnalyticsError::UnknownAgent(agent.to_string()))?;
        acc.record(outcome);
        Ok(())
    }

    pub fn finalize(mut self) -> Result<AnalyticsSummary, AnalyticsError> {
        let mut reports = Vec::new();
        for name in &self.agent_order {
            if let Some(acc) = self.agents.remove(name) {
                reports.push(acc.into_report());
            }
        }

        let baseline = reports
            .iter()
            .find(|report| report.name == self.baseline)
            .cloned()
            .ok_or_else(|| AnalyticsError::MissingBaseline(self.baseline.clone()))?;

        let comparisons = reports
            .iter()
            .map(|report| ComparisonReport {
                agent: report.name.clone(),
                delta_win_rate: report.win_rate - baseline.win_rate,
                p_value: if report.name == baseline.name {
                    1.0
                } else {
                    two_proportion_p_value(
                        report.wins,
                        report.episodes,
                        baseline.wins,
                        baseline.episodes,
                    )
                },
            })
            .collect();

        Ok(AnalyticsSummary {
            baseline: self.baseline,
            session: self.session,
            agents: reports,
            comparisons,
        })
    }
}

struct AgentAccumulator {
    name: String,
    kind: AgentKind,
    params: serde_yaml::Value,
    episodes: usize,
    wins: usize,
    total_probes: u64,
    total_busts: u64,
    total_rejected: u64,
    target_probability: f64,
    entropy: f64,
}

impl AgentAccumulator {
    fn new(name: String, kind: AgentKind, params: serde_yaml::Value) -> Self {
        Self {
            name,
            kind,
            params,
            episodes: 0,
            wins: 0,
            total_probes: 0,
            total_busts: 0,
            total_rejected: 0,
            target_probability: 0.0,
            entropy: 0.0,
        }
    }

    fn record(&mut self, outcome: &EpisodeOutcome) {
        self.episodes += 1;
        if outcome.status == SessionStatus::Won {
            self.wins += 1;
        }
        self.total_probes += u64::from(outcome.probes);
        self.total_busts += u64::from(outcome.busts);
        self.total_rejected += u64::from(outcome.rejected_actions);
        self.target_probability += outcome.target_probability.unwrap_or(0.0);
        self.entropy += outcome.final_metrics.entropy;
    }

    fn into_report(self) -> AgentReport {
        let n = self.episodes as f64;
        let mean = |total: f64| if self.episodes == 0 { 0.0 } else { total / n };
        let win_rate = mean(self.wins as f64);

        AgentReport {
            name: self.name.clone(),
            kind: self.kind,
            params: self.params.clone(),
            episodes: self.episodes,
            wins: self.wins,
            win_rate,
            ci95: proportion_interval(self.wins, self.episodes),
            avg_probes: mean(self.total_probes as f64),
            avg_busts: mean(self.total_busts as f64),
            avg_target_probability: mean(self.target_probability),
            avg_final_entropy: mean(self.entropy),
            rejected_actions: self.total_rejected,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub baseline: String,
    pub session: String,
    pub agents: Vec<AgentReport>,
    pub comparisons: Vec<ComparisonReport>,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str("# Benchmark Summary\n\n");
        rows.push_str(&format!("Session: {}\n\n", self.session));
        rows.push_str(&format!("Baseline: `{}`\n\n", self.baseline));
        rows.push_str("| Agent | Kind | Episodes | Win % | 95% CI | Δ vs baseline | Avg probes | Avg busts | Avg P(target) | Avg entropy | p-value |\n");
        rows.push_str("|-------|------|----------|-------|--------|---------------|------------|-----------|---------------|-------------|---------|\n");

        for agent in &self.agents {
            let comparison = self.comparisons.iter().find(|c| c.agent == agent.name);
            let delta = comparison.map(|c| c.delta_win_rate).unwrap_or(0.0);
            let p_value = comparison.map(|c| c.p_value).unwrap_or(1.0);

            rows.push_str(&format!(
                "| {name} | {kind:?} | {episodes} | {win:.1}% | [{ci_low:.1}%, {ci_high:.1}%] | {delta:+.1}% | {probes:.2} | {busts:.2} | {prob:.3} | {entropy:.3} | {pval:.3} |\n",
                name = agent.name,
                kind = agent.kind,
                episodes = agent.episodes,
                win = agent.win_rate * 100.0,
                ci_low = agent.ci95.0 * 100.0,
                ci_high = agent.ci95.1 * 100.0,
                delta = delta * 100.0,
                probes = agent.avg_probes,
                busts = agent.avg_busts,
                prob = agent.avg_target_probability,
                entropy = agent.avg_final_entropy,
                pval = p_value,
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub kind: AgentKind,
    pub params: serde_yaml::Value,
    pub episodes: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub avg_probes: f64,
    pub avg_busts: f64,
    pub avg_target_probability: f64,
    pub avg_final_entropy: f64,
    pub rejected_actions: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub agent: String,
    pub delta_win_rate: f64,
    pub p_value: f64,
}

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

/// Normal-approximation interval for a win rate, clamped to `[0, 1]`.
fn proportion_interval(successes: usize, trials: usize) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 0.0);
    }
    let p = successes as f64 / trials as f64;
    let Some(normal) = standard_normal() else {
        return (p, p);
    };
    let z = normal.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0);
    let margin = z * (p * (1.0 - p) / trials as f64).sqrt();
    ((p - margin).max(0.0), (p + margin).min(1.0))
}

/// Two-sided pooled z-test for a difference in win rates.
fn two_proportion_p_value(wins_a: usize, n_a: usize, wins_b: usize, n_b: usize) -> f64 {
    if n_a == 0 || n_b == 0 {
        return 1.0;
    }
    let (n_a, n_b) = (n_a as f64, n_b as f64);
    let p_a = wins_a as f64 / n_a;
    let p_b = wins_b as f64 / n_b;
    let pooled = (wins_a + wins_b) as f64 / (n_a + n_b);
    let variance = pooled * (1.0 - pooled) * (1.0 / n_a + 1.0 / n_b);
    if variance <= 0.0 {
        return 1.0;
    }
    let Some(normal) = standard_normal() else {
        return 1.0;
    };
    let z = (p_a - p_b).abs() / variance.sqrt();
    (2.0 * (1.0 - normal.cdf(z))).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_brackets_the_observed_rate() {
        let (low, high) = proportion_interval(30, 100);
        assert!(low < 0.3 && 0.3 < high);
        assert!((high - low - 2.0 * 1.96 * (0.21f64 / 100.0).sqrt()).abs() < 1e-3);
    }

    #[test]
    fn interval_is_clamped() {
        assert_eq!(proportion_interval(0, 10), (0.0, 0.0));
        assert_eq!(proportion_interval(10, 10), (1.0, 1.0));
        assert_eq!(proportion_interval(0, 0), (0.0, 0.0));
    }

    #[test]
    fn identical_rates_are_not_significant() {
        assert_eq!(two_proportion_p_value(5, 10, 5, 10), 1.0);
        assert_eq!(two_proportion_p_value(0, 10, 0, 10), 1.0);
    }

    #[test]
    fn large_gap_is_significant() {
        let p = two_proportion_p_value(80, 100, 20, 100);
        assert!(p < 1e-6, "p = {p}");
        let close = two_proportion_p_value(52, 100, 48, 100);
        assert!(close > 0.5, "p = {close}");
    }
}
