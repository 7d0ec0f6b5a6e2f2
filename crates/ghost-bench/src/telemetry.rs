use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetrySummary {
    pub decisions: DecisionTelemetrySummary,
    pub belief: BeliefTelemetrySummary,
    pub episodes: EpisodeTelemetrySummary,
}

#[derive(Debug, Default, Serialize)]
pub struct DecisionTelemetrySummary {
    pub count: usize,
    pub action_counts: BTreeMap<String, usize>,
    pub reason_counts: BTreeMap<String, usize>,
    /// Mean posterior mass on the cell chosen for a bust.
    pub avg_bust_probability: Option<f64>,
}

#[derive(Debug, Default, Serialize)]
pub struct BeliefTelemetrySummary {
    pub updates: usize,
    pub resets: usize,
    pub clue_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Default, Serialize)]
pub struct EpisodeTelemetrySummary {
    pub finished: usize,
    pub rejected_actions: usize,
    pub status_counts: BTreeMap<String, usize>,
    pub avg_final_entropy: Option<f64>,
}

#[derive(Debug)]
struct Average {
    sum: f64,
    count: usize,
}

impl Average {
    fn new() -> Self {
        Self { sum: 0.0, count: 0 }
    }

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Aggregate decision, belief and episode events from a structured log.
pub fn summarise_telemetry(path: &Path) -> Result<TelemetrySummary, TelemetryError> {
    if !path.exists() {
        return Ok(TelemetrySummary::default());
    }

    let file = File::open(path).map_err(|source| TelemetryError::Io {
        context: "opening telemetry log",
        source,
    })?;
    let reader = BufReader::new(file);

    let mut summary = TelemetrySummary::default();
    let mut bust_probability = Average::new();
    let mut entropy = Average::new();

    for line in reader.lines() {
        let line = line.map_err(|source| TelemetryError::Io {
            context: "reading telemetry line",
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let payload: Value = serde_json::from_str(&line)?;
        let target = payload
            .get("target")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let fields = payload
            .get("fields")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let message = text_field(&fields, "message");

        match target {
            "ghost_bot::decision" => {
                let decisions = &mut summary.decisions;
                decisions.count += 1;
                let action = label_field(&fields, "action");
                if action == "bust" {
                    if let Some(p) = fields.get("probability").and_then(Value::as_f64) {
                        bust_probability.add(p);
                    }
                }
                bump(&mut decisions.action_counts, action);
                bump(&mut decisions.reason_counts, label_field(&fields, "reason"));
            }
            "ghost_core::belief" => {
                if message.is_some_and(|m| m.contains("resetting")) {
                    summary.belief.resets += 1;
                } else {
                    summary.belief.updates += 1;
                }
            }
            "ghost_core::session" if message == Some("probe") => {
                bump(&mut summary.belief.clue_counts, label_field(&fields, "color"));
            }
            "ghost_bot::episode" => {
                let episodes = &mut summary.episodes;
                if message == Some("episode finished") {
                    episodes.finished += 1;
                    bump(&mut episodes.status_counts, label_field(&fields, "status"));
                    if let Some(value) = fields.get("entropy").and_then(Value::as_f64) {
                        entropy.add(value);
                    }
                } else {
                    episodes.rejected_actions += 1;
                }
            }
            _ => {}
        }
    }

    summary.decisions.avg_bust_probability = bust_probability.mean();
    summary.episodes.avg_final_entropy = entropy.mean();

    Ok(summary)
}

fn text_field<'a>(fields: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    fields.get(key).and_then(Value::as_str)
}

fn label_field<'a>(fields: &'a Map<String, Value>, key: &str) -> &'a str {
    text_field(fields, key)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("<unset>")
}

fn bump(counts: &mut BTreeMap<String, usize>, label: &str) {
    *counts.entry(label.to_string()).or_insert(0) += 1;
}

pub fn write_summary_outputs(
    telemetry_path: &Path,
    output_dir: &Path,
) -> Result<Option<TelemetryOutputs>, TelemetryError> {
    if !telemetry_path.exists() {
        return Ok(None);
    }

    let summary = summarise_telemetry(telemetry_path)?;
    let json_path = output_dir.join("telemetry_summary.json");
    let md_path = output_dir.join("telemetry_summary.md");

    std::fs::write(&json_path, serde_json::to_vec_pretty(&summary)?).map_err(|source| {
        TelemetryError::Io {
            context: "writing telemetry summary json",
            source,
        }
    })?;

    let markdown = render_markdown(&summary, telemetry_path);
    std::fs::write(&md_path, markdown).map_err(|source| TelemetryError::Io {
        context: "writing telemetry summary markdown",
        source,
    })?;

    Ok(Some(TelemetryOutputs {
        summary,
        json_path,
        markdown_path: md_path,
    }))
}

pub fn append_highlights_to_markdown(
    summary_path: &Path,
    outputs: &TelemetryOutputs,
) -> Result<(), TelemetryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(summary_path)
        .map_err(|source| TelemetryError::Io {
            context: "opening summary markdown for telemetry append",
            source,
        })?;

    let summary = &outputs.summary;
    let mut section = String::new();
    section.push_str("\n## Telemetry Highlights\n");
    section.push_str(&format!(
        "- Decisions captured: {}\n",
        summary.decisions.count
    ));
    if let Some(value) = summary.decisions.avg_bust_probability {
        section.push_str(&format!("- Avg probability at bust: {:.3}\n", value));
    }
    section.push_str(&format!(
        "- Belief resets to uniform: {}\n",
        summary.belief.resets
    ));
    section.push_str(&format!(
        "- Rejected policy actions: {}\n",
        summary.episodes.rejected_actions
    ));
    if let Some(value) = summary.episodes.avg_final_entropy {
        section.push_str(&format!("- Avg final entropy: {:.3} nats\n", value));
    }
    push_counts(&mut section, "Decision reasons", &summary.decisions.reason_counts);

    write!(file, "{section}").map_err(|source| TelemetryError::Io {
        context: "writing telemetry highlights",
        source,
    })?;

    Ok(())
}

fn push_counts(output: &mut String, heading: &str, counts: &BTreeMap<String, usize>) {
    output.push_str(&format!("\n### {heading}\n"));
    if counts.is_empty() {
        output.push_str("- <none>\n");
    } else {
        for (label, count) in counts {
            output.push_str(&format!("- {}: {}\n", label, count));
        }
    }
}

fn render_markdown(summary: &TelemetrySummary, telemetry_path: &Path) -> String {
    let mut output = String::new();
    output.push_str("# Telemetry Summary\n\n");
    output.push_str(&format!("- Source: `{}`\n", telemetry_path.display()));
    output.push('\n');

    output.push_str("## Decisions\n");
    output.push_str(&format!("- Events: {}\n", summary.decisions.count));
    if let Some(value) = summary.decisions.avg_bust_probability {
        output.push_str(&format!("- Avg probability at bust: {:.3}\n", value));
    }
    push_counts(&mut output, "Actions", &summary.decisions.action_counts);
    push_counts(&mut output, "Reasons", &summary.decisions.reason_counts);
    output.push('\n');

    output.push_str("## Belief\n");
    output.push_str(&format!("- Updates traced: {}\n", summary.belief.updates));
    output.push_str(&format!("- Resets to uniform: {}\n", summary.belief.resets));
    push_counts(&mut output, "Clue colours", &summary.belief.clue_counts);
    output.push('\n');

    output.push_str("## Episodes\n");
    output.push_str(&format!("- Finished: {}\n", summary.episodes.finished));
    output.push_str(&format!(
        "- Rejected actions: {}\n",
        summary.episodes.rejected_actions
    ));
    if let Some(value) = summary.episodes.avg_final_entropy {
        output.push_str(&format!("- Avg final entropy: {:.3} nats\n", value));
    }
    push_counts(&mut output, "Outcomes", &summary.episodes.status_counts);
    output
}

#[derive(Debug)]
pub struct TelemetryOutputs {
    pub summary: TelemetrySummary,
    pub json_path: PathBuf,
    pub markdown_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp file");
        for line in lines {
            writeln!(file, "{line}").expect("write line");
        }
        file
    }

    #[test]
    fn summarises_decision_belief_and_episode_events() {
        let lines = vec![
            r#"{"level":"DEBUG","target":"ghost_bot::decision","fields":{"policy":"greedy","action":"probe","cell":"(3, 4)","probability":0.02,"reason":"explore"}}"#,
            r#"{"level":"DEBUG","target":"ghost_bot::decision","fields":{"policy":"greedy","action":"bust","cell":"(3, 4)","probability":0.6,"reason":"confident"}}"#,
            r#"{"level":"DEBUG","target":"ghost_bot::decision","fields":{"policy":"greedy","action":"bust","cell":"(5, 5)","probability":0.4,"reason":"last_credit"}}"#,
            r#"{"level":"DEBUG","target":"ghost_core::session","fields":{"message":"probe","cell":"(3, 4)","color":"red"}}"#,
            r#"{"level":"DEBUG","target":"ghost_core::belief","fields":{"message":"observation carried no likelihood mass; resetting to uniform"}}"#,
            r#"{"level":"TRACE","target":"ghost_core::belief","fields":{"message":"belief updated","evidence":0.2}}"#,
            r#"{"level":"WARN","target":"ghost_bot::episode","fields":{"message":"policy chose a rejected action"}}"#,
            r#"{"level":"INFO","target":"ghost_bot::episode","fields":{"message":"episode finished","status":"won","entropy":1.5}}"#,
            r#"{"level":"INFO","target":"ghost_bot::episode","fields":{"message":"episode finished","status":"lost","entropy":2.5}}"#,
        ];
        let file = write_temp_file(&lines);
        let summary = summarise_telemetry(file.path()).expect("summarise");

        assert_eq!(summary.decisions.count, 3);
        assert_eq!(summary.decisions.action_counts.get("bust"), Some(&2));
        assert_eq!(summary.decisions.reason_counts.get("explore"), Some(&1));
        assert!((summary.decisions.avg_bust_probability.unwrap() - 0.5).abs() < 1e-9);

        assert_eq!(summary.belief.updates, 1);
        assert_eq!(summary.belief.resets, 1);
        assert_eq!(summary.belief.clue_counts.get("red"), Some(&1));

        assert_eq!(summary.episodes.finished, 2);
        assert_eq!(summary.episodes.rejected_actions, 1);
        assert_eq!(summary.episodes.status_counts.get("won"), Some(&1));
        assert!((summary.episodes.avg_final_entropy.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn handles_missing_file() {
        let path = Path::new("tests/does/not/exist.jsonl");
        let summary = summarise_telemetry(path).expect("summarise missing file");
        assert_eq!(summary.decisions.count, 0);
        assert!(summary.decisions.avg_bust_probability.is_none());
        assert!(summary.episodes.status_counts.is_empty());
    }

    #[test]
    fn appends_highlights_to_summary_markdown() {
        let mut summary_file = tempfile::NamedTempFile::new().expect("summary temp file");
        write!(summary_file, "# Benchmark Summary\n").expect("seed summary content");
        let telemetry_json = tempfile::NamedTempFile::new().expect("telemetry json temp");
        let telemetry_md = tempfile::NamedTempFile::new().expect("telemetry md temp");

        let mut reasons = BTreeMap::new();
        reasons.insert("confident".to_string(), 7);
        reasons.insert("explore".to_string(), 40);

        let outputs = TelemetryOutputs {
            summary: TelemetrySummary {
                decisions: DecisionTelemetrySummary {
                    count: 47,
                    action_counts: BTreeMap::new(),
                    reason_counts: reasons,
                    avg_bust_probability: Some(0.512),
                },
                belief: BeliefTelemetrySummary::default(),
                episodes: EpisodeTelemetrySummary {
                    finished: 7,
                    rejected_actions: 0,
                    status_counts: BTreeMap::new(),
                    avg_final_entropy: Some(3.25),
                },
            },
            json_path: telemetry_json.path().to_path_buf(),
            markdown_path: telemetry_md.path().to_path_buf(),
        };

        append_highlights_to_markdown(summary_file.path(), &outputs).expect("append highlights");

        let contents = std::fs::read_to_string(summary_file.path()).expect("read summary");
        assert!(contents.starts_with("# Benchmark Summary"));
        assert!(contents.contains("## Telemetry Highlights"));
        assert!(contents.contains("- Decisions captured: 47"));
        assert!(contents.contains("- Avg probability at bust: 0.512"));
        assert!(contents.contains("- Avg final entropy: 3.250 nats"));
        assert!(contents.contains("- explore: 40"));
    }
}
