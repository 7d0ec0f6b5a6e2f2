use std::fs;
use std::path::Path;

use ghost_bench::config::BenchmarkConfig;
use ghost_bench::runner::BenchRunner;
use tempfile::tempdir;

fn load_config(output_dir: &Path) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
episodes:
  seed: 4242
  count: 12
session:
  starting_credits: 20
agents:
  - name: "random"
    kind: "random"
    params:
      probe_budget: 5
  - name: "greedy"
    kind: "greedy"
    params:
      confidence: 0.45
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
metrics:
  baseline: "random"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("episodes.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn normalized_rows(path: &Path) -> Vec<serde_json::Value> {
    let jsonl = fs::read_to_string(path).expect("jsonl readable");
    jsonl
        .lines()
        .map(|line| {
            let mut value: serde_json::Value =
                serde_json::from_str(line).expect("row decodes to JSON");
            if let Some(obj) = value.as_object_mut() {
                obj.insert("elapsed_ms".to_string(), serde_json::Value::from(0.0));
            }
            value
        })
        .collect()
}

#[test]
fn benchmark_smoke_test_is_reproducible() {
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");

    let mut runs = Vec::new();
    for dir in [first_dir.path(), second_dir.path()] {
        let config = load_config(dir);
        let outputs = config.resolved_outputs();
        let runner = BenchRunner::new(config, outputs).expect("runner created");
        runs.push(runner.run().expect("benchmark completes"));
    }

    let summary = &runs[0];
    assert_eq!(summary.episodes_played, 12);
    assert_eq!(summary.agents, 2);
    assert_eq!(summary.rows_written, 24);
    assert!(summary.summary_path.exists(), "summary markdown missing");
    assert!(summary.telemetry_path.is_none());

    let first = normalized_rows(&runs[0].jsonl_path);
    let second = normalized_rows(&runs[1].jsonl_path);
    assert_eq!(first.len(), 24);
    assert_eq!(first, second, "same seed must reproduce the same episodes");

    for pair in first.chunks(2) {
        // Every agent faces the same hidden ghost in a given episode.
        assert_eq!(pair[0]["episode_seed"], pair[1]["episode_seed"]);
        assert_eq!(pair[0]["target"], pair[1]["target"]);
        assert_eq!(pair[0]["agent"], "random");
        assert_eq!(pair[1]["agent"], "greedy");
    }

    for row in &first {
        let status = row["status"].as_str().expect("status string");
        assert!(status == "won" || status == "lost", "unexpected status {status}");
        assert!(row["probes"].as_u64().expect("probes") <= 20);
        assert!(row["busts"].as_u64().expect("busts") <= 2);
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.starts_with("# Benchmark Summary"));
    assert!(markdown.contains("| greedy |"));
    assert!(markdown.contains("| random |"));
}

#[test]
fn different_seeds_produce_different_episodes() {
    let dir = tempdir().expect("temp dir");
    let mut config = load_config(dir.path());
    config.episodes.seed = Some(1);
    let outputs = config.resolved_outputs();
    let first = BenchRunner::new(config.clone(), outputs.clone())
        .expect("runner")
        .run()
        .expect("run");
    let first_rows = normalized_rows(&first.jsonl_path);

    config.episodes.seed = Some(2);
    let second = BenchRunner::new(config, outputs)
        .expect("runner")
        .run()
        .expect("run");
    let second_rows = normalized_rows(&second.jsonl_path);

    let first_seeds: Vec<_> = first_rows.iter().map(|r| r["episode_seed"].clone()).collect();
    let second_seeds: Vec<_> = second_rows.iter().map(|r| r["episode_seed"].clone()).collect();
    assert_ne!(first_seeds, second_seeds);
}
