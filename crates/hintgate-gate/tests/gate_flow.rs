#![cfg(unix)]

use hintgate_gate::{
    GateError, GateMode, GateVerdict, HarnessCommand, HarnessOutput, load_baseline,
    load_harness_output, policy_logic_digest, replay_from_config, run_gate, write_baseline,
    write_harness_output,
};
use hintgate_kernel::{HintgateConfig, POLICY_LOGIC_INPUT};
use hintgate_ladder::convert_to_path;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard(PathBuf);

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "hintgate-gate-{prefix}-{}-{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("create temp dir");
        Self(path)
    }

    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

const DATASET: &str = "query,error_subtype\n\
\"SELECT nme FROM users\",unknown column\n\
\"SELECT a, b FROM t\",undefined column\n\
\"SELECT * FROM nope\",undefined table\n\
SELECT,incomplete query\n";

const LADDERS: &str = r#"{"ladders":[
  {"challenge_key":"p1","hints":["Check the column names.","Compare with the schema.","Fix the typo in nme."]},
  {"challenge_key":"p2","hints":["Which tables exist?","Use the users table."]}
]}"#;

const FIXTURE: &str = r#"{
  "fixture_id": "gate-flow",
  "learner_id": "learner-1",
  "attempts": [
    {"problem_id": "p1", "error_label": "Unknown Column"},
    {"problem_id": "p1", "error_label": "unknown column"},
    {"problem_id": "p2", "error_label": "no such table"},
    {"problem_id": "p2", "error_label": "no such table"},
    {"problem_id": "p2", "error_label": "no such table"}
  ]
}"#;

fn config_text(harness: &str) -> String {
    format!(
        r#"
[dataset]
path = "data/dataset.csv"
fallback_subtype = "incomplete query"

[ladder]
sources = ["content/ladders.json"]
output = "dist/ladder.json"

[replay]
fixture = "fixtures/fixture.json"
output = "dist/replay.json"

[gate]
baseline = "fixtures/baseline.json"
harness_command = ["sh", "-c", "{harness}"]

[gate.inputs]
fixture = "fixtures/fixture.json"
dataset = "data/dataset.csv"
ladders = "content/ladders.json"
"#
    )
}

fn setup(dir: &Path, harness: &str) -> HintgateConfig {
    fs::create_dir_all(dir.join("data")).expect("data dir");
    fs::create_dir_all(dir.join("content")).expect("content dir");
    fs::create_dir_all(dir.join("fixtures")).expect("fixtures dir");
    fs::write(dir.join("data/dataset.csv"), DATASET).expect("dataset");
    fs::write(dir.join("content/ladders.json"), LADDERS).expect("ladders");
    fs::write(dir.join("fixtures/fixture.json"), FIXTURE).expect("fixture");
    write_config(dir, harness)
}

fn write_config(dir: &Path, harness: &str) -> HintgateConfig {
    let path = dir.join("hintgate.toml");
    fs::write(&path, config_text(harness)).expect("config");
    let config = HintgateConfig::load(&path).expect("config loads");
    convert_to_path(&config.ladder.sources, &config.ladder.output).expect("ladder converts");
    let output = replay_from_config(&config).expect("replay runs");
    write_harness_output(&config.replay.output, &output).expect("replay output");
    config
}

fn harness(config: &HintgateConfig) -> HarnessCommand {
    HarnessCommand::for_config(config, Path::new("/unused"))
}

#[test]
fn update_then_check_passes() {
    let dir = TempDirGuard::new("pass");
    let config = setup(dir.path(), "exit 0");

    let update = run_gate(&config, GateMode::Update, &harness(&config)).expect("update");
    assert!(update.baseline_written);
    assert!(config.gate.baseline.exists());

    let check = run_gate(&config, GateMode::Check, &harness(&config)).expect("check");
    assert!(!check.baseline_written);
    assert_eq!(check.verdict.label(), "pass");
    assert_eq!(check.input_digests.len(), 4);
    assert_eq!(
        check.input_digests.get(POLICY_LOGIC_INPUT),
        Some(&policy_logic_digest())
    );
}

#[test]
fn output_drift_with_unchanged_inputs_fails() {
    let dir = TempDirGuard::new("fail");
    let config = setup(dir.path(), "exit 0");
    run_gate(&config, GateMode::Update, &harness(&config)).expect("update");

    let mut output: HarnessOutput = load_harness_output(&config.replay.output).expect("output");
    output.decision_trace[0].sql_engage_row_id = "sql-engage:99".into();
    output.policy_only_checksum_sha256 =
        hintgate_gate::policy_only_checksum(&output.decision_trace);
    write_harness_output(&config.replay.output, &output).expect("tamper");

    let check = run_gate(&config, GateMode::Check, &harness(&config)).expect("check");
    assert!(matches!(check.verdict, GateVerdict::Fail { .. }));
}

#[test]
fn output_drift_with_changed_inputs_skips() {
    let dir = TempDirGuard::new("skip");
    let config = setup(dir.path(), "exit 0");
    run_gate(&config, GateMode::Update, &harness(&config)).expect("update");

    fs::write(
        dir.path().join("fixtures/fixture.json"),
        FIXTURE.replace("learner-1", "learner-2"),
    )
    .expect("edit fixture");
    let output = replay_from_config(&config).expect("replay");
    write_harness_output(&config.replay.output, &output).expect("replay output");

    let check = run_gate(&config, GateMode::Check, &harness(&config)).expect("check");
    match check.verdict {
        GateVerdict::Skip { changed_inputs } => {
            assert_eq!(changed_inputs.len(), 1);
            assert_eq!(changed_inputs[0].name, "fixture");
        }
        other => panic!("expected skip, got {other:?}"),
    }
}

#[test]
fn baseline_from_older_policy_logic_skips_instead_of_failing() {
    let dir = TempDirGuard::new("policy-bump");
    let config = setup(dir.path(), "exit 0");
    run_gate(&config, GateMode::Update, &harness(&config)).expect("update");

    let mut older = load_baseline(&config.gate.baseline).expect("baseline");
    older
        .fixture_policy_input_digests_sha256
        .insert(POLICY_LOGIC_INPUT.to_string(), "0".repeat(64));
    older.expected.replay_policy_semantics_version = "replay-policy-semantics-v0".into();
    older.expected.policy_only_checksum_sha256 = "f".repeat(64);
    write_baseline(&config.gate.baseline, &older).expect("rewrite baseline");

    let check = run_gate(&config, GateMode::Check, &harness(&config)).expect("check");
    match check.verdict {
        GateVerdict::Skip { changed_inputs } => {
            let names: Vec<&str> = changed_inputs.iter().map(|c| c.name.as_str()).collect();
            assert_eq!(names, vec![POLICY_LOGIC_INPUT, "replay_policy_semantics_version"]);
        }
        other => panic!("expected skip, got {other:?}"),
    }
}

#[test]
fn harness_failure_aborts_with_its_exit_code() {
    let dir = TempDirGuard::new("harness-fail");
    let config = setup(dir.path(), "exit 4");
    let err = run_gate(&config, GateMode::Update, &harness(&config)).expect_err("harness fails");
    assert_eq!(err.forwarded_exit_code(), Some(4));
    assert!(!config.gate.baseline.exists());
}

#[test]
fn check_without_baseline_is_a_configuration_error() {
    let dir = TempDirGuard::new("no-baseline");
    let config = setup(dir.path(), "exit 0");
    let err = run_gate(&config, GateMode::Check, &harness(&config)).expect_err("no baseline");
    assert!(matches!(err, GateError::BaselineMissing { .. }));
}

#[test]
fn replay_output_is_stable_across_runs() {
    let dir = TempDirGuard::new("stable");
    let config = setup(dir.path(), "exit 0");
    let first = replay_from_config(&config).expect("first");
    let second = replay_from_config(&config).expect("second");
    assert_eq!(first, second);
    let levels: Vec<(usize, &str)> = first
        .decision_trace
        .iter()
        .map(|event| (event.hint_level, event.rule_fired.as_str()))
        .collect();
    assert_eq!(
        levels,
        vec![
            (1, "hint-ladder"),
            (2, "hint-ladder"),
            (1, "hint-ladder"),
            (2, "hint-ladder"),
            (2, "escalate-to-explanation"),
        ]
    );
}
