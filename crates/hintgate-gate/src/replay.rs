//! Deterministic policy replay.
//!
//! Replays a fixed learner session through the hint policy with the
//! generative path replaced by ladder text, producing a decision trace and a
//! checksum over its policy fields only.
//!
//! Per attempt, in order:
//! 1. canonicalize the error label
//! 2. bump the problem's error count
//! 3. `hint_level = min(count, max_level)`, escalating once the ladder is
//!    exhausted
//! 4. select the example row seeded by `<learner_id>:<problem_id>`

use crate::error::GateError;
use hintgate_dataset::{AliasTable, Canonicalizer, SubtypeIndex, load_index, select_row};
use hintgate_kernel::{HintgateConfig, render_pretty_json, stable_sha256, write_atomic};
use hintgate_ladder::{ArtifactDocument, load_artifact_document};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const REPLAY_HARNESS_VERSION: &str = "replay-harness-v1";
pub const REPLAY_POLICY_SEMANTICS_VERSION: &str = "replay-policy-semantics-v1";
pub const SQL_ENGAGE_POLICY_VERSION: &str = "sql-engage-policy-v1";

/// Ladder depth assumed for problems without an authored ladder.
pub const DEFAULT_MAX_HINT_LEVEL: usize = 3;

pub const RULE_HINT_LADDER: &str = "hint-ladder";
pub const RULE_ESCALATE: &str = "escalate-to-explanation";
pub const EVENT_HINT_VIEW: &str = "hint_view";
pub const EVENT_EXPLANATION_VIEW: &str = "explanation_view";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub problem_id: String,
    pub error_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub fixture_id: String,
    pub learner_id: String,
    pub attempts: Vec<Attempt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEvent {
    pub event_type: String,
    pub problem_id: String,
    pub rule_fired: String,
    pub hint_level: usize,
    pub sql_engage_subtype: String,
    pub sql_engage_row_id: String,
    /// Replay stand-in for generated text. Never part of the checksum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_text: Option<String>,
}

/// Event fields that make up the policy decision, in comparison order.
pub const POLICY_FIELDS: [&str; 6] = [
    "event_type",
    "problem_id",
    "rule_fired",
    "hint_level",
    "sql_engage_subtype",
    "sql_engage_row_id",
];

impl DecisionEvent {
    /// The event without its hint text.
    pub fn policy_value(&self) -> Value {
        json!({
            "event_type": self.event_type,
            "problem_id": self.problem_id,
            "rule_fired": self.rule_fired,
            "hint_level": self.hint_level,
            "sql_engage_subtype": self.sql_engage_subtype,
            "sql_engage_row_id": self.sql_engage_row_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessOutput {
    pub policy_only_checksum_sha256: String,
    pub replay_harness_version: String,
    pub replay_policy_semantics_version: String,
    pub sql_engage_policy_version: String,
    pub fixture_id: String,
    pub decision_trace: Vec<DecisionEvent>,
}

/// SHA-256 over the canonical JSON of the trace's policy fields.
pub fn policy_only_checksum(trace: &[DecisionEvent]) -> String {
    let projected: Vec<Value> = trace.iter().map(DecisionEvent::policy_value).collect();
    stable_sha256(&Value::Array(projected))
}

/// Replay `fixture` against a built index and ladder.
pub fn run_replay(
    fixture: &Fixture,
    index: &SubtypeIndex,
    canonicalizer: &Canonicalizer,
    ladder: &ArtifactDocument,
) -> Result<HarnessOutput, GateError> {
    let mut error_counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut trace = Vec::with_capacity(fixture.attempts.len());

    for (attempt_index, attempt) in fixture.attempts.iter().enumerate() {
        let subtype = canonicalizer.canonicalize(&attempt.error_label).into_subtype();
        let count = error_counts.entry(attempt.problem_id.as_str()).or_insert(0);
        *count += 1;

        let max_level = ladder
            .entry(&attempt.problem_id)
            .map(|entry| entry.hint_levels.len())
            .filter(|levels| *levels > 0)
            .unwrap_or(DEFAULT_MAX_HINT_LEVEL);
        let hint_level = (*count).min(max_level);
        let escalated = *count > max_level;

        let seed = format!("{}:{}", fixture.learner_id, attempt.problem_id);
        let row = select_row(index, &subtype, &seed).ok_or_else(|| GateError::NoRowForSubtype {
            subtype: subtype.clone(),
            problem_id: attempt.problem_id.clone(),
            attempt: attempt_index,
        })?;

        let (event_type, rule_fired) = if escalated {
            (EVENT_EXPLANATION_VIEW, RULE_ESCALATE)
        } else {
            (EVENT_HINT_VIEW, RULE_HINT_LADDER)
        };
        trace.push(DecisionEvent {
            event_type: event_type.to_string(),
            problem_id: attempt.problem_id.clone(),
            rule_fired: rule_fired.to_string(),
            hint_level,
            sql_engage_row_id: row.row_id.clone(),
            hint_text: ladder
                .hint(&attempt.problem_id, hint_level)
                .map(str::to_string),
            sql_engage_subtype: subtype,
        });
    }

    let checksum = policy_only_checksum(&trace);
    tracing::info!(
        fixture_id = %fixture.fixture_id,
        events = trace.len(),
        checksum = %checksum,
        "replay complete"
    );
    Ok(HarnessOutput {
        policy_only_checksum_sha256: checksum,
        replay_harness_version: REPLAY_HARNESS_VERSION.to_string(),
        replay_policy_semantics_version: REPLAY_POLICY_SEMANTICS_VERSION.to_string(),
        sql_engage_policy_version: SQL_ENGAGE_POLICY_VERSION.to_string(),
        fixture_id: fixture.fixture_id.clone(),
        decision_trace: trace,
    })
}

pub fn load_fixture(path: impl AsRef<Path>) -> Result<Fixture, GateError> {
    read_json(path.as_ref())
}

pub fn load_harness_output(path: impl AsRef<Path>) -> Result<HarnessOutput, GateError> {
    read_json(path.as_ref())
}

/// Build everything from config and replay the configured fixture.
pub fn replay_from_config(config: &HintgateConfig) -> Result<HarnessOutput, GateError> {
    let aliases = AliasTable::builtin().with_overrides(&config.aliases);
    let index = load_index(&config.dataset.path, &aliases, &config.dataset.row_id_prefix)?;
    let canonicalizer =
        Canonicalizer::for_index(&index, aliases, &config.dataset.fallback_subtype)?;
    let ladder = load_artifact_document(&config.replay.ladder_artifact)?;
    let fixture = load_fixture(&config.replay.fixture)?;
    run_replay(&fixture, &index, &canonicalizer, &ladder)
}

/// Pretty JSON plus trailing newline, replacing `path` atomically.
pub fn write_harness_output(path: impl AsRef<Path>, output: &HarnessOutput) -> Result<(), GateError> {
    let path = path.as_ref();
    let rendered = render_pretty_json(output).map_err(GateError::Render)?;
    write_atomic(path, rendered.as_bytes()).map_err(|source| GateError::Write {
        path: path.display().to_string(),
        source,
    })
}

pub(crate) fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, GateError> {
    let bytes = fs::read(path).map_err(|source| GateError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| GateError::ParseJson {
        path: path.display().to_string(),
        source,
    })
}
