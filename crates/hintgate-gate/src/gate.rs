//! Input-conditioned checksum gate.
//!
//! ```text
//! run harness ─(exit≠0)─▶ abort, forward code
//!      │
//! digest inputs
//!      ├─ update ─▶ write baseline ─▶ Pass
//!      └─ check  ─▶ load baseline
//!                    ├─ any input or version tag differs ─▶ Skip
//!                    └─ inputs equal ─▶ checksum equal ? Pass : Fail
//! ```
//!
//! The decision itself ([`compare_input_digests`], [`evaluate`],
//! [`build_baseline`]) is pure. File I/O happens only in [`run_gate`].

use crate::baseline::{
    BASELINE_SCHEMA_VERSION, DigestBaseline, ExpectedOutput, load_baseline, write_baseline,
};
use crate::error::GateError;
use crate::harness::HarnessCommand;
use crate::inputs::current_input_digests;
use crate::replay::read_json;
use chrono::{SecondsFormat, Utc};
use hintgate_kernel::HintgateConfig;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    Check,
    Update,
}

impl GateMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Update => "update",
        }
    }
}

/// One input whose digest differs between baseline and now. `None` means
/// the key is absent on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputChange {
    pub name: String,
    pub baseline: Option<String>,
    pub current: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum GateVerdict {
    Pass {
        checksum: String,
    },
    /// Inputs changed, so an output change is expected. Not a failure.
    Skip {
        changed_inputs: Vec<InputChange>,
    },
    /// Inputs are unchanged but the output is not.
    Fail {
        expected: String,
        actual: String,
    },
}

impl GateVerdict {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pass { .. } => "pass",
            Self::Skip { .. } => "skip",
            Self::Fail { .. } => "fail",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateReport {
    pub mode: GateMode,
    #[serde(flatten)]
    pub verdict: GateVerdict,
    pub baseline_path: String,
    pub baseline_written: bool,
    pub input_digests: BTreeMap<String, String>,
    pub current: ExpectedOutput,
}

/// Key-by-key comparison over the union of both key sets, in key order.
pub fn compare_input_digests(
    baseline: &BTreeMap<String, String>,
    current: &BTreeMap<String, String>,
) -> Vec<InputChange> {
    let names: BTreeSet<&String> = baseline.keys().chain(current.keys()).collect();
    names
        .into_iter()
        .filter_map(|name| {
            let (before, now) = (baseline.get(name), current.get(name));
            (before != now).then(|| InputChange {
                name: name.clone(),
                baseline: before.cloned(),
                current: now.cloned(),
            })
        })
        .collect()
}

/// Version tags the output reports, compared like inputs. A deliberate
/// version bump must re-baseline, never read as drift.
pub fn compare_versions(baseline: &ExpectedOutput, current: &ExpectedOutput) -> Vec<InputChange> {
    [
        (
            "replay_harness_version",
            &baseline.replay_harness_version,
            &current.replay_harness_version,
        ),
        (
            "replay_policy_semantics_version",
            &baseline.replay_policy_semantics_version,
            &current.replay_policy_semantics_version,
        ),
        (
            "sql_engage_policy_version",
            &baseline.sql_engage_policy_version,
            &current.sql_engage_policy_version,
        ),
    ]
    .into_iter()
    .filter(|(_, before, now)| before != now)
    .map(|(name, before, now)| InputChange {
        name: name.to_string(),
        baseline: Some(before.clone()),
        current: Some(now.clone()),
    })
    .collect()
}

/// The check-mode decision.
pub fn evaluate(
    baseline: &DigestBaseline,
    current_inputs: &BTreeMap<String, String>,
    current: &ExpectedOutput,
) -> GateVerdict {
    let mut changed_inputs =
        compare_input_digests(&baseline.fixture_policy_input_digests_sha256, current_inputs);
    changed_inputs.extend(compare_versions(&baseline.expected, current));
    if !changed_inputs.is_empty() {
        return GateVerdict::Skip { changed_inputs };
    }
    let expected = &baseline.expected.policy_only_checksum_sha256;
    if *expected == current.policy_only_checksum_sha256 {
        GateVerdict::Pass {
            checksum: current.policy_only_checksum_sha256.clone(),
        }
    } else {
        GateVerdict::Fail {
            expected: expected.clone(),
            actual: current.policy_only_checksum_sha256.clone(),
        }
    }
}

pub fn build_baseline(
    input_digests: BTreeMap<String, String>,
    current: ExpectedOutput,
    updated_at: String,
) -> DigestBaseline {
    DigestBaseline {
        schema_version: BASELINE_SCHEMA_VERSION,
        fixture_policy_input_digests_sha256: input_digests,
        expected: current,
        updated_at,
    }
}

/// Regenerate the replay output, digest inputs, then check or update.
pub fn run_gate(
    config: &HintgateConfig,
    mode: GateMode,
    harness: &HarnessCommand,
) -> Result<GateReport, GateError> {
    harness.run(&config.root)?;
    let current: ExpectedOutput = read_json(&config.replay.output)?;
    let input_digests = current_input_digests(&config.gate.inputs)?;
    let baseline_path = config.gate.baseline.display().to_string();

    let (verdict, baseline_written) = match mode {
        GateMode::Update => {
            let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
            let baseline = build_baseline(input_digests.clone(), current.clone(), updated_at);
            write_baseline(&config.gate.baseline, &baseline)?;
            let verdict = GateVerdict::Pass {
                checksum: current.policy_only_checksum_sha256.clone(),
            };
            (verdict, true)
        }
        GateMode::Check => {
            let baseline = load_baseline(&config.gate.baseline)?;
            let verdict = evaluate(&baseline, &input_digests, &current);
            match &verdict {
                GateVerdict::Pass { checksum } => {
                    tracing::info!(checksum = %checksum, "policy checksum matches baseline");
                }
                GateVerdict::Skip { changed_inputs } => {
                    let names: Vec<&str> =
                        changed_inputs.iter().map(|c| c.name.as_str()).collect();
                    tracing::warn!(
                        changed = ?names,
                        "policy inputs changed since baseline; run checksum-gate --mode update"
                    );
                }
                GateVerdict::Fail { expected, actual } => {
                    tracing::error!(
                        expected = %expected,
                        actual = %actual,
                        "policy checksum drifted with unchanged inputs"
                    );
                }
            }
            (verdict, false)
        }
    };

    Ok(GateReport {
        mode,
        verdict,
        baseline_path,
        baseline_written,
        input_digests,
        current,
    })
}
