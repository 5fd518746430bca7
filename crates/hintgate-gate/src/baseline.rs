//! The digest baseline record and its two I/O operations.

use crate::error::GateError;
use crate::replay::read_json;
use hintgate_kernel::{render_pretty_json, write_atomic};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const BASELINE_SCHEMA_VERSION: u32 = 1;

/// Checksum and version fields the replay output is expected to carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedOutput {
    pub policy_only_checksum_sha256: String,
    pub replay_harness_version: String,
    pub replay_policy_semantics_version: String,
    pub sql_engage_policy_version: String,
}

/// Expected output, valid only while `fixture_policy_input_digests_sha256`
/// matches the current inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestBaseline {
    pub schema_version: u32,
    pub fixture_policy_input_digests_sha256: BTreeMap<String, String>,
    pub expected: ExpectedOutput,
    pub updated_at: String,
}

/// Read the baseline. Absence is a configuration error with a remedy.
pub fn load_baseline(path: impl AsRef<Path>) -> Result<DigestBaseline, GateError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(GateError::BaselineMissing {
            path: path.display().to_string(),
        });
    }
    let baseline: DigestBaseline = read_json(path)?;
    if baseline.schema_version != BASELINE_SCHEMA_VERSION {
        return Err(GateError::BaselineSchema {
            path: path.display().to_string(),
            found: baseline.schema_version,
            expected: BASELINE_SCHEMA_VERSION,
        });
    }
    Ok(baseline)
}

/// Persist the baseline as pretty JSON with a trailing newline.
pub fn write_baseline(path: impl AsRef<Path>, baseline: &DigestBaseline) -> Result<(), GateError> {
    let path = path.as_ref();
    let rendered = render_pretty_json(baseline).map_err(GateError::Render)?;
    write_atomic(path, rendered.as_bytes()).map_err(|source| GateError::Write {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!(path = %path.display(), "digest baseline written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "hintgate-baseline-{prefix}-{}-{nanos}.json",
            std::process::id()
        ))
    }

    fn sample() -> DigestBaseline {
        DigestBaseline {
            schema_version: BASELINE_SCHEMA_VERSION,
            fixture_policy_input_digests_sha256: BTreeMap::from([
                ("fixture".to_string(), "a".repeat(64)),
                ("dataset".to_string(), "b".repeat(64)),
            ]),
            expected: ExpectedOutput {
                policy_only_checksum_sha256: "c".repeat(64),
                replay_harness_version: "replay-harness-v1".into(),
                replay_policy_semantics_version: "replay-policy-semantics-v1".into(),
                sql_engage_policy_version: "sql-engage-policy-v1".into(),
            },
            updated_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn written_baseline_loads_back_and_ends_with_newline() {
        let path = temp_path("round-trip");
        write_baseline(&path, &sample()).expect("write");
        let text = fs::read_to_string(&path).expect("read back");
        assert!(text.ends_with("}\n"));
        // Input keys are sorted in the file.
        assert!(text.find("\"dataset\"") < text.find("\"fixture\""));
        assert_eq!(load_baseline(&path).expect("load"), sample());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_baseline_is_reported_with_remedy() {
        let err = load_baseline(temp_path("missing")).expect_err("absent file");
        assert!(matches!(err, GateError::BaselineMissing { .. }));
        assert!(err.to_string().contains("checksum-gate --mode update"));
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let path = temp_path("schema");
        let mut baseline = sample();
        baseline.schema_version = 2;
        write_baseline(&path, &baseline).expect("write");
        let err = load_baseline(&path).expect_err("schema 2");
        assert!(matches!(err, GateError::BaselineSchema { found: 2, .. }));
        let _ = fs::remove_file(&path);
    }
}
