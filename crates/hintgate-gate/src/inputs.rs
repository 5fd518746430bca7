//! Digests of declared policy-relevant inputs.

use crate::error::GateError;
use crate::replay::{
    REPLAY_HARNESS_VERSION, REPLAY_POLICY_SEMANTICS_VERSION, SQL_ENGAGE_POLICY_VERSION,
};
use hintgate_dataset::STABLE_HASH_VERSION;
use hintgate_kernel::{POLICY_LOGIC_INPUT, sha256_file, sha256_hex};
use hintgate_ladder::{CONVERTER_POLICY_VERSION, POLICY_SEMANTICS_VERSION};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Version tags of every compiled-in stage that shapes a decision trace.
pub const POLICY_LOGIC_VERSIONS: [&str; 6] = [
    REPLAY_HARNESS_VERSION,
    REPLAY_POLICY_SEMANTICS_VERSION,
    SQL_ENGAGE_POLICY_VERSION,
    STABLE_HASH_VERSION,
    CONVERTER_POLICY_VERSION,
    POLICY_SEMANTICS_VERSION,
];

/// Digest standing in for the policy logic and harness, which live in this
/// binary rather than in files. Bumping any tag changes it.
pub fn policy_logic_digest() -> String {
    sha256_hex(POLICY_LOGIC_VERSIONS.join("\n").as_bytes())
}

/// SHA-256 of every declared input, keyed by its configured name.
///
/// A declared input that cannot be read is an error, not a missing key: the
/// gate must never compare against a partial set.
pub fn compute_input_digests(
    inputs: &BTreeMap<String, PathBuf>,
) -> Result<BTreeMap<String, String>, GateError> {
    inputs
        .iter()
        .map(|(name, path)| {
            let digest = sha256_file(path).map_err(|source| GateError::ReadFile {
                path: path.display().to_string(),
                source,
            })?;
            tracing::debug!(input = %name, path = %path.display(), sha256 = %digest, "input digested");
            Ok((name.clone(), digest))
        })
        .collect()
}

/// Declared file inputs plus the compiled policy logic entry.
pub fn current_input_digests(
    inputs: &BTreeMap<String, PathBuf>,
) -> Result<BTreeMap<String, String>, GateError> {
    let mut digests = compute_input_digests(inputs)?;
    digests.insert(POLICY_LOGIC_INPUT.to_string(), policy_logic_digest());
    Ok(digests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "hintgate-inputs-{prefix}-{}-{nanos}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn digests_are_keyed_by_input_name() {
        let dir = temp_dir("keyed");
        fs::write(dir.join("a.csv"), "query,error_subtype\n").expect("write a");
        fs::write(dir.join("b.json"), "{}").expect("write b");
        let inputs = BTreeMap::from([
            ("fixture".to_string(), dir.join("b.json")),
            ("dataset".to_string(), dir.join("a.csv")),
        ]);
        let digests = compute_input_digests(&inputs).expect("digests");
        assert_eq!(digests.keys().collect::<Vec<_>>(), vec!["dataset", "fixture"]);
        assert_eq!(digests["fixture"], sha256_hex(b"{}"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn policy_logic_entry_joins_declared_inputs() {
        let dir = temp_dir("logic");
        fs::write(dir.join("b.json"), "{}").expect("write b");
        let inputs = BTreeMap::from([("fixture".to_string(), dir.join("b.json"))]);
        let digests = current_input_digests(&inputs).expect("digests");
        assert_eq!(
            digests.keys().collect::<Vec<_>>(),
            vec!["fixture", POLICY_LOGIC_INPUT]
        );
        assert_eq!(digests[POLICY_LOGIC_INPUT], policy_logic_digest());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unreadable_input_is_an_error() {
        let dir = temp_dir("missing");
        let inputs = BTreeMap::from([("fixture".to_string(), dir.join("absent.json"))]);
        let err = compute_input_digests(&inputs).expect_err("absent input");
        assert!(err.to_string().contains("absent.json"));
        let _ = fs::remove_dir_all(&dir);
    }
}
