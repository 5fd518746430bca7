//! Gate and replay errors.
//!
//! Verdicts are not errors: a drifted checksum is `GateVerdict::Fail`. These
//! variants cover everything that prevents reaching a verdict at all.

use hintgate_dataset::DatasetError;
use hintgate_kernel::ConfigError;
use hintgate_ladder::LadderError;

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Ladder(#[from] LadderError),

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid json at {path}: {source}")]
    ParseJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "no dataset row for subtype {subtype:?} (problem {problem_id}, attempt {attempt}); \
         the index must serve every canonical subtype"
    )]
    NoRowForSubtype {
        subtype: String,
        problem_id: String,
        attempt: usize,
    },

    #[error(
        "digest baseline not found at {path}; run `hintgate checksum-gate --mode update` \
         to record one"
    )]
    BaselineMissing { path: String },

    #[error(
        "digest baseline {path} has schema_version {found}, expected {expected}; \
         regenerate it with `hintgate checksum-gate --mode update`"
    )]
    BaselineSchema {
        path: String,
        found: u32,
        expected: u32,
    },

    #[error("failed to start replay harness `{command}`: {source}")]
    HarnessSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The harness ran and exited non-zero. `code` is `None` when it was
    /// terminated by a signal.
    #[error("replay harness `{command}` exited with {}", describe_exit(.code))]
    HarnessFailed { command: String, code: Option<i32> },

    #[error("failed to render json: {0}")]
    Render(#[source] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GateError {
    /// Exit code the CLI should forward: the harness's own code when it
    /// failed, otherwise `None`.
    pub fn forwarded_exit_code(&self) -> Option<i32> {
        match self {
            Self::HarnessFailed { code, .. } => Some(code.unwrap_or(1)),
            _ => None,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harness_failure_forwards_its_code() {
        let err = GateError::HarnessFailed {
            command: "replay".into(),
            code: Some(7),
        };
        assert_eq!(err.forwarded_exit_code(), Some(7));
        assert!(err.to_string().contains("status 7"));
    }

    #[test]
    fn signal_terminated_harness_maps_to_one() {
        let err = GateError::HarnessFailed {
            command: "replay".into(),
            code: None,
        };
        assert_eq!(err.forwarded_exit_code(), Some(1));
        assert!(err.to_string().ends_with("a signal"));
    }

    #[test]
    fn missing_baseline_message_names_the_remedy() {
        let err = GateError::BaselineMissing {
            path: "fixtures/baseline.json".into(),
        };
        assert!(err.to_string().contains("--mode update"));
        assert_eq!(err.forwarded_exit_code(), None);
    }
}
