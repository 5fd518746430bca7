//! Converter idempotency and artifact structure checks.
//!
//! The verifier treats the converter as a black box that writes a file and
//! prints a report. It runs it twice, hashes what is actually on disk after
//! each run, and then re-reads the second output without trusting any of
//! the converter's own types.

use crate::artifact::{ArtifactDocument, load_artifact_document};
use crate::convert::convert_to_path;
use crate::error::LadderError;
use hintgate_kernel::{SourceRef, is_sha256_hex, sha256_file};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// One invocation of the converter. Returns the converter's report text.
pub trait ConverterRun {
    fn run(&mut self) -> Result<String, LadderError>;
}

/// Runs the converter in-process against configured sources.
#[derive(Debug, Clone)]
pub struct InProcessConverter {
    pub sources: Vec<SourceRef>,
    pub output: PathBuf,
}

impl InProcessConverter {
    pub fn new(sources: Vec<SourceRef>, output: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            output: output.into(),
        }
    }
}

impl ConverterRun for InProcessConverter {
    fn run(&mut self) -> Result<String, LadderError> {
        convert_to_path(&self.sources, &self.output).map(|report| report.log_line())
    }
}

/// The first structural problem found in an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvariantViolation {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub message: String,
}

impl InvariantViolation {
    fn top(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            challenge_key: None,
            index: None,
            message: message.into(),
        }
    }

    fn at(field: &str, challenge_key: &str, index: usize, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            challenge_key: Some(challenge_key.to_string()),
            index: Some(index),
            message: message.into(),
        }
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if let Some(key) = &self.challenge_key {
            write!(f, " (challenge_key={key}")?;
            if let Some(index) = self.index {
                write!(f, ", index={index}")?;
            }
            write!(f, ")")?;
        } else if let Some(index) = self.index {
            write!(f, " (index={index})")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[derive(Debug, Error)]
pub enum VerifyFailure {
    #[error("converter run {run} failed: {source}")]
    Converter {
        run: usize,
        #[source]
        source: LadderError,
    },

    #[error("failed to read converter output {path}: {source}")]
    ReadOutput {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("converter is not idempotent: run 1 sha256={first}, run 2 sha256={second}")]
    NotIdempotent { first: String, second: String },

    #[error(
        "converter run {run} reported sha256={reported} but {path} has sha256={actual}"
    )]
    ReportedDigestMismatch {
        run: usize,
        reported: String,
        actual: String,
        path: String,
    },

    #[error(transparent)]
    Parse(LadderError),

    #[error("artifact invariant violated at {0}")]
    Invariant(InvariantViolation),
}

impl VerifyFailure {
    /// Integrity failures reject the artifact; the rest are operational.
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::NotIdempotent { .. } | Self::ReportedDigestMismatch { .. } | Self::Invariant(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdempotencyReport {
    pub output_path: String,
    pub output_sha256: String,
    /// Present when the converter's report carried a digest.
    pub reported_sha256: Option<String>,
    pub unique_challenge_keys: usize,
}

fn reported_digest_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"sha256=([0-9a-f]{64})\b").expect("reported digest regex must compile")
    })
}

/// Extract a self-reported `sha256=<hex>` digest from converter output.
pub fn parse_reported_digest(log: &str) -> Option<String> {
    reported_digest_re()
        .captures(log)
        .and_then(|captures| captures.get(1))
        .map(|digest| digest.as_str().to_string())
}

/// Check every structural invariant, stopping at the first violation.
pub fn validate_artifact(document: &ArtifactDocument) -> Result<(), InvariantViolation> {
    if document.converter_policy_version.trim().is_empty() {
        return Err(InvariantViolation::top(
            "converter_policy_version",
            "must be non-empty",
        ));
    }
    if document.policy_semantics_version.trim().is_empty() {
        return Err(InvariantViolation::top(
            "policy_semantics_version",
            "must be non-empty",
        ));
    }

    for (index, asset) in document.source_assets.iter().enumerate() {
        if asset.asset_id.trim().is_empty() {
            return Err(InvariantViolation {
                index: Some(index),
                ..InvariantViolation::top("source_assets.asset_id", "must be non-empty")
            });
        }
        if !is_sha256_hex(&asset.raw_sha256) {
            return Err(InvariantViolation {
                index: Some(index),
                ..InvariantViolation::top(
                    "source_assets.raw_sha256",
                    format!(
                        "expected 64 lowercase hex characters for {}, got {:?}",
                        asset.asset_id, asset.raw_sha256
                    ),
                )
            });
        }
    }

    let mut seen = BTreeSet::new();
    for (index, entry) in document.challenge_map.iter().enumerate() {
        let key = entry.challenge_key.as_str();
        if key.trim().is_empty() {
            return Err(InvariantViolation {
                index: Some(index),
                ..InvariantViolation::top("challenge_map.challenge_key", "must be non-empty")
            });
        }
        if !seen.insert(key) {
            return Err(InvariantViolation::at(
                "challenge_map.challenge_key",
                key,
                index,
                "duplicate challenge key",
            ));
        }
        if entry.hint_levels.is_empty() {
            return Err(InvariantViolation::at(
                "challenge_map.hint_levels",
                key,
                index,
                "ladder has no hint levels",
            ));
        }
        for (rung, level) in entry.hint_levels.iter().enumerate() {
            let expected = rung as i64 + 1;
            if level.level != expected {
                return Err(InvariantViolation::at(
                    "hint_levels.level",
                    key,
                    rung,
                    format!("expected level {expected}, found {}", level.level),
                ));
            }
            let expected_label = format!("H{expected}");
            if level.label != expected_label {
                return Err(InvariantViolation::at(
                    "hint_levels.label",
                    key,
                    rung,
                    format!("expected label {expected_label}, found {:?}", level.label),
                ));
            }
            if level.hint.trim().is_empty() {
                return Err(InvariantViolation::at(
                    "hint_levels.hint",
                    key,
                    rung,
                    "hint text is empty",
                ));
            }
        }
    }

    let declared = document.stats.unique_challenge_keys;
    if usize::try_from(declared).ok() != Some(document.challenge_map.len()) {
        return Err(InvariantViolation::top(
            "stats.unique_challenge_keys",
            format!(
                "declares {declared} but challenge_map has {} entries",
                document.challenge_map.len()
            ),
        ));
    }
    Ok(())
}

/// Run the converter twice and verify the written artifact.
pub fn verify_idempotency(
    converter: &mut impl ConverterRun,
    output: impl AsRef<Path>,
) -> Result<IdempotencyReport, VerifyFailure> {
    let output = output.as_ref();
    let (first, _) = run_and_hash(converter, 1, output)?;
    let (second, reported) = run_and_hash(converter, 2, output)?;
    if first != second {
        return Err(VerifyFailure::NotIdempotent { first, second });
    }

    let document = load_artifact_document(output).map_err(VerifyFailure::Parse)?;
    validate_artifact(&document).map_err(VerifyFailure::Invariant)?;

    tracing::info!(
        output = %output.display(),
        sha256 = %second,
        challenges = document.challenge_map.len(),
        "ladder artifact verified"
    );
    Ok(IdempotencyReport {
        output_path: output.display().to_string(),
        output_sha256: second,
        reported_sha256: reported,
        unique_challenge_keys: document.challenge_map.len(),
    })
}

fn run_and_hash(
    converter: &mut impl ConverterRun,
    run: usize,
    output: &Path,
) -> Result<(String, Option<String>), VerifyFailure> {
    let log = converter
        .run()
        .map_err(|source| VerifyFailure::Converter { run, source })?;
    let actual = sha256_file(output).map_err(|source| VerifyFailure::ReadOutput {
        path: output.display().to_string(),
        source,
    })?;
    let reported = parse_reported_digest(&log);
    match &reported {
        Some(reported) if *reported != actual => {
            return Err(VerifyFailure::ReportedDigestMismatch {
                run,
                reported: reported.clone(),
                actual,
                path: output.display().to_string(),
            });
        }
        _ => {}
    }
    tracing::debug!(run, sha256 = %actual, "converter output hashed");
    Ok((actual, reported))
}
