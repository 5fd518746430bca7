//! Ladder artifact schema.
//!
//! Two views of the same JSON:
//! - [`LadderArtifact`] is what the converter produces. Its constructors make
//!   the invariants unrepresentable to break: levels are assigned 1..n,
//!   labels are derived from levels, and stats are computed.
//! - [`ArtifactDocument`] is what a reader gets back from disk. It carries
//!   every field verbatim so the verifier can see a hand-edited or drifted
//!   file exactly as written.

use crate::error::LadderError;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fs;
use std::path::Path;

/// Bumped when the transformation algorithm changes.
pub const CONVERTER_POLICY_VERSION: &str = "ladder-converter-v1";

/// Bumped when the meaning of level ordering changes.
pub const POLICY_SEMANTICS_VERSION: &str = "hint-ladder-semantics-v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceAsset {
    pub asset_id: String,
    pub raw_sha256: String,
}

/// One rung of a ladder. The label is always `H<level>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintLevel {
    level: usize,
    hint: String,
}

impl HintLevel {
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn label(&self) -> String {
        format!("H{}", self.level)
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }
}

impl Serialize for HintLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HintLevel", 3)?;
        state.serialize_field("level", &self.level)?;
        state.serialize_field("label", &self.label())?;
        state.serialize_field("hint", &self.hint)?;
        state.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LadderEntry {
    challenge_key: String,
    hint_levels: Vec<HintLevel>,
}

impl LadderEntry {
    /// Levels are assigned from hint order, starting at 1.
    pub fn from_hints(challenge_key: impl Into<String>, hints: Vec<String>) -> Self {
        let hint_levels = hints
            .into_iter()
            .enumerate()
            .map(|(idx, hint)| HintLevel {
                level: idx + 1,
                hint,
            })
            .collect();
        Self {
            challenge_key: challenge_key.into(),
            hint_levels,
        }
    }

    pub fn challenge_key(&self) -> &str {
        &self.challenge_key
    }

    pub fn hint_levels(&self) -> &[HintLevel] {
        &self.hint_levels
    }

    pub fn max_level(&self) -> usize {
        self.hint_levels.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LadderStats {
    pub unique_challenge_keys: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LadderArtifact {
    converter_policy_version: String,
    policy_semantics_version: String,
    source_assets: Vec<SourceAsset>,
    challenge_map: Vec<LadderEntry>,
    stats: LadderStats,
}

impl LadderArtifact {
    /// Stamp versions and compute stats. Callers supply entries with
    /// distinct keys, in the order they should be written.
    pub fn new(source_assets: Vec<SourceAsset>, challenge_map: Vec<LadderEntry>) -> Self {
        let stats = LadderStats {
            unique_challenge_keys: challenge_map.len(),
        };
        Self {
            converter_policy_version: CONVERTER_POLICY_VERSION.to_string(),
            policy_semantics_version: POLICY_SEMANTICS_VERSION.to_string(),
            source_assets,
            challenge_map,
            stats,
        }
    }

    pub fn source_assets(&self) -> &[SourceAsset] {
        &self.source_assets
    }

    pub fn challenge_map(&self) -> &[LadderEntry] {
        &self.challenge_map
    }

    pub fn stats(&self) -> LadderStats {
        self.stats
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentHintLevel {
    pub level: i64,
    pub label: String,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentEntry {
    pub challenge_key: String,
    pub hint_levels: Vec<DocumentHintLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentStats {
    pub unique_challenge_keys: i64,
}

/// The artifact as read back from disk, unvalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactDocument {
    pub converter_policy_version: String,
    pub policy_semantics_version: String,
    pub source_assets: Vec<SourceAsset>,
    pub challenge_map: Vec<DocumentEntry>,
    pub stats: DocumentStats,
}

impl ArtifactDocument {
    pub fn entry(&self, challenge_key: &str) -> Option<&DocumentEntry> {
        self.challenge_map
            .iter()
            .find(|entry| entry.challenge_key == challenge_key)
    }

    /// Hint text for `challenge_key` at `level`, if the ladder has that rung.
    pub fn hint(&self, challenge_key: &str, level: usize) -> Option<&str> {
        let level = i64::try_from(level).ok()?;
        self.entry(challenge_key)?
            .hint_levels
            .iter()
            .find(|rung| rung.level == level)
            .map(|rung| rung.hint.as_str())
    }
}

/// Read an artifact file into its unvalidated document form.
pub fn load_artifact_document(path: impl AsRef<Path>) -> Result<ArtifactDocument, LadderError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| LadderError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| LadderError::ParseArtifact {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn labels_are_derived_from_levels() {
        let entry = LadderEntry::from_hints(
            "select-1",
            vec!["look at the column list".into(), "check spelling".into()],
        );
        let levels: Vec<(usize, String)> = entry
            .hint_levels()
            .iter()
            .map(|rung| (rung.level(), rung.label()))
            .collect();
        assert_eq!(levels, vec![(1, "H1".to_string()), (2, "H2".to_string())]);
    }

    #[test]
    fn serialized_field_order_is_fixed() {
        let artifact = LadderArtifact::new(
            vec![SourceAsset {
                asset_id: "a.json".into(),
                raw_sha256: "0".repeat(64),
            }],
            vec![LadderEntry::from_hints("k", vec!["h".into()])],
        );
        let rendered = serde_json::to_string(&artifact).expect("serialize");
        assert_eq!(
            rendered,
            format!(
                "{{\"converter_policy_version\":\"{CONVERTER_POLICY_VERSION}\",\
                 \"policy_semantics_version\":\"{POLICY_SEMANTICS_VERSION}\",\
                 \"source_assets\":[{{\"asset_id\":\"a.json\",\"raw_sha256\":\"{}\"}}],\
                 \"challenge_map\":[{{\"challenge_key\":\"k\",\"hint_levels\":\
                 [{{\"level\":1,\"label\":\"H1\",\"hint\":\"h\"}}]}}],\
                 \"stats\":{{\"unique_challenge_keys\":1}}}}",
                "0".repeat(64)
            )
        );
    }

    #[test]
    fn document_round_trips_what_the_converter_writes() {
        let artifact = LadderArtifact::new(
            Vec::new(),
            vec![LadderEntry::from_hints("k", vec!["one".into(), "two".into()])],
        );
        let value = serde_json::to_value(&artifact).expect("serialize");
        let document: ArtifactDocument = serde_json::from_value(value).expect("deserialize");
        assert_eq!(document.hint("k", 2), Some("two"));
        assert_eq!(document.hint("k", 3), None);
        assert_eq!(document.hint("missing", 1), None);
        assert_eq!(document.stats.unique_challenge_keys, 1);
    }

    #[test]
    fn document_rejects_fields_outside_the_schema() {
        let stray_top = json!({
            "converter_policy_version": "v",
            "policy_semantics_version": "v",
            "source_assets": [],
            "challenge_map": [],
            "stats": {"unique_challenge_keys": 0},
            "generated_at": "2026-01-01T00:00:00Z"
        });
        let err = serde_json::from_value::<ArtifactDocument>(stray_top).expect_err("stray field");
        assert!(err.to_string().contains("generated_at"), "{err}");

        let stray_rung = json!({
            "converter_policy_version": "v",
            "policy_semantics_version": "v",
            "source_assets": [],
            "challenge_map": [{
                "challenge_key": "k",
                "hint_levels": [{"level": 1, "label": "H1", "hint": "x", "weight": 2}]
            }],
            "stats": {"unique_challenge_keys": 1}
        });
        let err = serde_json::from_value::<ArtifactDocument>(stray_rung).expect_err("stray field");
        assert!(err.to_string().contains("weight"), "{err}");
    }

    #[test]
    fn document_keeps_inconsistent_labels_verbatim() {
        let document: ArtifactDocument = serde_json::from_value(json!({
            "converter_policy_version": "v",
            "policy_semantics_version": "v",
            "source_assets": [],
            "challenge_map": [{
                "challenge_key": "k",
                "hint_levels": [{"level": 1, "label": "H7", "hint": "x"}]
            }],
            "stats": {"unique_challenge_keys": 1}
        }))
        .expect("deserialize");
        assert_eq!(document.challenge_map[0].hint_levels[0].label, "H7");
    }
}
