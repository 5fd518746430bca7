//! `hintgate.toml`: the single configuration surface.
//!
//! ```toml
//! [dataset]
//! path = "data/sql_engage_dataset.csv"
//! fallback_subtype = "incomplete query"
//!
//! [aliases]
//! "no such column" = "undefined column"
//!
//! [ladder]
//! sources = ["content/ladders/select.json"]
//! output = "dist/hint-ladder-map.json"
//!
//! [replay]
//! fixture = "fixtures/replay/policy-fixture.json"
//! output = "dist/replay/policy-only.json"
//!
//! [gate]
//! baseline = "fixtures/replay/digest-baseline.json"
//!
//! [gate.inputs]
//! fixture = "fixtures/replay/policy-fixture.json"
//! dataset = "data/sql_engage_dataset.csv"
//! ```
//!
//! Relative paths resolve against the directory holding the config file.
//! Version tags are deliberately absent: they are compiled in.

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "hintgate.toml";
pub const DEFAULT_ROW_ID_PREFIX: &str = "sql-engage";
/// Gate input name reserved for the digest of the compiled-in policy logic.
pub const POLICY_LOGIC_INPUT: &str = "policy_logic";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    dataset: RawDataset,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
    ladder: RawLadder,
    replay: RawReplay,
    gate: RawGate,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDataset {
    path: String,
    #[serde(default = "default_row_id_prefix")]
    row_id_prefix: String,
    fallback_subtype: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLadder {
    sources: Vec<String>,
    output: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReplay {
    fixture: String,
    output: String,
    #[serde(default)]
    ladder_artifact: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGate {
    baseline: String,
    #[serde(default)]
    harness_command: Option<Vec<String>>,
    inputs: BTreeMap<String, String>,
}

fn default_row_id_prefix() -> String {
    DEFAULT_ROW_ID_PREFIX.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub row_id_prefix: String,
    pub fallback_subtype: String,
}

/// One ladder source: the id as written in config plus its resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub asset_id: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderConfig {
    pub sources: Vec<SourceRef>,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayConfig {
    pub fixture: PathBuf,
    pub output: PathBuf,
    /// Hint-text source for replay mode; defaults to the ladder output.
    pub ladder_artifact: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    pub baseline: PathBuf,
    pub harness_command: Option<Vec<String>>,
    pub inputs: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintgateConfig {
    pub config_path: PathBuf,
    pub root: PathBuf,
    pub dataset: DatasetConfig,
    pub aliases: BTreeMap<String, String>,
    pub ladder: LadderConfig,
    pub replay: ReplayConfig,
    pub gate: GateConfig,
}

impl HintgateConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let root = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_toml_str(&text, path, &root)
    }

    /// Parse config text, resolving relative paths against `root`.
    pub fn from_toml_str(
        text: &str,
        config_path: impl AsRef<Path>,
        root: impl AsRef<Path>,
    ) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref().to_path_buf();
        let root = root.as_ref().to_path_buf();
        let display = config_path.display().to_string();
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: display.clone(),
            source,
        })?;

        let invalid = |message: String| ConfigError::Invalid {
            path: display.clone(),
            message,
        };

        let fallback_subtype = raw.dataset.fallback_subtype.trim().to_lowercase();
        if fallback_subtype.is_empty() {
            return Err(invalid(
                "dataset.fallback_subtype must be a non-empty string".to_string(),
            ));
        }
        if raw.dataset.row_id_prefix.trim().is_empty() {
            return Err(invalid(
                "dataset.row_id_prefix must be a non-empty string".to_string(),
            ));
        }
        if raw.ladder.sources.is_empty() {
            return Err(invalid(
                "ladder.sources must list at least one source asset".to_string(),
            ));
        }
        if raw.gate.inputs.is_empty() {
            return Err(invalid(
                "gate.inputs must declare at least one policy input".to_string(),
            ));
        }
        if raw.gate.inputs.contains_key(POLICY_LOGIC_INPUT) {
            return Err(invalid(format!(
                "gate.inputs.{POLICY_LOGIC_INPUT} is reserved for the compiled policy logic digest"
            )));
        }
        if let Some(command) = raw.gate.harness_command.as_ref()
            && command.first().is_none_or(|program| program.trim().is_empty())
        {
            return Err(invalid(
                "gate.harness_command must name a program as its first element".to_string(),
            ));
        }

        let mut aliases = BTreeMap::new();
        let mut spellings: BTreeMap<String, String> = BTreeMap::new();
        for (from, to) in raw.aliases {
            let from_key = from.trim().to_lowercase();
            let to_value = to.trim().to_lowercase();
            if from_key.is_empty() || to_value.is_empty() {
                return Err(invalid(format!(
                    "aliases entry {from:?} = {to:?} must have non-empty key and value"
                )));
            }
            if let Some(earlier) = spellings.get(&from_key) {
                return Err(invalid(format!(
                    "aliases keys {earlier:?} and {from:?} both normalize to {from_key:?}"
                )));
            }
            spellings.insert(from_key.clone(), from);
            aliases.insert(from_key, to_value);
        }

        let mut sources = Vec::with_capacity(raw.ladder.sources.len());
        for source in raw.ladder.sources {
            let asset_id = source.trim().replace('\\', "/");
            if asset_id.is_empty() {
                return Err(invalid("ladder.sources entries must be non-empty".to_string()));
            }
            sources.push(SourceRef {
                path: resolve(&root, &asset_id),
                asset_id,
            });
        }

        let ladder_output = resolve(&root, &raw.ladder.output);
        let ladder_artifact = raw
            .replay
            .ladder_artifact
            .as_deref()
            .map(|value| resolve(&root, value))
            .unwrap_or_else(|| ladder_output.clone());

        Ok(Self {
            dataset: DatasetConfig {
                path: resolve(&root, &raw.dataset.path),
                row_id_prefix: raw.dataset.row_id_prefix.trim().to_string(),
                fallback_subtype,
            },
            aliases,
            ladder: LadderConfig {
                sources,
                output: ladder_output,
            },
            replay: ReplayConfig {
                fixture: resolve(&root, &raw.replay.fixture),
                output: resolve(&root, &raw.replay.output),
                ladder_artifact,
            },
            gate: GateConfig {
                baseline: resolve(&root, &raw.gate.baseline),
                harness_command: raw.gate.harness_command,
                inputs: raw
                    .gate
                    .inputs
                    .into_iter()
                    .map(|(name, value)| (name, resolve(&root, &value)))
                    .collect(),
            },
            config_path,
            root,
        })
    }
}

fn resolve(root: &Path, value: &str) -> PathBuf {
    let path = PathBuf::from(value.trim());
    if path.is_absolute() {
        path
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[dataset]
path = "data/dataset.csv"
fallback_subtype = "  Incomplete Query "

[aliases]
"Unknown Column" = "undefined column"

[ladder]
sources = ["content/b.json", "content/a.json"]
output = "dist/ladder.json"

[replay]
fixture = "fixtures/fixture.json"
output = "dist/replay.json"

[gate]
baseline = "fixtures/baseline.json"

[gate.inputs]
fixture = "fixtures/fixture.json"
dataset = "data/dataset.csv"
"#;

    #[test]
    fn relative_paths_resolve_against_root() {
        let config = HintgateConfig::from_toml_str(SAMPLE, "/repo/hintgate.toml", "/repo")
            .expect("sample config should parse");
        assert_eq!(config.dataset.path, PathBuf::from("/repo/data/dataset.csv"));
        assert_eq!(config.ladder.sources[0].asset_id, "content/b.json");
        assert_eq!(
            config.ladder.sources[0].path,
            PathBuf::from("/repo/content/b.json")
        );
        assert_eq!(
            config.gate.inputs.get("dataset"),
            Some(&PathBuf::from("/repo/data/dataset.csv"))
        );
    }

    #[test]
    fn fallback_and_aliases_are_normalized() {
        let config = HintgateConfig::from_toml_str(SAMPLE, "hintgate.toml", ".")
            .expect("sample config should parse");
        assert_eq!(config.dataset.fallback_subtype, "incomplete query");
        assert_eq!(config.dataset.row_id_prefix, DEFAULT_ROW_ID_PREFIX);
        assert_eq!(
            config.aliases.get("unknown column").map(String::as_str),
            Some("undefined column")
        );
    }

    #[test]
    fn replay_ladder_artifact_defaults_to_ladder_output() {
        let config = HintgateConfig::from_toml_str(SAMPLE, "hintgate.toml", "/r")
            .expect("sample config should parse");
        assert_eq!(config.replay.ladder_artifact, config.ladder.output);
    }

    #[test]
    fn empty_fallback_is_rejected() {
        let text = SAMPLE.replace("  Incomplete Query ", "   ");
        let err = HintgateConfig::from_toml_str(&text, "hintgate.toml", ".")
            .expect_err("blank fallback must fail");
        assert!(err.to_string().contains("fallback_subtype"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = format!("{SAMPLE}\n[extra]\nkey = 1\n");
        let err = HintgateConfig::from_toml_str(&text, "hintgate.toml", ".")
            .expect_err("unknown section must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn alias_keys_colliding_after_normalization_are_rejected() {
        let text = SAMPLE.replace(
            "\"Unknown Column\" = \"undefined column\"",
            "\"Unknown Column\" = \"undefined column\"\n\"unknown column \" = \"undefined table\"",
        );
        let err = HintgateConfig::from_toml_str(&text, "hintgate.toml", ".")
            .expect_err("colliding alias spellings must fail");
        assert!(matches!(err, ConfigError::Invalid { .. }));
        let message = err.to_string();
        assert!(message.contains("\"Unknown Column\""), "{message}");
        assert!(message.contains("\"unknown column \""), "{message}");
    }

    #[test]
    fn reserved_policy_logic_input_is_rejected() {
        let text = format!("{SAMPLE}policy_logic = \"src/policy.rs\"\n");
        let err = HintgateConfig::from_toml_str(&text, "hintgate.toml", ".")
            .expect_err("reserved input name must fail");
        assert!(err.to_string().contains(POLICY_LOGIC_INPUT));
    }

    #[test]
    fn empty_harness_command_is_rejected() {
        let text = SAMPLE.replace(
            "[gate]\nbaseline = \"fixtures/baseline.json\"",
            "[gate]\nbaseline = \"fixtures/baseline.json\"\nharness_command = []",
        );
        let err = HintgateConfig::from_toml_str(&text, "hintgate.toml", ".")
            .expect_err("empty argv must fail");
        assert!(err.to_string().contains("harness_command"));
    }
}
