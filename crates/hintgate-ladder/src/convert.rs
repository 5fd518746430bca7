//! Source assets → hint-ladder map.

use crate::artifact::{LadderArtifact, LadderEntry, SourceAsset};
use crate::error::LadderError;
use crate::source::{LoadedSource, load_source};
use hintgate_kernel::{SourceRef, render_pretty_json, sha256_hex, write_atomic};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// What one converter run claims to have written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertReport {
    pub output_path: PathBuf,
    pub output_sha256: String,
    pub source_count: usize,
    pub unique_challenge_keys: usize,
}

impl ConvertReport {
    /// The converter's log line. Carries the self-reported output digest.
    pub fn log_line(&self) -> String {
        format!(
            "ladder-convert: wrote {} sha256={} challenges={}",
            self.output_path.display(),
            self.output_sha256,
            self.unique_challenge_keys
        )
    }
}

/// Assemble an artifact from already-loaded sources.
///
/// Sources are taken in `asset_id` order and entries are emitted in
/// `challenge_key` order, so input listing order never affects output bytes.
/// A challenge key declared twice is an error, never merged.
pub fn build_artifact(mut sources: Vec<LoadedSource>) -> Result<LadderArtifact, LadderError> {
    sources.sort_by(|a, b| a.asset.asset_id.cmp(&b.asset.asset_id));
    if let Some(pair) = sources
        .windows(2)
        .find(|pair| pair[0].asset.asset_id == pair[1].asset.asset_id)
    {
        return Err(LadderError::DuplicateAsset {
            asset_id: pair[0].asset.asset_id.clone(),
        });
    }

    let mut entries: BTreeMap<String, (String, LadderEntry)> = BTreeMap::new();
    let mut assets: Vec<SourceAsset> = Vec::with_capacity(sources.len());

    for source in sources {
        let asset_id = source.asset.asset_id.clone();
        for (index, ladder) in source.ladders.into_iter().enumerate() {
            let challenge_key = ladder.challenge_key.trim().to_string();
            if challenge_key.is_empty() {
                return Err(LadderError::EmptyChallengeKey { asset_id, index });
            }
            if let Some((first_asset, _)) = entries.get(&challenge_key) {
                return Err(LadderError::DuplicateChallengeKey {
                    challenge_key,
                    first_asset: first_asset.clone(),
                    second_asset: asset_id,
                });
            }
            if ladder.hints.is_empty() {
                return Err(LadderError::EmptyLadder {
                    asset_id,
                    challenge_key,
                });
            }

            let mut hints = Vec::with_capacity(ladder.hints.len());
            for (idx, hint) in ladder.hints.iter().enumerate() {
                let text = hint.trim();
                if text.is_empty() {
                    return Err(LadderError::EmptyHint {
                        asset_id,
                        challenge_key,
                        level: idx + 1,
                    });
                }
                hints.push(text.to_string());
            }

            let entry = LadderEntry::from_hints(challenge_key.clone(), hints);
            entries.insert(challenge_key, (asset_id.clone(), entry));
        }
        assets.push(source.asset);
    }

    let challenge_map = entries.into_values().map(|(_, entry)| entry).collect();
    Ok(LadderArtifact::new(assets, challenge_map))
}

/// Read every configured source and build the artifact.
pub fn convert(sources: &[SourceRef]) -> Result<LadderArtifact, LadderError> {
    let loaded = sources
        .iter()
        .map(load_source)
        .collect::<Result<Vec<_>, _>>()?;
    build_artifact(loaded)
}

/// Convert and fully replace `output` with the rendered artifact.
pub fn convert_to_path(
    sources: &[SourceRef],
    output: impl AsRef<Path>,
) -> Result<ConvertReport, LadderError> {
    let output = output.as_ref();
    let artifact = convert(sources)?;
    let rendered = render_pretty_json(&artifact).map_err(LadderError::Render)?;
    write_atomic(output, rendered.as_bytes()).map_err(|source| LadderError::Write {
        path: output.display().to_string(),
        source,
    })?;

    let report = ConvertReport {
        output_path: output.to_path_buf(),
        output_sha256: sha256_hex(rendered.as_bytes()),
        source_count: artifact.source_assets().len(),
        unique_challenge_keys: artifact.stats().unique_challenge_keys,
    };
    tracing::info!(
        output = %output.display(),
        sha256 = %report.output_sha256,
        challenges = report.unique_challenge_keys,
        "ladder artifact written"
    );
    Ok(report)
}
