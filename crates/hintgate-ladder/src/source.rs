//! Ladder source assets.
//!
//! A source asset is a JSON file of authored ladders:
//!
//! ```json
//! { "ladders": [ { "challenge_key": "select-1", "hints": ["...", "..."] } ] }
//! ```
//!
//! Its `raw_sha256` is taken over the exact bytes read, in the same read that
//! feeds the parser.

use crate::artifact::SourceAsset;
use crate::error::LadderError;
use hintgate_kernel::{SourceRef, sha256_hex};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceLadder {
    pub challenge_key: String,
    pub hints: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceFile {
    ladders: Vec<SourceLadder>,
}

/// A source asset's identity, integrity digest, and parsed ladders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    pub asset: SourceAsset,
    pub ladders: Vec<SourceLadder>,
}

/// Hash and parse one asset's bytes.
pub fn parse_source(asset_id: &str, bytes: &[u8]) -> Result<LoadedSource, LadderError> {
    let file: SourceFile =
        serde_json::from_slice(bytes).map_err(|source| LadderError::ParseSource {
            asset_id: asset_id.to_string(),
            source,
        })?;
    Ok(LoadedSource {
        asset: SourceAsset {
            asset_id: asset_id.to_string(),
            raw_sha256: sha256_hex(bytes),
        },
        ladders: file.ladders,
    })
}

/// Read one configured asset from disk.
pub fn load_source(source: &SourceRef) -> Result<LoadedSource, LadderError> {
    let bytes = fs::read(&source.path).map_err(|err| LadderError::Read {
        path: source.path.display().to_string(),
        source: err,
    })?;
    let loaded = parse_source(&source.asset_id, &bytes)?;
    tracing::debug!(
        asset_id = %loaded.asset.asset_id,
        raw_sha256 = %loaded.asset.raw_sha256,
        ladders = loaded.ladders.len(),
        "ladder source read"
    );
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_covers_raw_bytes_including_whitespace() {
        let compact = br#"{"ladders":[]}"#;
        let spaced = b"{ \"ladders\": [] }\n";
        let a = parse_source("a.json", compact).expect("compact parses");
        let b = parse_source("a.json", spaced).expect("spaced parses");
        assert_eq!(a.ladders, b.ladders);
        assert_ne!(a.asset.raw_sha256, b.asset.raw_sha256);
        assert_eq!(a.asset.raw_sha256, sha256_hex(compact));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse_source("a.json", br#"{"ladders":[],"extra":1}"#)
            .expect_err("unknown field must fail");
        assert!(err.to_string().contains("a.json"));
    }

    #[test]
    fn hints_keep_authored_order() {
        let loaded = parse_source(
            "a.json",
            br#"{"ladders":[{"challenge_key":"k","hints":["first","second","third"]}]}"#,
        )
        .expect("parses");
        assert_eq!(loaded.ladders[0].hints, vec!["first", "second", "third"]);
    }
}
