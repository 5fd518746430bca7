//! Converter errors.

/// Errors from reading source assets or producing the ladder artifact.
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ladder source {asset_id}: {source}")]
    ParseSource {
        asset_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid ladder artifact {path}: {source}")]
    ParseArtifact {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("ladder source {asset_id} is listed more than once")]
    DuplicateAsset { asset_id: String },

    #[error("{asset_id}: ladders[{index}].challenge_key must be non-empty")]
    EmptyChallengeKey { asset_id: String, index: usize },

    #[error(
        "challenge_key {challenge_key:?} is declared by both {first_asset} and {second_asset}"
    )]
    DuplicateChallengeKey {
        challenge_key: String,
        first_asset: String,
        second_asset: String,
    },

    #[error("{asset_id}: challenge {challenge_key:?} has no hints")]
    EmptyLadder {
        asset_id: String,
        challenge_key: String,
    },

    #[error("{asset_id}: challenge {challenge_key:?} hint at level {level} is empty")]
    EmptyHint {
        asset_id: String,
        challenge_key: String,
        level: usize,
    },

    #[error("failed to render ladder artifact: {0}")]
    Render(#[source] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
