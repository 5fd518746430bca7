//! Configuration errors.

/// Errors loading or validating `hintgate.toml`.
///
/// All of these are fatal: the process exits non-zero with the message,
/// which names the offending file and key.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config {path}: {message}")]
    Invalid { path: String, message: String },
}
