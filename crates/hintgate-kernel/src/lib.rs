//! # hintgate-kernel
//!
//! Primitives shared by every hintgate layer:
//! - SHA-256 content digests over bytes and files
//! - canonical JSON bytes (sorted keys, no whitespace) for stable hashing
//! - atomic whole-file replacement for derived artifacts
//! - the `hintgate.toml` configuration surface
//!
//! Nothing here knows about datasets, ladders, or baselines.

pub mod config;
pub mod digest;
pub mod error;
pub mod fsio;

pub use config::{
    DEFAULT_CONFIG_PATH, DEFAULT_ROW_ID_PREFIX, DatasetConfig, GateConfig, HintgateConfig,
    POLICY_LOGIC_INPUT,
    LadderConfig, ReplayConfig, SourceRef,
};
pub use digest::{canonical_json_bytes, is_sha256_hex, sha256_file, sha256_hex, stable_sha256};
pub use error::ConfigError;
pub use fsio::{render_pretty_json, write_atomic};
