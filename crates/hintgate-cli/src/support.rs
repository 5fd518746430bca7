use hintgate_dataset::{AliasTable, Canonicalizer, SubtypeIndex, load_index};
use hintgate_kernel::HintgateConfig;
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Rejected verdict: drift, invariant violation, parity divergence.
pub const EXIT_REJECTED: i32 = 1;
/// Configuration, input, or I/O error.
pub const EXIT_ERROR: i32 = 2;

pub const LOG_ENV: &str = "HINTGATE_LOG";

/// Diagnostics go to stderr so stdout carries only command results.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn emit_error(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(EXIT_ERROR);
}

pub fn render_json_payload<T: Serialize>(payload: &T) {
    let rendered = serde_json::to_string_pretty(payload)
        .unwrap_or_else(|error| emit_error(format!("failed to render json payload: {error}")));
    println!("{rendered}");
}

pub fn load_config_or_exit(path: &str) -> HintgateConfig {
    let config = HintgateConfig::load(Path::new(path)).unwrap_or_else(|error| emit_error(error));
    tracing::debug!(
        config = %config.config_path.display(),
        root = %config.root.display(),
        inputs = config.gate.inputs.len(),
        "config loaded"
    );
    config
}

pub fn alias_table(config: &HintgateConfig) -> AliasTable {
    AliasTable::builtin().with_overrides(&config.aliases)
}

/// Index the configured dataset and bind a canonicalizer to it.
pub fn load_dataset_or_exit(config: &HintgateConfig) -> (SubtypeIndex, Canonicalizer) {
    let aliases = alias_table(config);
    let index = load_index(&config.dataset.path, &aliases, &config.dataset.row_id_prefix)
        .unwrap_or_else(|error| emit_error(error));
    let canonicalizer =
        Canonicalizer::for_index(&index, aliases, &config.dataset.fallback_subtype)
            .unwrap_or_else(|error| emit_error(error));
    tracing::debug!(
        dataset = %config.dataset.path.display(),
        rows = index.row_count(),
        subtypes = index.subtype_count(),
        aliases = canonicalizer.aliases().len(),
        "dataset indexed"
    );
    (index, canonicalizer)
}
