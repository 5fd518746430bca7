use clap::{Parser, Subcommand, ValueEnum};
use hintgate_gate::GateMode;

#[derive(Parser)]
#[command(
    name = "hintgate",
    about = "Hintgate: deterministic hint-content indexing and replay checksum gating",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map a raw error label onto a canonical dataset subtype
    Canonicalize {
        /// Raw error label, e.g. "Unknown Column"
        label: String,

        /// Path to hintgate.toml
        #[arg(long, default_value = "hintgate.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Canonicalize a label, then deterministically pick one dataset row
    SelectRow {
        /// Raw or canonical error label
        subtype: String,

        /// Selection seed, e.g. "<learner>:<problem>"
        #[arg(long)]
        seed: String,

        /// Path to hintgate.toml
        #[arg(long, default_value = "hintgate.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Index the dataset and check fallback presence and subtype coverage
    DatasetCheck {
        /// Path to hintgate.toml
        #[arg(long, default_value = "hintgate.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert ladder source assets into the hint-ladder map artifact
    LadderConvert {
        /// Path to hintgate.toml
        #[arg(long, default_value = "hintgate.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the converter twice and verify idempotency and artifact invariants
    LadderVerify {
        /// Path to hintgate.toml
        #[arg(long, default_value = "hintgate.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay the configured fixture and write the policy-only output
    ReplayHarness {
        /// Path to hintgate.toml
        #[arg(long, default_value = "hintgate.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare two replay outputs on policy fields
    TraceParity {
        /// Recorded replay output
        left: String,

        /// Second replay output (defaults to a fresh replay from config)
        right: Option<String>,

        /// Path to hintgate.toml
        #[arg(long, default_value = "hintgate.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the policy checksum against the baseline, or update the baseline
    ChecksumGate {
        /// Gate mode
        #[arg(long, value_enum, default_value_t = GateModeArg::Check)]
        mode: GateModeArg,

        /// Path to hintgate.toml
        #[arg(long, default_value = "hintgate.toml")]
        config: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum GateModeArg {
    #[value(name = "check")]
    Check,
    #[value(name = "update")]
    Update,
}

impl From<GateModeArg> for GateMode {
    fn from(value: GateModeArg) -> Self {
        match value {
            GateModeArg::Check => Self::Check,
            GateModeArg::Update => Self::Update,
        }
    }
}
