//! Hintgate CLI: the `hintgate` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing();

    match cli.command {
        Commands::Canonicalize {
            label,
            config,
            json,
        } => commands::canonicalize::run(label, config, json),

        Commands::SelectRow {
            subtype,
            seed,
            config,
            json,
        } => commands::select_row::run(subtype, seed, config, json),

        Commands::DatasetCheck { config, json } => commands::dataset_check::run(config, json),

        Commands::LadderConvert { config, json } => commands::ladder_convert::run(config, json),

        Commands::LadderVerify { config, json } => commands::ladder_verify::run(config, json),

        Commands::ReplayHarness { config, json } => commands::replay_harness::run(config, json),

        Commands::TraceParity {
            left,
            right,
            config,
            json,
        } => commands::trace_parity::run(left, right, config, json),

        Commands::ChecksumGate { mode, config, json } => {
            commands::checksum_gate::run(mode.into(), config, json)
        }
    }
}
