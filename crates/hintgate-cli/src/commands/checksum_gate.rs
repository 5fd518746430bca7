use crate::support::{
    EXIT_ERROR, EXIT_REJECTED, emit_error, load_config_or_exit, render_json_payload,
};
use hintgate_gate::{GateMode, GateVerdict, HarnessCommand, run_gate};

pub fn run(mode: GateMode, config: String, json_output: bool) {
    let config = load_config_or_exit(&config);
    let exe = std::env::current_exe()
        .unwrap_or_else(|error| emit_error(format!("cannot locate hintgate executable: {error}")));
    let harness = HarnessCommand::for_config(&config, &exe);

    let report = run_gate(&config, mode, &harness).unwrap_or_else(|error| {
        eprintln!("error: {error}");
        std::process::exit(error.forwarded_exit_code().unwrap_or(EXIT_ERROR));
    });

    if json_output {
        render_json_payload(&report);
    } else {
        match &report.verdict {
            GateVerdict::Pass { checksum } if report.baseline_written => println!(
                "[checksum-gate] UPDATED (baseline={}, checksum={checksum}, inputs={})",
                report.baseline_path,
                report.input_digests.len()
            ),
            GateVerdict::Pass { checksum } => println!(
                "[checksum-gate] OK (mode={}, checksum={checksum}, inputs={})",
                mode.as_str(),
                report.input_digests.len()
            ),
            GateVerdict::Skip { changed_inputs } => {
                let names: Vec<&str> = changed_inputs
                    .iter()
                    .map(|change| change.name.as_str())
                    .collect();
                println!(
                    "[checksum-gate] SKIP (inputs changed: {}; run `hintgate checksum-gate --mode update` to accept)",
                    names.join(", ")
                );
            }
            GateVerdict::Fail { expected, actual } => println!(
                "[checksum-gate] FAIL (inputs unchanged, expected={expected}, actual={actual})"
            ),
        }
    }

    if report.verdict.is_failure() {
        std::process::exit(EXIT_REJECTED);
    }
}
