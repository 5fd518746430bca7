use crate::support::{
    EXIT_ERROR, EXIT_REJECTED, emit_error, load_config_or_exit, render_json_payload,
};
use hintgate_gate::{GateError, replay_from_config, write_harness_output};
use serde_json::json;

pub fn run(config: String, json_output: bool) {
    let config = load_config_or_exit(&config);
    let output = replay_from_config(&config).unwrap_or_else(|error| {
        eprintln!("error: {error}");
        let code = match error {
            GateError::NoRowForSubtype { .. } => EXIT_REJECTED,
            _ => EXIT_ERROR,
        };
        std::process::exit(code);
    });
    write_harness_output(&config.replay.output, &output).unwrap_or_else(|error| emit_error(error));

    if json_output {
        render_json_payload(&json!({
            "output_path": config.replay.output.display().to_string(),
            "fixture_id": output.fixture_id,
            "events": output.decision_trace.len(),
            "policy_only_checksum_sha256": output.policy_only_checksum_sha256,
            "replay_harness_version": output.replay_harness_version,
        }));
    } else {
        println!(
            "[replay-harness] OK (fixture={}, events={}, checksum={})",
            output.fixture_id,
            output.decision_trace.len(),
            output.policy_only_checksum_sha256
        );
    }
}
