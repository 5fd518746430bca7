use crate::support::{EXIT_REJECTED, emit_error, load_config_or_exit, render_json_payload};
use hintgate_gate::{HarnessOutput, compare_traces, load_harness_output, replay_from_config};
use serde_json::json;

pub fn run(left: String, right: Option<String>, config: String, json_output: bool) {
    let left_output = load_harness_output(&left).unwrap_or_else(|error| emit_error(error));
    let (right_label, right_output): (String, HarnessOutput) = match right {
        Some(path) => {
            let output = load_harness_output(&path).unwrap_or_else(|error| emit_error(error));
            (path, output)
        }
        None => {
            let config = load_config_or_exit(&config);
            let output = replay_from_config(&config).unwrap_or_else(|error| emit_error(error));
            ("<live replay>".to_string(), output)
        }
    };

    let divergence = compare_traces(&left_output.decision_trace, &right_output.decision_trace);

    if json_output {
        render_json_payload(&json!({
            "result": if divergence.is_none() { "accepted" } else { "rejected" },
            "left": left,
            "right": right_label,
            "events": left_output.decision_trace.len(),
            "divergence": divergence,
        }));
    } else {
        match &divergence {
            None => println!(
                "[trace-parity] OK (events={}, checksum={})",
                left_output.decision_trace.len(),
                left_output.policy_only_checksum_sha256
            ),
            Some(divergence) => println!("[trace-parity] FAIL ({divergence})"),
        }
    }

    if divergence.is_some() {
        std::process::exit(EXIT_REJECTED);
    }
}
