use crate::commands::ladder_convert::ladder_exit_code;
use crate::support::{EXIT_ERROR, EXIT_REJECTED, load_config_or_exit, render_json_payload};
use hintgate_ladder::{InProcessConverter, VerifyFailure, verify_idempotency};
use serde_json::json;

fn failure_exit_code(failure: &VerifyFailure) -> i32 {
    match failure {
        VerifyFailure::Converter { source, .. } => ladder_exit_code(source),
        VerifyFailure::ReadOutput { .. } | VerifyFailure::Parse(_) => EXIT_ERROR,
        _ if failure.is_integrity_failure() => EXIT_REJECTED,
        _ => EXIT_ERROR,
    }
}

pub fn run(config: String, json_output: bool) {
    let config = load_config_or_exit(&config);
    let mut converter =
        InProcessConverter::new(config.ladder.sources.clone(), config.ladder.output.clone());

    match verify_idempotency(&mut converter, &config.ladder.output) {
        Ok(report) => {
            if json_output {
                render_json_payload(&json!({
                    "result": "accepted",
                    "report": report,
                }));
            } else {
                println!(
                    "[ladder-verify] OK (sha256={}, challenges={}, runs=2)",
                    report.output_sha256, report.unique_challenge_keys
                );
            }
        }
        Err(failure) => {
            if json_output {
                let violation = match &failure {
                    VerifyFailure::Invariant(violation) => serde_json::to_value(violation).ok(),
                    _ => None,
                };
                render_json_payload(&json!({
                    "result": "rejected",
                    "error": failure.to_string(),
                    "violation": violation,
                }));
            } else {
                println!("[ladder-verify] FAIL ({failure})");
            }
            std::process::exit(failure_exit_code(&failure));
        }
    }
}
