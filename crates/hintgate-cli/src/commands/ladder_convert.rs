use crate::support::{EXIT_ERROR, EXIT_REJECTED, load_config_or_exit, render_json_payload};
use hintgate_ladder::{LadderError, convert_to_path};
use serde_json::json;

/// Content problems reject the sources; everything else is operational.
pub fn ladder_exit_code(error: &LadderError) -> i32 {
    match error {
        LadderError::Read { .. }
        | LadderError::ParseArtifact { .. }
        | LadderError::Render(_)
        | LadderError::Write { .. } => EXIT_ERROR,
        _ => EXIT_REJECTED,
    }
}

pub fn run(config: String, json_output: bool) {
    let config = load_config_or_exit(&config);
    let report = match convert_to_path(&config.ladder.sources, &config.ladder.output) {
        Ok(report) => report,
        Err(error) => {
            if json_output {
                render_json_payload(&json!({
                    "result": "rejected",
                    "error": error.to_string(),
                }));
            } else {
                println!("[ladder-convert] FAIL ({error})");
            }
            std::process::exit(ladder_exit_code(&error));
        }
    };

    if json_output {
        render_json_payload(&json!({
            "result": "accepted",
            "output_path": report.output_path.display().to_string(),
            "output_sha256": report.output_sha256,
            "source_count": report.source_count,
            "unique_challenge_keys": report.unique_challenge_keys,
        }));
    } else {
        println!("{}", report.log_line());
    }
}
