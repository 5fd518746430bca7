//! Replay harness subprocess.
//!
//! The gate regenerates its live output by running the harness as a child
//! process. A non-zero exit aborts the gate and its code is handed back
//! unchanged; there is no retry.

use crate::error::GateError;
use hintgate_kernel::HintgateConfig;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessCommand {
    argv: Vec<String>,
}

impl HarnessCommand {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    /// `gate.harness_command` when configured, else `<exe> replay-harness
    /// --config <config>` with `exe` being the running binary.
    pub fn for_config(config: &HintgateConfig, exe: &Path) -> Self {
        if let Some(argv) = &config.gate.harness_command {
            return Self::new(argv.clone());
        }
        let config_path = std::path::absolute(&config.config_path)
            .unwrap_or_else(|_| config.config_path.clone());
        Self::new(vec![
            exe.display().to_string(),
            "replay-harness".to_string(),
            "--config".to_string(),
            config_path.display().to_string(),
        ])
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn display(&self) -> String {
        self.argv.join(" ")
    }

    /// Run to completion in `cwd`. The child's stdout is discarded after
    /// logging; its stderr is passed through so failures stay diagnosable.
    pub fn run(&self, cwd: &Path) -> Result<(), GateError> {
        let command = self.display();
        let Some((program, args)) = self.argv.split_first() else {
            return Err(GateError::HarnessSpawn {
                command,
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "harness command is empty",
                ),
            });
        };

        tracing::info!(command = %command, cwd = %cwd.display(), "running replay harness");
        let output = Command::new(resolve_program(program, cwd))
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|source| GateError::HarnessSpawn {
                command: command.clone(),
                source,
            })?;

        if !output.stderr.is_empty() {
            let _ = std::io::stderr().write_all(&output.stderr);
        }
        tracing::debug!(
            stdout = %String::from_utf8_lossy(&output.stdout).trim(),
            "replay harness stdout"
        );

        if output.status.success() {
            Ok(())
        } else {
            Err(GateError::HarnessFailed {
                command,
                code: output.status.code(),
            })
        }
    }
}

/// Relative program paths containing a separator resolve against `cwd`;
/// bare names are left for `PATH` lookup.
fn resolve_program(program: &str, cwd: &Path) -> PathBuf {
    let path = PathBuf::from(program);
    if path.is_relative() && path.components().count() > 1 {
        cwd.join(path)
    } else {
        path
    }
}
