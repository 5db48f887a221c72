//! Process execution with a hard timeout and output post-checks.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use super::{OutputCheck, ToolCommand, ToolFailure};

/// Captured output of one attempt.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// A failed attempt, with whatever output was captured.
#[derive(Debug, Clone)]
pub struct AttemptError {
    pub output: ProcessOutput,
    pub failure: ToolFailure,
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.failure)
    }
}

/// Run a command once, then verify its declared output.
///
/// The child is killed when the timeout elapses (`kill_on_drop`), so a hung
/// tool fails only this attempt.
pub async fn invoke(command: &ToolCommand, timeout: Duration) -> Result<ProcessOutput, AttemptError> {
    let child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| AttemptError {
            output: ProcessOutput::default(),
            failure: ToolFailure::Spawn {
                program: command.program.clone(),
                message: e.to_string(),
            },
        })?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(AttemptError {
                output: ProcessOutput::default(),
                failure: ToolFailure::Spawn {
                    program: command.program.clone(),
                    message: e.to_string(),
                },
            })
        }
        Err(_) => {
            return Err(AttemptError {
                output: ProcessOutput::default(),
                failure: ToolFailure::Timeout(timeout),
            })
        }
    };

    let captured = ProcessOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    };

    if !output.status.success() {
        let stderr = captured.stderr.trim().to_string();
        return Err(AttemptError {
            failure: ToolFailure::NonZeroExit {
                code: captured.exit_code,
                stderr,
            },
            output: captured,
        });
    }

    if let Some(ref path) = command.output_path {
        if let Err(failure) = check_output(path, command.output_check) {
            return Err(AttemptError {
                output: captured,
                failure,
            });
        }
    }

    Ok(captured)
}

/// Verify an output file after a zero exit.
pub fn check_output(path: &Path, check: OutputCheck) -> Result<(), ToolFailure> {
    if check == OutputCheck::None {
        return Ok(());
    }

    if !path.is_file() {
        return Err(ToolFailure::MissingOutput(path.to_path_buf()));
    }

    if check == OutputCheck::Json {
        let invalid = |message: String| ToolFailure::InvalidJson {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        serde_json::from_str::<serde_json::Value>(&content).map_err(|e| invalid(e.to_string()))?;
    }

    Ok(())
}
