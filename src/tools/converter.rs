//! Format converter adapter: per-knowledge-base JSON to CSV.
//!
//! Runs the configured converter script through an interpreter, or flattens
//! the JSON in-process when `conversion.builtin` is set.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::{
    check_executable, execute, OutputCheck, RetryPolicy, SetupError, ToolAdapter, ToolCommand,
    ToolInvocationResult, ToolKind,
};
use crate::config::Config;
use crate::report::flatten;

/// Subdirectory of the run directory holding per-knowledge-base CSV.
pub const OUTPUT_SUBDIR: &str = "csv_output";

pub struct Converter {
    interpreter: String,
    script: PathBuf,
    builtin: bool,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Converter {
    pub fn new(interpreter: impl Into<String>, script: PathBuf, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            script,
            builtin: false,
            timeout,
            retry: RetryPolicy::once(),
        }
    }

    /// In-process conversion, no external script.
    pub fn builtin() -> Self {
        Self {
            builtin: true,
            ..Self::new(String::new(), PathBuf::new(), Duration::ZERO)
        }
    }

    pub fn from_config(config: &Config) -> Self {
        if config.conversion.builtin {
            return Self::builtin();
        }
        let mut converter = Self::new(
            config.conversion.interpreter.clone(),
            config.paths.converter_script.clone().unwrap_or_default(),
            config.tool_timeout(ToolKind::Converter),
        );
        converter.retry = config.retry_policy(ToolKind::Converter);
        converter
    }

    /// `<json stem>.csv`
    pub fn output_path(input_json: &Path, output_dir: &Path) -> PathBuf {
        let stem = input_json
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report".to_string());
        output_dir.join(format!("{}.csv", stem))
    }

    /// `[interpreter, script, input_json, output_csv]`
    pub fn build_command(&self, input_json: &Path, output_csv: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::Converter, self.interpreter.clone())
            .path_arg(&self.script)
            .path_arg(input_json)
            .path_arg(output_csv)
            .input(input_json)
            .output(output_csv, OutputCheck::Exists)
    }

    pub async fn convert(&self, input_json: &Path, output_dir: &Path) -> ToolInvocationResult {
        let output = Self::output_path(input_json, output_dir);
        let command = self.build_command(input_json, &output);

        if !self.builtin {
            return execute(self, &command).await;
        }

        let started = Instant::now();
        let input = input_json.to_path_buf();
        let target = output.clone();
        let outcome = tokio::task::spawn_blocking(move || flatten::flatten_file(&input, &target))
            .await
            .map_err(|e| e.to_string())
            .and_then(|r| r.map_err(|e| e.to_string()));

        let mut result = ToolInvocationResult::not_run(&command, String::new());
        result.command = vec!["builtin:flatten".to_string()];
        result.execution_time = started.elapsed().as_secs_f64();
        result.attempts = 1;
        match outcome {
            Ok(rows) => {
                result.success = true;
                result.error = None;
                result.stdout = format!("Wrote {} rows to {}", rows, output.display());
            }
            Err(e) => result.error = Some(e),
        }
        result
    }
}

impl ToolAdapter for Converter {
    fn kind(&self) -> ToolKind {
        ToolKind::Converter
    }

    fn executable(&self) -> &Path {
        &self.script
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn validate_setup(&self) -> Result<Vec<String>, SetupError> {
        if self.builtin {
            return Ok(Vec::new());
        }
        check_executable(self.kind(), &self.script)?;
        Ok(Vec::new())
    }

    fn availability_hint(&self) -> String {
        "Set paths.converter_script, or conversion.builtin = true to convert in-process".to_string()
    }
}
