//! External tool adapters.
//!
//! Every external program (annotator, report-structure generator,
//! knowledge-base processor, format converter) goes through the same
//! machinery: an argv list built by the adapter, a hard timeout enforced by
//! [`process::invoke`], a post-condition on the declared output file and a
//! [`RetryPolicy`] around the whole unit.

pub mod annotator;
pub mod converter;
pub mod knowledge_base;
pub mod process;
pub mod retry;
pub mod structure;
pub mod transcript;

pub use annotator::{Annotator, FailureAnalysis};
pub use converter::Converter;
pub use knowledge_base::KnowledgeBaseProcessor;
pub use retry::RetryPolicy;
pub use structure::StructureGenerator;
pub use transcript::{RankedTranscript, SelectionReason, TranscriptSelector};

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Which external tool an invocation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Annotator,
    StructureGenerator,
    KnowledgeBase,
    Converter,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Annotator => "annotator",
            ToolKind::StructureGenerator => "structure_generator",
            ToolKind::KnowledgeBase => "knowledge_base",
            ToolKind::Converter => "converter",
        }
    }

    /// Multiplier applied to the configured base timeout.
    pub fn timeout_multiplier(&self) -> u32 {
        match self {
            ToolKind::Annotator => 1,
            ToolKind::StructureGenerator => 2,
            ToolKind::KnowledgeBase => 3,
            ToolKind::Converter => 1,
        }
    }

    /// Saturates instead of overflowing on very large bases.
    pub fn timeout(&self, base: Duration) -> Duration {
        base.saturating_mul(self.timeout_multiplier())
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Post-condition checked after a zero exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputCheck {
    None,
    Exists,
    Json,
}

/// A fully built invocation. Arguments are passed to the OS as a list and
/// never go through a shell.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub tool: ToolKind,
    pub program: String,
    pub args: Vec<String>,
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub output_check: OutputCheck,
}

impl ToolCommand {
    pub fn new(tool: ToolKind, program: impl Into<String>) -> Self {
        Self {
            tool,
            program: program.into(),
            args: Vec::new(),
            input_path: None,
            output_path: None,
            output_check: OutputCheck::None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn input(mut self, path: &Path) -> Self {
        self.input_path = Some(path.to_path_buf());
        self
    }

    pub fn output(mut self, path: &Path, check: OutputCheck) -> Self {
        self.output_path = Some(path.to_path_buf());
        self.output_check = check;
        self
    }

    /// Full argv, program first.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

impl std::fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Why one attempt at an external call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolFailure {
    #[error("Failed to start {program}: {message}")]
    Spawn { program: String, message: String },
    #[error("Command exited with {}: {stderr}", exit_label(.code))]
    NonZeroExit { code: Option<i32>, stderr: String },
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),
    #[error("Output file was not created despite successful command execution: {0}")]
    MissingOutput(PathBuf),
    #[error("Generated JSON file is invalid: {message}")]
    InvalidJson { path: PathBuf, message: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl ToolFailure {
    /// Failures where the program ran fine but its output is unusable.
    pub fn is_output_failure(&self) -> bool {
        matches!(
            self,
            ToolFailure::MissingOutput(_) | ToolFailure::InvalidJson { .. }
        )
    }
}

/// One external call, after retries.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInvocationResult {
    pub success: bool,
    pub tool: ToolKind,
    pub input_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub command: Vec<String>,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    /// Wall-clock seconds across all attempts.
    pub execution_time: f64,
    pub attempts: u32,
    pub error: Option<String>,
    #[serde(skip)]
    pub failure: Option<ToolFailure>,
}

impl ToolInvocationResult {
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| format!("{} failed", self.tool))
    }
}

/// Setup problems that stop a tool from being used at all.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("{tool} path not configured")]
    NotConfigured { tool: ToolKind },
    #[error("{tool} not found: {path}")]
    NotFound { tool: ToolKind, path: PathBuf },
    #[error("{tool} path is not a regular file: {path}")]
    NotAFile { tool: ToolKind, path: PathBuf },
    #[error("{tool} is not readable: {path}: {source}")]
    Unreadable {
        tool: ToolKind,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Shared contract of the four adapters.
pub trait ToolAdapter: Send + Sync {
    fn kind(&self) -> ToolKind;

    /// Configured executable or script.
    fn executable(&self) -> &Path;

    fn timeout(&self) -> Duration;

    fn retry_policy(&self) -> RetryPolicy;

    /// Check that the tool can be run. Returns non-fatal warnings.
    fn validate_setup(&self) -> Result<Vec<String>, SetupError> {
        check_executable(self.kind(), self.executable())?;
        Ok(Vec::new())
    }

    /// Human-readable hint for `varimpact check`.
    fn availability_hint(&self) -> String {
        format!(
            "Set the {} path in the config file or environment",
            self.kind()
        )
    }
}

/// Run a built command under the adapter's timeout and retry policy.
///
/// Never fails: spawn errors, non-zero exits, timeouts and bad output all
/// come back as an unsuccessful [`ToolInvocationResult`].
pub async fn execute(adapter: &dyn ToolAdapter, command: &ToolCommand) -> ToolInvocationResult {
    let timeout = adapter.timeout();
    let started = Instant::now();

    debug!(tool = %command.tool, command = %command, "Invoking external tool");

    let retried = adapter
        .retry_policy()
        .run(command.tool.as_str(), |_| process::invoke(command, timeout))
        .await;

    let (output, failure) = match retried.result {
        Ok(output) => (output, None),
        Err(err) => (err.output, Some(err.failure)),
    };

    if let Some(ref failure) = failure {
        warn!(
            tool = %command.tool,
            attempts = retried.attempts,
            "External tool failed: {}",
            failure
        );
    }

    ToolInvocationResult {
        success: failure.is_none(),
        tool: command.tool,
        input_path: command.input_path.clone(),
        output_path: command.output_path.clone(),
        command: command.argv(),
        stdout: output.stdout,
        stderr: output.stderr,
        exit_code: output.exit_code,
        execution_time: started.elapsed().as_secs_f64(),
        attempts: retried.attempts,
        error: failure.as_ref().map(|f| f.to_string()),
        failure,
    }
}

impl ToolInvocationResult {
    /// A call that was never made because a precondition failed.
    pub fn not_run(command: &ToolCommand, error: impl Into<String>) -> Self {
        Self {
            success: false,
            tool: command.tool,
            input_path: command.input_path.clone(),
            output_path: command.output_path.clone(),
            command: command.argv(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            execution_time: 0.0,
            attempts: 0,
            error: Some(error.into()),
            failure: None,
        }
    }
}

/// Resolve a configured executable: paths are used as-is, bare names are
/// looked up on `PATH`.
pub fn resolve_executable(path: &Path) -> PathBuf {
    if path.components().count() > 1 || path.exists() {
        return path.to_path_buf();
    }
    std::env::var_os("PATH")
        .and_then(|paths| {
            std::env::split_paths(&paths)
                .map(|dir| dir.join(path))
                .find(|candidate| candidate.is_file())
        })
        .unwrap_or_else(|| path.to_path_buf())
}

/// Existence, file type and readability of an executable or script.
pub fn check_executable(tool: ToolKind, path: &Path) -> Result<PathBuf, SetupError> {
    if path.as_os_str().is_empty() {
        return Err(SetupError::NotConfigured { tool });
    }

    let resolved = resolve_executable(path);
    let metadata = std::fs::metadata(&resolved).map_err(|_| SetupError::NotFound {
        tool,
        path: resolved.clone(),
    })?;
    if !metadata.is_file() {
        return Err(SetupError::NotAFile {
            tool,
            path: resolved,
        });
    }
    File::open(&resolved).map_err(|source| SetupError::Unreadable {
        tool,
        path: resolved.clone(),
        source,
    })?;

    Ok(resolved)
}
