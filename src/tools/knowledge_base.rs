//! Knowledge-base processor adapter, invoked once per knowledge base.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use super::{
    check_executable, execute, OutputCheck, RetryPolicy, SetupError, ToolAdapter, ToolCommand,
    ToolInvocationResult, ToolKind,
};
use crate::config::{Config, KnowledgeBaseSpec};

/// Subdirectory of the run directory holding per-knowledge-base JSON.
pub const OUTPUT_SUBDIR: &str = "kb_output";

pub struct KnowledgeBaseProcessor {
    executable: PathBuf,
    knowledge_bases: Vec<KnowledgeBaseSpec>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl KnowledgeBaseProcessor {
    pub fn new(
        executable: PathBuf,
        knowledge_bases: Vec<KnowledgeBaseSpec>,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            executable,
            knowledge_bases,
            timeout,
            retry,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.paths.kb_processor.clone().unwrap_or_default(),
            config.knowledge_bases.clone(),
            config.tool_timeout(ToolKind::KnowledgeBase),
            config.retry_policy(ToolKind::KnowledgeBase),
        )
    }

    pub fn knowledge_bases(&self) -> &[KnowledgeBaseSpec] {
        &self.knowledge_bases
    }

    /// `<input stem>_<kb version>.json`. Distinct per knowledge base, so
    /// concurrent workers never share an output file.
    pub fn output_path(input: &Path, kb: &KnowledgeBaseSpec, output_dir: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "structure".to_string());
        output_dir.join(format!("{}_{}.json", stem, kb.version))
    }

    /// `[exe, input, kb_path, output]`
    pub fn build_command(&self, input: &Path, kb: &KnowledgeBaseSpec, output: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::KnowledgeBase, self.executable.to_string_lossy().into_owned())
            .path_arg(input)
            .path_arg(&kb.path)
            .path_arg(output)
            .input(input)
            .output(output, OutputCheck::Json)
    }

    /// Process `input` against one knowledge base. A missing knowledge-base
    /// path fails this call without invoking the tool.
    pub async fn process(
        &self,
        input: &Path,
        kb: &KnowledgeBaseSpec,
        output_dir: &Path,
    ) -> ToolInvocationResult {
        let output = Self::output_path(input, kb, output_dir);
        let command = self.build_command(input, kb, &output);

        if !kb.path.exists() {
            return ToolInvocationResult::not_run(&command, missing_kb_message(kb));
        }

        execute(self, &command).await
    }
}

fn missing_kb_message(kb: &KnowledgeBaseSpec) -> String {
    format!(
        "Knowledge base path not found: {} (version: {})",
        kb.path.display(),
        kb.version
    )
}

impl ToolAdapter for KnowledgeBaseProcessor {
    fn kind(&self) -> ToolKind {
        ToolKind::KnowledgeBase
    }

    fn executable(&self) -> &Path {
        &self.executable
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Missing knowledge-base paths are warnings here; they fail only their
    /// own invocation later.
    fn validate_setup(&self) -> Result<Vec<String>, SetupError> {
        check_executable(self.kind(), &self.executable)?;

        let warnings: Vec<String> = self
            .knowledge_bases
            .iter()
            .filter(|kb| !kb.path.exists())
            .map(missing_kb_message)
            .collect();
        for warning in &warnings {
            warn!("{}", warning);
        }
        Ok(warnings)
    }

    fn availability_hint(&self) -> String {
        "Set paths.kb_processor or VARIMPACT_KB_PROCESSOR".to_string()
    }
}
