//! Report-structure generator adapter (VCF in, structured JSON out).

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{execute, OutputCheck, RetryPolicy, ToolAdapter, ToolCommand, ToolInvocationResult, ToolKind};
use crate::config::Config;

/// Subdirectory of the run directory holding the generated structure.
pub const OUTPUT_SUBDIR: &str = "structure";

pub struct StructureGenerator {
    script: PathBuf,
    timeout: Duration,
    retry: RetryPolicy,
}

impl StructureGenerator {
    pub fn new(script: PathBuf, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            script,
            timeout,
            retry,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.paths.structure_script.clone().unwrap_or_default(),
            config.tool_timeout(ToolKind::StructureGenerator),
            config.retry_policy(ToolKind::StructureGenerator),
        )
    }

    /// `<vcf stem>.structure.json` in `output_dir`, so an adopted VCF's
    /// name can never clash with a top-level run artifact.
    pub fn output_path(input_vcf: &Path, output_dir: &Path) -> PathBuf {
        let stem = input_vcf
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "variants".to_string());
        output_dir.join(format!("{}.structure.json", stem))
    }

    /// `[script, input_vcf, output_json]`
    pub fn build_command(&self, input_vcf: &Path, output: &Path) -> ToolCommand {
        ToolCommand::new(ToolKind::StructureGenerator, self.script.to_string_lossy().into_owned())
            .path_arg(input_vcf)
            .path_arg(output)
            .input(input_vcf)
            .output(output, OutputCheck::Json)
    }

    pub async fn generate(&self, input_vcf: &Path, output_dir: &Path) -> ToolInvocationResult {
        let output = Self::output_path(input_vcf, output_dir);
        let command = self.build_command(input_vcf, &output);
        execute(self, &command).await
    }
}

impl ToolAdapter for StructureGenerator {
    fn kind(&self) -> ToolKind {
        ToolKind::StructureGenerator
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

    fn availability_hint(&self) -> String {
        "Set paths.structure_script or VARIMPACT_STRUCTURE_SCRIPT".to_string()
    }
}
