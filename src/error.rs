//! Run-level errors.

use thiserror::Error;

use crate::config::ConfigError;
use crate::pipeline::PipelineStage;
use crate::report::ReportError;
use crate::vcf::VcfError;

/// Why a pipeline run stopped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Input validation failed: {0}")]
    InputValidation(String),

    #[error("{tool} invocation failed: {message}")]
    ToolInvocation { tool: String, message: String },

    #[error("Stage {stage} failed: {message}")]
    StageFailed {
        stage: PipelineStage,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn stage(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self::StageFailed {
            stage,
            message: message.into(),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<VcfError> for PipelineError {
    fn from(err: VcfError) -> Self {
        Self::stage(PipelineStage::VcfGeneration, err.to_string())
    }
}

impl From<ReportError> for PipelineError {
    fn from(err: ReportError) -> Self {
        Self::stage(PipelineStage::ReportExtraction, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
