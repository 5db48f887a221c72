//! Stage machine, status events and run results.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::tools::ToolInvocationResult;

/// How variants enter a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Gene and protein-change pairs given directly.
    Variants,
    /// A CSV file of variants.
    Csv,
    /// A pre-built VCF used as-is.
    Vcf,
}

impl InputKind {
    /// Whether variants must be annotated before a VCF exists.
    pub fn needs_annotation(&self) -> bool {
        !matches!(self, InputKind::Vcf)
    }
}

/// Ordered pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    InputValidation,
    AnnotationLookup,
    VcfGeneration,
    ReportStructureGeneration,
    KbProcessing,
    FormatConversion,
    ReportExtraction,
    Complete,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::InputValidation => "input_validation",
            PipelineStage::AnnotationLookup => "annotation_lookup",
            PipelineStage::VcfGeneration => "vcf_generation",
            PipelineStage::ReportStructureGeneration => "report_structure_generation",
            PipelineStage::KbProcessing => "kb_processing",
            PipelineStage::FormatConversion => "format_conversion",
            PipelineStage::ReportExtraction => "report_extraction",
            PipelineStage::Complete => "complete",
        }
    }

    /// The stage after this one, or `None` once the run is complete.
    ///
    /// VCF input goes straight to VCF generation, which adopts the file.
    /// Report extraction is skipped when disabled.
    pub fn next(&self, input: InputKind, report_enabled: bool) -> Option<PipelineStage> {
        let next = match self {
            PipelineStage::InputValidation if input.needs_annotation() => {
                PipelineStage::AnnotationLookup
            }
            PipelineStage::InputValidation => PipelineStage::VcfGeneration,
            PipelineStage::AnnotationLookup => PipelineStage::VcfGeneration,
            PipelineStage::VcfGeneration => PipelineStage::ReportStructureGeneration,
            PipelineStage::ReportStructureGeneration => PipelineStage::KbProcessing,
            PipelineStage::KbProcessing => PipelineStage::FormatConversion,
            PipelineStage::FormatConversion if report_enabled => PipelineStage::ReportExtraction,
            PipelineStage::FormatConversion => PipelineStage::Complete,
            PipelineStage::ReportExtraction => PipelineStage::Complete,
            PipelineStage::Complete => return None,
        };
        Some(next)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A progress event. `progress` is the fraction of the current stage done.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStatus {
    pub stage: PipelineStage,
    pub progress: f64,
    pub message: String,
    pub details: Option<String>,
    pub error: Option<String>,
}

impl PipelineStatus {
    pub fn new(stage: PipelineStage, progress: f64, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
            details: None,
            error: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn failed(stage: PipelineStage, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            stage,
            progress: 1.0,
            message: format!("Stage {} failed", stage),
            details: None,
            error: Some(error),
        }
    }
}

/// Artifacts recorded by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    VcfFile,
    UnsupportedReport,
    FailureAnalysis,
    StructureJson,
    KbOutputs,
    CsvOutputs,
    FinalReport,
    ConsolidatedReport,
    RunSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Artifact {
    Path(PathBuf),
    /// Keyed by knowledge-base version.
    NamedPaths(BTreeMap<String, PathBuf>),
}

impl Artifact {
    pub fn paths(&self) -> Vec<&PathBuf> {
        match self {
            Artifact::Path(path) => vec![path],
            Artifact::NamedPaths(paths) => paths.values().collect(),
        }
    }
}

/// Counters gathered over a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineMetrics {
    pub variants_total: usize,
    pub annotations_succeeded: usize,
    pub annotations_failed: usize,
    pub vcf_variants_written: usize,
    pub unsupported_variants: usize,
    pub kb_succeeded: usize,
    pub kb_failed: usize,
    pub conversions_succeeded: usize,
    pub report_records: usize,
    /// Seconds spent per stage.
    pub stage_timings: BTreeMap<PipelineStage, f64>,
}

/// Outcome of a run. Always produced, even when the run fails.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub success: bool,
    pub run_id: String,
    pub run_directory: Option<PathBuf>,
    pub execution_time: f64,
    pub stages_completed: Vec<PipelineStage>,
    pub artifacts: BTreeMap<ArtifactKind, Artifact>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
    pub invocations: Vec<ToolInvocationResult>,
    pub final_report_path: Option<PathBuf>,
    pub metrics: PipelineMetrics,
}

impl PipelineResult {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            success: false,
            run_id: run_id.into(),
            run_directory: None,
            execution_time: 0.0,
            stages_completed: Vec::new(),
            artifacts: BTreeMap::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            messages: Vec::new(),
            invocations: Vec::new(),
            final_report_path: None,
            metrics: PipelineMetrics::default(),
        }
    }

    pub fn artifact(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.get(&kind)
    }

    pub fn completed(&self, stage: PipelineStage) -> bool {
        self.stages_completed.contains(&stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(input: InputKind, report: bool) -> Vec<PipelineStage> {
        let mut stages = vec![PipelineStage::InputValidation];
        while let Some(next) = stages.last().and_then(|s| s.next(input, report)) {
            stages.push(next);
        }
        stages
    }

    #[test]
    fn test_annotation_path() {
        assert_eq!(
            walk(InputKind::Variants, true),
            vec![
                PipelineStage::InputValidation,
                PipelineStage::AnnotationLookup,
                PipelineStage::VcfGeneration,
                PipelineStage::ReportStructureGeneration,
                PipelineStage::KbProcessing,
                PipelineStage::FormatConversion,
                PipelineStage::ReportExtraction,
                PipelineStage::Complete,
            ]
        );
    }

    #[test]
    fn test_vcf_path_skips_annotation() {
        let stages = walk(InputKind::Vcf, true);
        assert!(!stages.contains(&PipelineStage::AnnotationLookup));
        assert_eq!(stages[1], PipelineStage::VcfGeneration);
    }

    #[test]
    fn test_report_extraction_optional() {
        let stages = walk(InputKind::Csv, false);
        assert!(!stages.contains(&PipelineStage::ReportExtraction));
        assert_eq!(stages.last(), Some(&PipelineStage::Complete));
    }

    #[test]
    fn test_never_moves_backwards() {
        for input in [InputKind::Variants, InputKind::Csv, InputKind::Vcf] {
            for report in [true, false] {
                let stages = walk(input, report);
                assert!(stages.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }

    #[test]
    fn test_status_progress_clamped() {
        let status = PipelineStatus::new(PipelineStage::KbProcessing, 1.5, "done");
        assert_eq!(status.progress, 1.0);
    }
}
