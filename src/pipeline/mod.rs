//! Run orchestration.
//!
//! A [`Pipeline`] drives one run through the [`PipelineStage`] machine:
//! validate input, annotate variants, build the VCF, generate the report
//! structure, fan the structure out to every knowledge base, convert each
//! knowledge base's JSON to CSV and extract the final report. Each run owns
//! a fresh [`RunDirectory`] and always ends with a [`PipelineResult`],
//! whether it succeeded, failed, or panicked part-way.

pub mod events;
pub mod input;
pub mod run_dir;
mod types;

pub use events::{ListenerResult, StatusHub, StatusListener};
pub use input::{parse_variant_arg, VariantSource};
pub use run_dir::RunDirectory;
pub use types::{
    Artifact, ArtifactKind, InputKind, PipelineMetrics, PipelineResult, PipelineStage,
    PipelineStatus,
};

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::models::{AnnotationResult, UnsupportedVariant, VariantInput};
use crate::notation::{classify, VariantCategory};
use crate::report::{self, ReportSource};
use crate::tools::{
    converter, knowledge_base, structure, Annotator, Converter, FailureAnalysis,
    KnowledgeBaseProcessor, StructureGenerator, ToolAdapter, ToolKind,
};
use crate::vcf;

pub const VCF_FILE_NAME: &str = "variants.vcf";
pub const UNSUPPORTED_REPORT: &str = "unsupported_variants.csv";
pub const FAILURE_ANALYSIS: &str = "annotation_failures.json";
pub const FINAL_REPORT: &str = "final_report.csv";
pub const CONSOLIDATED_REPORT: &str = "final_report_by_variant.csv";
pub const RUN_SUMMARY: &str = "run_summary.json";

/// Setup state of one external tool, as reported by `varimpact check`.
#[derive(Debug, Clone)]
pub struct ToolCheck {
    pub tool: ToolKind,
    pub executable: PathBuf,
    /// Warnings on success, the setup error otherwise.
    pub outcome: std::result::Result<Vec<String>, String>,
    pub hint: String,
}

/// State carried from stage to stage within one run.
struct RunContext {
    stage: PipelineStage,
    result: PipelineResult,
    variants: Vec<VariantInput>,
    annotations: Vec<AnnotationResult>,
    vcf: Option<PathBuf>,
    structure: Option<PathBuf>,
    kb_outputs: BTreeMap<String, PathBuf>,
    csv_outputs: BTreeMap<String, PathBuf>,
}

impl RunContext {
    fn new(run_id: String) -> Self {
        Self {
            stage: PipelineStage::InputValidation,
            result: PipelineResult::new(run_id),
            variants: Vec::new(),
            annotations: Vec::new(),
            vcf: None,
            structure: None,
            kb_outputs: BTreeMap::new(),
            csv_outputs: BTreeMap::new(),
        }
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.result.warnings.push(message);
    }
}

/// Runs are sequential: status history is reset at the start of each run.
pub struct Pipeline {
    config: Config,
    hub: StatusHub,
    annotator: Annotator,
    structure: StructureGenerator,
    knowledge_base: KnowledgeBaseProcessor,
    converter: Converter,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            annotator: Annotator::from_config(&config),
            structure: StructureGenerator::from_config(&config),
            knowledge_base: KnowledgeBaseProcessor::from_config(&config),
            converter: Converter::from_config(&config),
            hub: StatusHub::new(),
            config,
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn StatusListener>) -> Self {
        self.hub.subscribe(listener);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status_history(&self) -> Vec<PipelineStatus> {
        self.hub.history()
    }

    fn workers(&self) -> usize {
        self.config.processing.max_workers.max(1)
    }

    fn emit(&self, stage: PipelineStage, progress: f64, message: impl Into<String>) {
        self.hub.emit(PipelineStatus::new(stage, progress, message));
    }

    fn adapters(&self, input: InputKind) -> Vec<&dyn ToolAdapter> {
        let mut adapters: Vec<&dyn ToolAdapter> = Vec::new();
        if input.needs_annotation() {
            adapters.push(&self.annotator);
        }
        adapters.push(&self.structure);
        adapters.push(&self.knowledge_base);
        adapters.push(&self.converter);
        adapters
    }

    /// Setup status of every tool a run with this input mode would use.
    pub fn check_tools(&self, input: InputKind) -> Vec<ToolCheck> {
        self.adapters(input)
            .into_iter()
            .map(|adapter| ToolCheck {
                tool: adapter.kind(),
                executable: adapter.executable().to_path_buf(),
                outcome: adapter.validate_setup().map_err(|e| e.to_string()),
                hint: adapter.availability_hint(),
            })
            .collect()
    }

    /// Execute one run. Never fails: errors and panics are recorded in the
    /// returned result.
    pub async fn run(&self, source: VariantSource) -> PipelineResult {
        let started = Instant::now();
        self.hub.clear();

        let run_id = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f").to_string();
        let mut ctx = RunContext::new(run_id);

        let outcome = AssertUnwindSafe(self.execute(&source, &mut ctx))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => ctx.result.success = true,
            Ok(Err(e)) => self.record_failure(&mut ctx, e.to_string()),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<String>()
                    .map(|s| s.as_str())
                    .or_else(|| payload.downcast_ref::<&str>().copied())
                    .unwrap_or("unknown panic");
                self.record_failure(&mut ctx, format!("Unexpected error: {}", message));
            }
        }

        ctx.result.execution_time = started.elapsed().as_secs_f64();
        ctx.result.messages = self.hub.messages();
        let mut result = ctx.result;
        write_summary(&mut result);
        result
    }

    fn record_failure(&self, ctx: &mut RunContext, message: String) {
        ctx.result.success = false;
        ctx.result.errors.push(message.clone());
        self.hub.emit(PipelineStatus::failed(ctx.stage, message));
    }

    async fn execute(&self, source: &VariantSource, ctx: &mut RunContext) -> Result<()> {
        let run_dir = RunDirectory::create(&self.config.paths.output_dir)?;
        ctx.result.run_id = run_dir.id().to_string();
        ctx.result.run_directory = Some(run_dir.path().to_path_buf());
        debug!("Run directory: {}", run_dir.path().display());

        let input = source.kind();
        let report_enabled = self.config.stages.report_extraction;
        let mut stage = PipelineStage::InputValidation;

        loop {
            ctx.stage = stage;
            let stage_started = Instant::now();

            match stage {
                PipelineStage::InputValidation => self.validate_input(source, ctx)?,
                PipelineStage::AnnotationLookup => self.annotate(&run_dir, ctx).await,
                PipelineStage::VcfGeneration => match source {
                    VariantSource::Vcf(path) => self.adopt_vcf(path, &run_dir, ctx)?,
                    _ => self.generate_vcf(&run_dir, ctx)?,
                },
                PipelineStage::ReportStructureGeneration => {
                    self.generate_structure(&run_dir, ctx).await?
                }
                PipelineStage::KbProcessing => self.process_knowledge_bases(&run_dir, ctx).await?,
                PipelineStage::FormatConversion => self.convert_outputs(&run_dir, ctx).await?,
                PipelineStage::ReportExtraction => self.extract_report(&run_dir, ctx)?,
                PipelineStage::Complete => {
                    self.emit(stage, 1.0, "Pipeline completed successfully")
                }
            }

            ctx.result
                .metrics
                .stage_timings
                .insert(stage, stage_started.elapsed().as_secs_f64());
            ctx.result.stages_completed.push(stage);

            match stage.next(input, report_enabled) {
                Some(next) => stage = next,
                None => return Ok(()),
            }
        }
    }

    /// Refuse to start when the configuration is invalid, a stage this run
    /// depends on is disabled, or its tool is unusable.
    ///
    /// Setup warnings (a missing knowledge-base path) are only reported as
    /// status; the affected invocation records the failure itself.
    fn preflight(&self, input: InputKind) -> Result<()> {
        self.config.validate()?;

        let stages = &self.config.stages;
        let mut required = Vec::new();
        if input.needs_annotation() {
            required.push(("annotation", stages.annotation));
        }
        required.extend([
            ("structure_generation", stages.structure_generation),
            ("kb_processing", stages.kb_processing),
            ("format_conversion", stages.format_conversion),
        ]);

        if let Some((name, _)) = required.iter().find(|(_, enabled)| !enabled) {
            return Err(PipelineError::Configuration(format!(
                "Stage '{}' is disabled but required by later stages",
                name
            )));
        }

        if self.config.knowledge_bases.is_empty() {
            return Err(PipelineError::Configuration(
                "No knowledge bases configured".to_string(),
            ));
        }

        for adapter in self.adapters(input) {
            match adapter.validate_setup() {
                Ok(warnings) => {
                    for warning in warnings {
                        self.emit(PipelineStage::InputValidation, 0.0, warning);
                    }
                }
                Err(e) => {
                    return Err(PipelineError::Configuration(format!(
                        "{}. {}",
                        e,
                        adapter.availability_hint()
                    )))
                }
            }
        }
        Ok(())
    }

    fn validate_input(&self, source: &VariantSource, ctx: &mut RunContext) -> Result<()> {
        let stage = PipelineStage::InputValidation;
        self.emit(stage, 0.0, format!("Validating {}", source.describe()));
        self.preflight(source.kind())?;

        let variants = match source {
            VariantSource::Variants(variants) => input::validate_variants(variants.clone())?,
            VariantSource::Csv(path) => input::validate_variants(input::read_csv(path)?)?,
            VariantSource::Vcf(path) => {
                let summary = vcf::inspect(path).map_err(|e| {
                    PipelineError::InputValidation(format!(
                        "Invalid VCF {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                if summary.data_lines() == 0 {
                    return Err(PipelineError::InputValidation(format!(
                        "VCF {} contains no variant records",
                        path.display()
                    )));
                }
                ctx.result.metrics.variants_total = summary.data_lines();
                self.emit(
                    stage,
                    1.0,
                    format!("Using pre-built VCF with {} record(s)", summary.data_lines()),
                );
                return Ok(());
            }
        };

        ctx.variants = input::apply_preferred_transcripts(variants, &self.config.preferred_transcripts);
        ctx.result.metrics.variants_total = ctx.variants.len();
        self.emit(
            stage,
            1.0,
            format!("Validated {} variant(s)", ctx.variants.len()),
        );
        Ok(())
    }

    /// Annotate every variant with bounded concurrency. Failures are kept as
    /// unsuccessful results and surface later in the unsupported report.
    async fn annotate(&self, run_dir: &RunDirectory, ctx: &mut RunContext) {
        let stage = PipelineStage::AnnotationLookup;
        let total = ctx.variants.len();
        self.emit(stage, 0.0, format!("Annotating {} variant(s)", total));

        let annotator = &self.annotator;
        let mut pending = stream::iter(ctx.variants.iter().enumerate())
            .map(|(i, variant)| async move { (i, annotator.annotate(variant).await) })
            .buffer_unordered(self.workers());

        let mut indexed = Vec::with_capacity(total);
        while let Some((i, result)) = pending.next().await {
            let outcome = if result.success { "resolved" } else { "failed" };
            let mut status = PipelineStatus::new(
                stage,
                (indexed.len() + 1) as f64 / total.max(1) as f64,
                format!("{}:{} {}", result.gene, result.original_input, outcome),
            );
            if let Some(error) = &result.error_message {
                status = status.with_details(error.clone());
            } else if let (Some(transcript), Some(reason)) =
                (&result.transcript, &result.transcript_reason)
            {
                status = status.with_details(format!("{} ({})", transcript, reason));
            }
            indexed.push((i, result));
            self.hub.emit(status);
        }
        drop(pending);

        indexed.sort_by_key(|(i, _)| *i);
        ctx.annotations = indexed.into_iter().map(|(_, result)| result).collect();

        let analysis = FailureAnalysis::from_results(&ctx.annotations);
        ctx.result.metrics.annotations_succeeded = analysis.total - analysis.failed;
        ctx.result.metrics.annotations_failed = analysis.failed;

        if analysis.failed > 0 {
            ctx.warn(format!(
                "{} of {} variant(s) failed annotation",
                analysis.failed, analysis.total
            ));
            let path = run_dir.join(FAILURE_ANALYSIS);
            let written = serde_json::to_string_pretty(&analysis)
                .map_err(|e| e.to_string())
                .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
            match written {
                Ok(()) => {
                    ctx.result
                        .artifacts
                        .insert(ArtifactKind::FailureAnalysis, Artifact::Path(path));
                }
                Err(e) => ctx.warn(format!("Failed to write failure analysis: {}", e)),
            }
        }

        self.emit(
            stage,
            1.0,
            format!(
                "Annotated {} of {} variant(s)",
                analysis.total - analysis.failed,
                analysis.total
            ),
        );
    }

    /// Build the VCF from the annotations. Anything that cannot be placed in
    /// the VCF goes to the unsupported report with the reason.
    fn generate_vcf(&self, run_dir: &RunDirectory, ctx: &mut RunContext) -> Result<()> {
        let stage = PipelineStage::VcfGeneration;
        let enhanced = self.config.vcf.enhanced;
        self.emit(stage, 0.0, "Generating VCF");

        let mut lines = Vec::new();
        let mut unsupported = Vec::new();

        for result in ctx.annotations.iter_mut() {
            let category = classify(&result.protein_change);

            if !result.success {
                let reason = result
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Annotation failed".to_string());
                unsupported.push(unsupported_variant(result, category, reason));
                continue;
            }

            if !category.is_automatable() {
                unsupported.push(unsupported_variant(
                    result,
                    category,
                    category.skip_reason().to_string(),
                ));
                continue;
            }

            match vcf::build_line(result, enhanced.then_some(category)) {
                Some(line) => {
                    result.vcf_line = Some(line.clone());
                    lines.push(line);
                }
                None => {
                    let change = result
                        .coordinates
                        .as_ref()
                        .and_then(|c| c.change.clone())
                        .unwrap_or_default();
                    let reason = format!("Could not determine REF/ALT from change '{}'", change);
                    unsupported.push(unsupported_variant(result, category, reason));
                }
            }
        }

        let report_path = run_dir.join(UNSUPPORTED_REPORT);
        vcf::write_unsupported_report(&report_path, &unsupported)?;
        ctx.result
            .artifacts
            .insert(ArtifactKind::UnsupportedReport, Artifact::Path(report_path));
        ctx.result.metrics.unsupported_variants = unsupported.len();

        if !unsupported.is_empty() {
            ctx.warn(format!(
                "{} variant(s) written to {} instead of the VCF",
                unsupported.len(),
                UNSUPPORTED_REPORT
            ));
        }

        if lines.is_empty() {
            return Err(PipelineError::stage(
                stage,
                format!("No variants could be written to the VCF; see {}", UNSUPPORTED_REPORT),
            ));
        }

        let summary = vcf::write_variant_file(
            &run_dir.join(VCF_FILE_NAME),
            &vcf::build_header(enhanced),
            &lines,
        )?;
        ctx.result.metrics.vcf_variants_written = summary.variants_written;
        ctx.result
            .artifacts
            .insert(ArtifactKind::VcfFile, Artifact::Path(summary.path.clone()));
        ctx.vcf = Some(summary.path);

        self.emit(
            stage,
            1.0,
            format!("Wrote {} variant(s) to the VCF", summary.variants_written),
        );
        Ok(())
    }

    /// Copy a pre-built VCF into the run directory as [`VCF_FILE_NAME`] and
    /// use it unchanged.
    fn adopt_vcf(&self, source: &Path, run_dir: &RunDirectory, ctx: &mut RunContext) -> Result<()> {
        let stage = PipelineStage::VcfGeneration;
        let target = run_dir.join(VCF_FILE_NAME);
        std::fs::copy(source, &target)?;

        ctx.result.metrics.vcf_variants_written = ctx.result.metrics.variants_total;
        ctx.result
            .artifacts
            .insert(ArtifactKind::VcfFile, Artifact::Path(target.clone()));
        ctx.vcf = Some(target);

        self.emit(stage, 1.0, format!("Using VCF {}", source.display()));
        Ok(())
    }

    async fn generate_structure(&self, run_dir: &RunDirectory, ctx: &mut RunContext) -> Result<()> {
        let stage = PipelineStage::ReportStructureGeneration;
        let vcf = ctx
            .vcf
            .clone()
            .ok_or_else(|| PipelineError::stage(stage, "No VCF available"))?;

        let output_dir = run_dir.subdir(structure::OUTPUT_SUBDIR)?;
        self.emit(stage, 0.0, "Generating report structure");
        let invocation = self.structure.generate(&vcf, &output_dir).await;
        ctx.result.invocations.push(invocation.clone());

        if !invocation.success {
            return Err(PipelineError::ToolInvocation {
                tool: invocation.tool.to_string(),
                message: invocation.error_message(),
            });
        }

        let output = invocation
            .output_path
            .ok_or_else(|| PipelineError::stage(stage, "Structure generator declared no output"))?;
        ctx.result
            .artifacts
            .insert(ArtifactKind::StructureJson, Artifact::Path(output.clone()));
        ctx.structure = Some(output);

        self.emit(stage, 1.0, "Report structure generated");
        Ok(())
    }

    /// Run every knowledge base concurrently. One failing knowledge base is a
    /// warning; all of them failing fails the run.
    async fn process_knowledge_bases(
        &self,
        run_dir: &RunDirectory,
        ctx: &mut RunContext,
    ) -> Result<()> {
        let stage = PipelineStage::KbProcessing;
        let input = ctx
            .structure
            .clone()
            .ok_or_else(|| PipelineError::stage(stage, "No report structure available"))?;
        let output_dir = run_dir.subdir(knowledge_base::OUTPUT_SUBDIR)?;

        let processor = &self.knowledge_base;
        let total = processor.knowledge_bases().len();
        self.emit(
            stage,
            0.0,
            format!(
                "Processing {} knowledge base(s) with up to {} worker(s)",
                total,
                self.workers()
            ),
        );

        let (input, output_dir) = (&input, &output_dir);
        let mut pending = stream::iter(processor.knowledge_bases())
            .map(|kb| async move { (kb.version.clone(), processor.process(input, kb, output_dir).await) })
            .buffer_unordered(self.workers());

        let mut outcomes = BTreeMap::new();
        while let Some((version, invocation)) = pending.next().await {
            let outcome = if invocation.success { "done" } else { "failed" };
            let mut status = PipelineStatus::new(
                stage,
                (outcomes.len() + 1) as f64 / total.max(1) as f64,
                format!("Knowledge base {} {}", version, outcome),
            );
            if !invocation.success {
                status = status.with_details(invocation.error_message());
            }
            outcomes.insert(version, invocation);
            self.hub.emit(status);
        }
        drop(pending);

        let mut errors = Vec::new();
        for (version, invocation) in outcomes {
            match (&invocation.output_path, invocation.success) {
                (Some(output), true) => {
                    ctx.kb_outputs.insert(version, output.clone());
                }
                _ => errors.push(format!("{}: {}", version, invocation.error_message())),
            }
            ctx.result.invocations.push(invocation);
        }

        ctx.result.metrics.kb_succeeded = ctx.kb_outputs.len();
        ctx.result.metrics.kb_failed = errors.len();

        if ctx.kb_outputs.is_empty() {
            return Err(PipelineError::stage(
                stage,
                format!("All {} knowledge base(s) failed: {}", total, errors.join("; ")),
            ));
        }

        for error in errors {
            ctx.warn(format!("Knowledge base {}", error));
        }
        ctx.result.artifacts.insert(
            ArtifactKind::KbOutputs,
            Artifact::NamedPaths(ctx.kb_outputs.clone()),
        );

        self.emit(
            stage,
            1.0,
            format!("{} of {} knowledge base(s) succeeded", ctx.kb_outputs.len(), total),
        );
        Ok(())
    }

    async fn convert_outputs(&self, run_dir: &RunDirectory, ctx: &mut RunContext) -> Result<()> {
        let stage = PipelineStage::FormatConversion;
        let output_dir = run_dir.subdir(converter::OUTPUT_SUBDIR)?;
        let total = ctx.kb_outputs.len();
        self.emit(stage, 0.0, format!("Converting {} file(s) to CSV", total));

        let mut errors = Vec::new();
        for (done, (version, json)) in ctx.kb_outputs.iter().enumerate() {
            let invocation = self.converter.convert(json, &output_dir).await;
            match (&invocation.output_path, invocation.success) {
                (Some(csv), true) => {
                    ctx.csv_outputs.insert(version.clone(), csv.clone());
                }
                _ => errors.push(format!("{}: {}", version, invocation.error_message())),
            }
            ctx.result.invocations.push(invocation);
            self.emit(
                stage,
                (done + 1) as f64 / total.max(1) as f64,
                format!("Converted {}", version),
            );
        }

        ctx.result.metrics.conversions_succeeded = ctx.csv_outputs.len();

        if ctx.csv_outputs.is_empty() {
            return Err(PipelineError::stage(
                stage,
                format!("All {} conversion(s) failed: {}", total, errors.join("; ")),
            ));
        }

        for error in errors {
            ctx.warn(format!("Conversion {}", error));
        }
        ctx.result.artifacts.insert(
            ArtifactKind::CsvOutputs,
            Artifact::NamedPaths(ctx.csv_outputs.clone()),
        );
        Ok(())
    }

    fn extract_report(&self, run_dir: &RunDirectory, ctx: &mut RunContext) -> Result<()> {
        let stage = PipelineStage::ReportExtraction;
        self.emit(stage, 0.0, "Extracting final report");

        let sources: Vec<ReportSource> = ctx
            .csv_outputs
            .iter()
            .map(|(version, path)| ReportSource::new(path).with_kb_version(version.clone()))
            .collect();
        let extraction = report::extract(&sources)?;

        let final_path = run_dir.join(FINAL_REPORT);
        report::write_report(&final_path, &extraction.records)?;
        let consolidated_path = run_dir.join(CONSOLIDATED_REPORT);
        report::write_report(&consolidated_path, &report::consolidate(&extraction.records))?;

        for skipped in &extraction.skipped_sources {
            ctx.warn(format!("Report source skipped: {}", skipped.display()));
        }
        for coverage in extraction.coverage.iter().filter(|c| c.required) {
            if coverage.populated_records < extraction.total_records {
                ctx.warn(format!(
                    "Required field '{}' populated in {:.1}% of records",
                    coverage.field, coverage.coverage_percentage
                ));
            }
        }

        ctx.result.metrics.report_records = extraction.total_records;
        ctx.result
            .artifacts
            .insert(ArtifactKind::FinalReport, Artifact::Path(final_path.clone()));
        ctx.result.artifacts.insert(
            ArtifactKind::ConsolidatedReport,
            Artifact::Path(consolidated_path),
        );
        ctx.result.final_report_path = Some(final_path);

        self.emit(
            stage,
            1.0,
            format!(
                "Extracted {} record(s) from {} knowledge base(s)",
                extraction.total_records,
                extraction.kb_versions.len()
            ),
        );
        Ok(())
    }
}

fn unsupported_variant(
    result: &AnnotationResult,
    category: VariantCategory,
    reason: String,
) -> UnsupportedVariant {
    UnsupportedVariant {
        gene: result.gene.clone(),
        protein_change: result.protein_change.clone(),
        variant_type: category.as_str().to_string(),
        reason_skipped: reason,
        requires_coordinates: category.requires_coordinates(),
        original_input: result.original_input.clone(),
    }
}

/// Persist the result as `run_summary.json` when the run got a directory.
fn write_summary(result: &mut PipelineResult) {
    let Some(dir) = result.run_directory.clone() else {
        return;
    };
    let path = dir.join(RUN_SUMMARY);
    result
        .artifacts
        .insert(ArtifactKind::RunSummary, Artifact::Path(path.clone()));

    let written = serde_json::to_string_pretty(&*result)
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));
    if let Err(e) = written {
        warn!("Failed to write {}: {}", path.display(), e);
        result.artifacts.remove(&ArtifactKind::RunSummary);
        result
            .warnings
            .push(format!("Failed to write {}: {}", RUN_SUMMARY, e));
    }
}
