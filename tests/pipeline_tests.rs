//! End-to-end pipeline runs against shell-script stand-ins for the external tools.

#![cfg(unix)]

use std::collections::BTreeSet;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use varimpact::config::{Config, KnowledgeBaseSpec};
use varimpact::models::VariantInput;
use varimpact::pipeline::{
    Artifact, ArtifactKind, ListenerResult, Pipeline, PipelineResult, PipelineStage,
    PipelineStatus, VariantSource,
};
use varimpact::tools::ToolKind;

const BRAF_VCF_LINE: &str = "chr7\t140453136\t.\tA\tT\t.\t.\tGENE=BRAF;TRANSCRIPT=NM_004333.4;PROTEIN=p.V600E;VARIANT_TYPE=substitution;AUTO_GENERATED";

const ANNOTATOR: &str = r#"#!/bin/sh
for last; do :; done
case "$last" in
  *V600E) echo "chr7:g.140453136A>T  NM_004333.4:c.1799T>A  NP_004324.2:p.V600E" ;;
  *G12D) echo "chr12:g.25398284C>T  NM_004985.5:c.35G>A  NP_004976.2:p.G12D" ;;
  *) echo "no annotation for $last" >&2; exit 1 ;;
esac
"#;

const STRUCTURE: &str = r#"#!/bin/sh
printf '{"source": "%s", "variants": []}' "$1" > "$2"
"#;

const KB_PROCESSOR: &str = r#"#!/bin/sh
kb=$(basename "$2")
cat > "$3" <<JSON
{"variants": [{
  "variant": "chr7:140453136:A:T",
  "gene": "BRAF",
  "transcript": "NM_004333.4",
  "hgvsp": "NP_004324.2:p.V600E",
  "clinicalSignificance": {"classification": "Pathogenic"},
  "diseaseAssociations": [{"disease": "Melanoma", "omim": "155600"}],
  "therapeuticImplications": [{"drug": "Vemurafenib $kb", "responseType": "sensitive"}]
}]}
JSON
"#;

const FAILING: &str = "#!/bin/sh\necho 'tool exploded' >&2\nexit 2\n";

const CONVERTER: &str = r#"
printf 'gene,protein_change,classification\nBRAF,p.V600E,Pathogenic\n' > "$2"
"#;

struct Fixture {
    dir: TempDir,
    config: Config,
}

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

impl Fixture {
    /// Working mock tools and two existing knowledge bases.
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let mut config = Config::default();
        config.annotator.executable = write_script(root, "transvar", ANNOTATOR);
        config.paths.structure_script = Some(write_script(root, "structure.sh", STRUCTURE));
        config.paths.kb_processor = Some(write_script(root, "kb_processor.sh", KB_PROCESSOR));
        config.paths.converter_script = None;
        config.paths.output_dir = root.join("output");
        config.conversion.builtin = true;
        config.processing.max_workers = 4;
        config.processing.timeout_seconds = 30;
        config.processing.retry_attempts = 2;
        config.processing.retry_base_delay_ms = 0;
        config.preferred_transcripts.clear();

        let mut fixture = Self { dir, config };
        fixture.config.knowledge_bases = vec![fixture.kb("kb_a"), fixture.kb("kb_b")];
        fixture
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    /// A knowledge base whose path exists.
    fn kb(&self, version: &str) -> KnowledgeBaseSpec {
        let path = self.root().join(version);
        std::fs::write(&path, "kb").unwrap();
        KnowledgeBaseSpec::new(version, path)
    }

    async fn run(&self, source: VariantSource) -> PipelineResult {
        Pipeline::new(self.config.clone()).run(source).await
    }
}

fn braf() -> VariantSource {
    VariantSource::Variants(vec![VariantInput::new("BRAF", "p.Val600Glu")])
}

fn artifact_path(result: &PipelineResult, kind: ArtifactKind) -> PathBuf {
    match result.artifact(kind) {
        Some(Artifact::Path(path)) => path.clone(),
        other => panic!("expected a path artifact for {:?}, got {:?}", kind, other),
    }
}

fn named_keys(result: &PipelineResult, kind: ArtifactKind) -> BTreeSet<String> {
    match result.artifact(kind) {
        Some(Artifact::NamedPaths(paths)) => paths.keys().cloned().collect(),
        other => panic!("expected named paths for {:?}, got {:?}", kind, other),
    }
}

#[tokio::test]
async fn test_end_to_end_braf() {
    let fixture = Fixture::new();
    let result = fixture.run(braf()).await;

    assert!(result.success, "errors: {:?}", result.errors);
    assert!(result.errors.is_empty());
    assert_eq!(result.stages_completed.last(), Some(&PipelineStage::Complete));
    assert!(result.completed(PipelineStage::AnnotationLookup));

    let run_dir = result.run_directory.clone().unwrap();
    assert!(run_dir.starts_with(fixture.root().join("output")));

    let vcf = std::fs::read_to_string(artifact_path(&result, ArtifactKind::VcfFile)).unwrap();
    assert!(vcf.starts_with("##fileformat=VCFv4.2"));
    assert!(vcf.lines().any(|line| line == BRAF_VCF_LINE), "{}", vcf);

    let report_path = result.final_report_path.clone().unwrap();
    assert!(report_path.starts_with(&run_dir));
    let report = std::fs::read_to_string(&report_path).unwrap();
    assert_eq!(report.lines().count(), 3);
    assert!(report.contains("BRAF,p.V600E,NM_004333.4,Pathogenic"));
    assert!(report.contains("Vemurafenib kb_a (sensitive)"));

    let consolidated =
        std::fs::read_to_string(artifact_path(&result, ArtifactKind::ConsolidatedReport)).unwrap();
    assert_eq!(consolidated.lines().count(), 2);
    assert!(consolidated.contains("kb_a; kb_b"));

    assert!(run_dir.join("run_summary.json").is_file());
    assert_eq!(result.metrics.kb_succeeded, 2);
    assert_eq!(result.metrics.report_records, 2);
}

#[tokio::test]
async fn test_partial_knowledge_base_failure() {
    let mut fixture = Fixture::new();
    let missing = KnowledgeBaseSpec::new("kb_missing", fixture.root().join("nowhere"));
    fixture.config.knowledge_bases.push(missing);

    let result = fixture.run(braf()).await;

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.metrics.kb_succeeded, 2);
    assert_eq!(result.metrics.kb_failed, 1);

    let failed: Vec<_> = result
        .invocations
        .iter()
        .filter(|i| i.tool == ToolKind::KnowledgeBase && !i.success)
        .collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].error_message().contains("Knowledge base path not found"));
    assert_eq!(failed[0].attempts, 0);

    assert_eq!(
        named_keys(&result, ArtifactKind::KbOutputs),
        BTreeSet::from(["kb_a".to_string(), "kb_b".to_string()])
    );

    let kb_warnings: Vec<_> = result
        .warnings
        .iter()
        .filter(|w| w.contains("kb_missing"))
        .collect();
    assert_eq!(kb_warnings.len(), 1, "{:?}", kb_warnings);
    assert!(kb_warnings[0].starts_with("Knowledge base kb_missing: "));
    assert!(result
        .messages
        .iter()
        .any(|m| m.contains("Knowledge base path not found") && m.contains("kb_missing")));
}

#[tokio::test]
async fn test_unsafe_kb_version_rejected_before_any_stage() {
    let mut fixture = Fixture::new();
    let escaping = fixture.kb("kb_c");
    fixture.config.knowledge_bases.push(KnowledgeBaseSpec {
        version: "../../escaped".to_string(),
        ..escaping
    });

    let result = fixture.run(braf()).await;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("path separators"), "{}", result.errors[0]);
    assert!(result.stages_completed.is_empty());
    assert!(result.invocations.is_empty());
}

#[tokio::test]
async fn test_all_knowledge_bases_failing_fails_run() {
    let mut fixture = Fixture::new();
    let failing = write_script(fixture.root(), "kb_fail.sh", FAILING);
    fixture.config.paths.kb_processor = Some(failing);

    let result = fixture.run(braf()).await;

    assert!(!result.success);
    assert_eq!(result.errors.len(), 1);
    let error = &result.errors[0];
    assert!(error.contains("All 2 knowledge base(s) failed"), "{}", error);
    assert!(error.contains("kb_a") && error.contains("kb_b"));
    assert!(error.contains("tool exploded"));
    assert!(result.completed(PipelineStage::ReportStructureGeneration));
    assert!(!result.completed(PipelineStage::KbProcessing));
    assert!(result.run_directory.unwrap().join("run_summary.json").is_file());
}

#[tokio::test]
async fn test_worker_count_does_not_change_outcome() {
    let mut fixture = Fixture::new();
    let extra = fixture.kb("kb_c");
    let gone = KnowledgeBaseSpec::new("kb_gone", fixture.root().join("gone"));
    fixture.config.knowledge_bases.extend([extra, gone]);

    let mut outcomes = Vec::new();
    for workers in [1, 4] {
        fixture.config.processing.max_workers = workers;
        let result = fixture.run(braf()).await;
        assert!(result.success, "errors: {:?}", result.errors);
        outcomes.push(named_keys(&result, ArtifactKind::KbOutputs));
    }

    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[0].len(), 3);
}

#[tokio::test]
async fn test_disabled_required_stage_is_configuration_error() {
    let mut fixture = Fixture::new();
    fixture.config.stages.kb_processing = false;

    let result = fixture.run(braf()).await;

    assert!(!result.success);
    assert!(result.errors[0].starts_with("Configuration error"), "{}", result.errors[0]);
    assert!(result.errors[0].contains("kb_processing"));
    assert!(result.stages_completed.is_empty());
    assert!(result.invocations.is_empty());
}

#[tokio::test]
async fn test_report_extraction_can_be_disabled() {
    let mut fixture = Fixture::new();
    fixture.config.stages.report_extraction = false;

    let result = fixture.run(braf()).await;

    assert!(result.success, "errors: {:?}", result.errors);
    assert!(!result.completed(PipelineStage::ReportExtraction));
    assert!(result.final_report_path.is_none());
    assert_eq!(named_keys(&result, ArtifactKind::CsvOutputs).len(), 2);
}

#[tokio::test]
async fn test_missing_annotator_is_configuration_error() {
    let mut fixture = Fixture::new();
    let missing = fixture.root().join("no-such-transvar");
    fixture.config.annotator.executable = missing;

    let result = fixture.run(braf()).await;

    assert!(!result.success);
    assert!(result.errors[0].starts_with("Configuration error"));
}

#[tokio::test]
async fn test_vcf_input_skips_annotation() {
    let mut fixture = Fixture::new();
    // Annotation is not needed for VCF input, so its tool may be absent.
    let missing = fixture.root().join("no-such-transvar");
    fixture.config.annotator.executable = missing;
    let vcf = fixture.root().join("input.vcf");
    std::fs::write(
        &vcf,
        format!("##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n{}\n", BRAF_VCF_LINE),
    )
    .unwrap();

    let result = fixture.run(VariantSource::Vcf(vcf)).await;

    assert!(result.success, "errors: {:?}", result.errors);
    assert!(!result.completed(PipelineStage::AnnotationLookup));
    assert!(result.completed(PipelineStage::VcfGeneration));
    let adopted = artifact_path(&result, ArtifactKind::VcfFile);
    assert!(adopted.starts_with(result.run_directory.as_ref().unwrap()));
    assert_eq!(result.metrics.vcf_variants_written, 1);
}

#[tokio::test]
async fn test_vcf_input_named_like_run_artifacts() {
    let fixture = Fixture::new();
    let vcf = fixture.root().join("run_summary.vcf");
    std::fs::write(
        &vcf,
        format!("##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n{}\n", BRAF_VCF_LINE),
    )
    .unwrap();

    let result = fixture.run(VariantSource::Vcf(vcf)).await;
    assert!(result.success, "errors: {:?}", result.errors);

    let run_dir = result.run_directory.clone().unwrap();
    assert_eq!(artifact_path(&result, ArtifactKind::VcfFile), run_dir.join("variants.vcf"));
    let structure = artifact_path(&result, ArtifactKind::StructureJson);
    assert_eq!(structure, run_dir.join("structure/variants.structure.json"));

    let source = std::fs::read_to_string(&structure).unwrap();
    assert!(source.contains("\"source\""), "{}", source);
    let summary = std::fs::read_to_string(run_dir.join("run_summary.json")).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(summary["run_id"], result.run_id.as_str());
}

#[tokio::test]
async fn test_csv_input_with_aliases_and_failures() {
    let fixture = Fixture::new();
    let csv = fixture.root().join("variants.csv");
    std::fs::write(
        &csv,
        "Hugo_Symbol,AA_Change\nBRAF,p.Val600Glu\nTP53,p.Arg273His\nKRAS,p.Gly12Asp\n",
    )
    .unwrap();

    let pipeline = Pipeline::new(fixture.config.clone());
    let result = pipeline.run(VariantSource::Csv(csv)).await;

    assert!(result.success, "errors: {:?}", result.errors);
    assert_eq!(result.metrics.variants_total, 3);
    assert_eq!(result.metrics.annotations_succeeded, 2);
    assert_eq!(result.metrics.annotations_failed, 1);
    assert_eq!(result.metrics.vcf_variants_written, 2);
    assert_eq!(result.metrics.unsupported_variants, 1);

    let vcf = std::fs::read_to_string(artifact_path(&result, ArtifactKind::VcfFile)).unwrap();
    let data: Vec<&str> = vcf.lines().filter(|l| !l.starts_with('#')).collect();
    assert!(data[0].starts_with("chr7\t"));
    assert!(data[1].starts_with("chr12\t25398284\t.\tC\tT"));

    let unsupported =
        std::fs::read_to_string(artifact_path(&result, ArtifactKind::UnsupportedReport)).unwrap();
    assert!(unsupported.contains("TP53,p.R273H,substitution"));
    assert!(result.artifact(ArtifactKind::FailureAnalysis).is_some());

    let failed = pipeline
        .status_history()
        .into_iter()
        .find(|status| status.message == "TP53:p.Arg273His failed")
        .expect("failed annotation status");
    assert!(
        failed.details.as_deref().unwrap_or_default().contains("no annotation for"),
        "{:?}",
        failed.details
    );
}

#[tokio::test]
async fn test_unsupported_categories_are_reported() {
    let fixture = Fixture::new();
    let source = VariantSource::Variants(vec![
        VariantInput::new("BRAF", "p.V600E"),
        VariantInput::new("EGFR", "amplification"),
    ]);

    let result = fixture.run(source).await;

    // The annotator mock cannot resolve "amplification" either way; the
    // category decides the row still lands in the unsupported report.
    assert!(result.success, "errors: {:?}", result.errors);
    let unsupported =
        std::fs::read_to_string(artifact_path(&result, ArtifactKind::UnsupportedReport)).unwrap();
    assert!(unsupported.contains("EGFR,amplification,cnv_gain"));
}

#[tokio::test]
async fn test_structure_failure_stops_run() {
    let mut fixture = Fixture::new();
    let broken = write_script(fixture.root(), "broken.sh", FAILING);
    fixture.config.paths.structure_script = Some(broken);

    let result = fixture.run(braf()).await;

    assert!(!result.success);
    assert!(result.errors[0].contains("structure_generator"));
    assert!(result.completed(PipelineStage::VcfGeneration));
    assert!(!result.completed(PipelineStage::ReportStructureGeneration));
    let structure = result
        .invocations
        .iter()
        .find(|i| i.tool == ToolKind::StructureGenerator)
        .unwrap();
    assert_eq!(structure.attempts, 2);
    assert_eq!(structure.exit_code, Some(2));
}

#[tokio::test]
async fn test_script_converter() {
    let mut fixture = Fixture::new();
    fixture.config.conversion.builtin = false;
    fixture.config.conversion.interpreter = "sh".to_string();
    let script = write_script(fixture.root(), "convert.sh", CONVERTER);
    fixture.config.paths.converter_script = Some(script);

    let result = fixture.run(braf()).await;

    assert!(result.success, "errors: {:?}", result.errors);
    let report = std::fs::read_to_string(result.final_report_path.unwrap()).unwrap();
    assert!(report.contains("BRAF,p.V600E,,Pathogenic"));
    assert!(report.contains("kb_a"));
}

#[tokio::test]
async fn test_listeners_see_every_stage() {
    let fixture = Fixture::new();
    let stages = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&stages);

    let pipeline = Pipeline::new(fixture.config.clone())
        .with_listener(Arc::new(|_: &PipelineStatus| -> ListenerResult {
            Err("display went away".into())
        }))
        .with_listener(Arc::new(move |status: &PipelineStatus| -> ListenerResult {
            seen.lock().unwrap().push(status.stage);
            Ok(())
        }));

    let result = pipeline.run(braf()).await;
    assert!(result.success, "errors: {:?}", result.errors);

    let stages = stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&PipelineStage::InputValidation));
    assert_eq!(stages.last(), Some(&PipelineStage::Complete));
    assert!(stages.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(result.messages.len(), pipeline.status_history().len());
}

#[tokio::test]
async fn test_result_returned_when_run_directory_cannot_be_created() {
    let mut fixture = Fixture::new();
    let blocker = fixture.root().join("blocker");
    std::fs::write(&blocker, "not a directory").unwrap();
    fixture.config.paths.output_dir = blocker.join("output");

    let result = fixture.run(braf()).await;

    assert!(!result.success);
    assert!(result.run_directory.is_none());
    assert!(!result.run_id.is_empty());
    assert!(result.errors[0].starts_with("IO error"));
}
