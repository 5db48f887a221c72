//! Annotator adapter: protein notation to genomic coordinates.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::{execute, RetryPolicy, ToolAdapter, ToolCommand, ToolKind, TranscriptSelector};
use crate::config::{AnnotatorConfig, Config};
use crate::models::{AnnotationResult, CoordinateKind, VariantInput};
use crate::notation::normalize;
use crate::vcf::{parse, transcripts, validate};

/// Subcommand for protein-level annotation.
pub const PROTEIN_SUBCOMMAND: &str = "panno";

pub struct Annotator {
    config: AnnotatorConfig,
    selector: TranscriptSelector,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Annotator {
    pub fn new(config: AnnotatorConfig, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            config,
            selector: TranscriptSelector::default(),
            timeout,
            retry,
        }
    }

    pub fn with_selector(mut self, selector: TranscriptSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.annotator.clone(),
            config.tool_timeout(ToolKind::Annotator),
            config.retry_policy(ToolKind::Annotator),
        )
        .with_selector(TranscriptSelector::new(config.transcripts.clone()))
    }

    /// `[exe, panno, --db, --refversion, ref, [--ccds], [--reference fa], custom..., [transcript:]notation]`
    pub fn build_command(&self, notation: &str, transcript: Option<&str>) -> ToolCommand {
        let query = match transcript {
            Some(transcript) if !transcript.is_empty() => format!("{}:{}", transcript, notation),
            _ => notation.to_string(),
        };

        let mut command = ToolCommand::new(
            ToolKind::Annotator,
            self.config.executable.to_string_lossy().into_owned(),
        )
        .arg(PROTEIN_SUBCOMMAND);
        for flag in self.config.flags() {
            command = command.arg(flag);
        }
        command.arg(query)
    }

    /// Resolve one variant. Tool failures and unusable output become a failed
    /// result; nothing is raised.
    pub async fn annotate(&self, input: &VariantInput) -> AnnotationResult {
        let notation = normalize(&input.raw_protein_change);
        let command = self.build_command(&notation, input.transcript.as_deref());
        let invocation = execute(self, &command).await;

        if !invocation.success {
            return AnnotationResult::failed(input, notation, invocation.error_message());
        }

        let choice = match input.transcript {
            Some(_) => None,
            None => self.selector.select_best(&transcripts(&invocation.stdout)),
        };
        let coordinates = match &choice {
            Some(choice) => {
                let mut coordinates = parse(output_for(&invocation.stdout, &choice.transcript));
                coordinates.transcript = Some(choice.transcript.clone());
                coordinates
            }
            None => parse(&invocation.stdout),
        };
        let reason = choice.map(|c| c.reason.to_string());

        match validate(&coordinates) {
            Ok(()) => {
                debug!(variant = %input.label(), transcript_reason = ?reason, "Resolved coordinates");
                AnnotationResult::resolved(input, notation, coordinates).with_transcript_reason(reason)
            }
            Err(e) => AnnotationResult::failed(input, notation, format!("Invalid coordinates: {}", e))
                .with_partial_coordinates(coordinates),
        }
    }
}

/// The first output line naming `transcript`, or the whole output.
fn output_for<'a>(stdout: &'a str, transcript: &str) -> &'a str {
    stdout
        .lines()
        .find(|line| line.contains(transcript))
        .unwrap_or(stdout)
}

impl ToolAdapter for Annotator {
    fn kind(&self) -> ToolKind {
        ToolKind::Annotator
    }

    fn executable(&self) -> &Path {
        &self.config.executable
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn availability_hint(&self) -> String {
        "Install TransVar or set annotator.executable / VARIMPACT_ANNOTATOR_EXECUTABLE".to_string()
    }
}

/// One failed annotation, as shown in the failure analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleFailure {
    pub input: String,
    pub gene: String,
    pub protein_change: String,
    pub error: String,
}

/// Summary of why annotations failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FailureAnalysis {
    pub total: usize,
    pub failed: usize,
    /// Error message to count.
    pub failure_types: BTreeMap<String, usize>,
    /// Failures that still carried partial coordinates, by most specific layer.
    pub coordinate_types: BTreeMap<CoordinateKind, usize>,
    /// Up to [`FailureAnalysis::MAX_SAMPLES`] examples.
    pub sample_failures: Vec<SampleFailure>,
    pub recommendations: Vec<String>,
}

impl FailureAnalysis {
    pub const MAX_SAMPLES: usize = 10;

    pub fn from_results(results: &[AnnotationResult]) -> Self {
        let mut analysis = FailureAnalysis {
            total: results.len(),
            ..Default::default()
        };

        for result in results.iter().filter(|r| !r.success) {
            analysis.failed += 1;
            let error = result
                .error_message
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string());
            *analysis.failure_types.entry(error.clone()).or_insert(0) += 1;
            if let Some(kind) = result.coordinates.as_ref().and_then(|c| c.kind) {
                *analysis.coordinate_types.entry(kind).or_insert(0) += 1;
            }

            if analysis.sample_failures.len() < Self::MAX_SAMPLES {
                analysis.sample_failures.push(SampleFailure {
                    input: format!("{}:{}", result.gene, result.original_input),
                    gene: result.gene.clone(),
                    protein_change: result.protein_change.clone(),
                    error,
                });
            }
        }

        analysis.recommendations = recommendations(analysis.failure_types.keys());
        analysis
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.total - self.failed) as f64 / self.total as f64
        }
    }
}

fn recommendations<'a>(errors: impl Iterator<Item = &'a String> + Clone) -> Vec<String> {
    let mentions = |needle: &str| errors.clone().any(|e| e.to_lowercase().contains(needle));
    let mut out = Vec::new();

    if mentions("coordinates") {
        out.push(
            "Check the protein notation format: variants should use standard HGVS notation"
                .to_string(),
        );
    }
    if mentions("timed out") || mentions("timeout") {
        out.push(
            "Some variants timed out: increase processing.timeout_seconds or check the annotator installation"
                .to_string(),
        );
    }
    if mentions("transcript") {
        out.push("Transcript-related errors: verify transcript IDs are valid and current".to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatabaseType, ReferenceVersion};
    use std::path::PathBuf;

    fn annotator() -> Annotator {
        let config = AnnotatorConfig {
            executable: PathBuf::from("/opt/transvar"),
            database: DatabaseType::Refseq,
            reference_version: ReferenceVersion::Hg38,
            use_ccds: true,
            reference_file: None,
            custom_flags: vec!["--oneline".into()],
        };
        Annotator::new(config, Duration::from_secs(5), RetryPolicy::once())
    }

    #[test]
    fn test_build_command_with_transcript() {
        let cmd = annotator().build_command("p.V600E", Some("NM_004333.4"));
        assert_eq!(
            cmd.argv(),
            vec![
                "/opt/transvar",
                "panno",
                "--refseq",
                "--refversion",
                "hg38",
                "--ccds",
                "--oneline",
                "NM_004333.4:p.V600E"
            ]
        );
    }

    #[test]
    fn test_build_command_without_transcript() {
        let cmd = annotator().build_command("p.V600E", None);
        assert_eq!(cmd.argv().last().map(String::as_str), Some("p.V600E"));
    }

    #[test]
    fn test_output_for_picks_line() {
        let stdout = "NM_001354609.2\tchr7:g.1A>T\nNM_004333.4\tchr7:g.140453136A>T\n";
        assert_eq!(output_for(stdout, "NM_004333.4"), "NM_004333.4\tchr7:g.140453136A>T");
        assert_eq!(output_for(stdout, "ENST1"), stdout);
    }

    #[test]
    fn test_failure_analysis_counts_coordinate_kinds() {
        let input = VariantInput::new("BRAF", "p.V600E");
        let results = vec![
            AnnotationResult::failed(&input, "p.V600E".into(), "Invalid coordinates: Missing chromosome or position")
                .with_partial_coordinates(parse("NM_004333.4:c.1799T>A")),
            AnnotationResult::failed(&input, "p.V600E".into(), "Invalid coordinates: No coordinates found")
                .with_partial_coordinates(parse("NP_004324.2:p.V600E")),
            AnnotationResult::failed(&input, "p.V600E".into(), "Command timed out after 300s"),
        ];

        let analysis = FailureAnalysis::from_results(&results);
        assert_eq!(analysis.coordinate_types.get(&CoordinateKind::Coding), Some(&1));
        assert_eq!(analysis.coordinate_types.get(&CoordinateKind::Protein), Some(&1));
        assert_eq!(analysis.coordinate_types.values().sum::<usize>(), 2);
    }

    #[test]
    fn test_failure_analysis() {
        let input = VariantInput::new("TP53", "p.R175H");
        let mut results = vec![AnnotationResult::failed(
            &input,
            "p.R175H".into(),
            "Invalid coordinates: No coordinates found",
        )];
        for _ in 0..12 {
            results.push(AnnotationResult::failed(
                &input,
                "p.R175H".into(),
                "Command timed out after 300s",
            ));
        }

        let analysis = FailureAnalysis::from_results(&results);
        assert_eq!(analysis.failed, 13);
        assert_eq!(analysis.failure_types.len(), 2);
        assert_eq!(analysis.sample_failures.len(), FailureAnalysis::MAX_SAMPLES);
        assert_eq!(analysis.recommendations.len(), 2);
        assert_eq!(analysis.success_rate(), 0.0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_annotate_with_mock_tool() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("transvar");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'chr7:g.140453136A>T  NM_004333.4:c.1799T>A  NP_004324.2:p.V600E'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = AnnotatorConfig {
            executable: script,
            ..AnnotatorConfig::default()
        };
        let annotator = Annotator::new(config, Duration::from_secs(10), RetryPolicy::once());
        let result = annotator
            .annotate(&VariantInput::new("BRAF", "p.Val600Glu"))
            .await;

        assert!(result.success);
        assert_eq!(result.protein_change, "p.V600E");
        assert_eq!(result.transcript.as_deref(), Some("NM_004333.4"));
        assert_eq!(
            result.coordinates.and_then(|c| c.chrom),
            Some("chr7".to_string())
        );
        assert_eq!(result.transcript_reason.as_deref(), Some("MANE Select"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_annotate_selects_preferred_transcript() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("transvar");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             echo 'ENST00000496384.7:c.620T>A  chr7:g.140753336A>T  p.V207E'\n\
             echo 'NM_001354609.2:c.1919T>A  chr7:g.140453136A>T  p.V640E'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let config = AnnotatorConfig {
            executable: script,
            ..AnnotatorConfig::default()
        };
        let annotator = Annotator::new(config, Duration::from_secs(10), RetryPolicy::once());

        let result = annotator.annotate(&VariantInput::new("BRAF", "p.V600E")).await;
        assert!(result.success, "{:?}", result.error_message);
        assert_eq!(result.transcript.as_deref(), Some("NM_001354609.2"));
        assert_eq!(result.transcript_reason.as_deref(), Some("Preferred source (NM_)"));
        let coords = result.coordinates.unwrap();
        assert_eq!(coords.pos.as_deref(), Some("140453136"));
        assert_eq!(coords.protein_change.as_deref(), Some("p.V640E"));

        // A transcript named by the input is kept and nothing is re-ranked.
        let pinned = VariantInput::new("BRAF", "p.V600E")
            .with_transcript(Some("ENST00000496384.7".into()));
        let result = annotator.annotate(&pinned).await;
        assert_eq!(result.transcript.as_deref(), Some("ENST00000496384.7"));
        assert_eq!(result.transcript_reason, None);
    }
}
