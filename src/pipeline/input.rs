//! Variant input modes.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::types::InputKind;
use crate::error::PipelineError;
use crate::models::VariantInput;

/// Accepted CSV headers per column, compared case-insensitively.
pub const GENE_COLUMNS: &[&str] = &["gene", "gene_symbol", "symbol", "hugo_symbol"];
pub const PROTEIN_COLUMNS: &[&str] = &["protein_change", "protein", "variant", "hgvsp", "aa_change"];
pub const TRANSCRIPT_COLUMNS: &[&str] = &["transcript", "transcript_id"];

/// Where a run's variants come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantSource {
    Variants(Vec<VariantInput>),
    Csv(PathBuf),
    /// Pre-built VCF; annotation is skipped.
    Vcf(PathBuf),
}

impl VariantSource {
    pub fn kind(&self) -> InputKind {
        match self {
            VariantSource::Variants(_) => InputKind::Variants,
            VariantSource::Csv(_) => InputKind::Csv,
            VariantSource::Vcf(_) => InputKind::Vcf,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            VariantSource::Variants(variants) => format!("{} variant(s)", variants.len()),
            VariantSource::Csv(path) => format!("CSV {}", path.display()),
            VariantSource::Vcf(path) => format!("VCF {}", path.display()),
        }
    }
}

/// Parse a `GENE:CHANGE` command-line argument.
pub fn parse_variant_arg(arg: &str) -> Result<VariantInput, PipelineError> {
    match arg.split_once(':') {
        Some((gene, change)) if !gene.trim().is_empty() && !change.trim().is_empty() => {
            Ok(VariantInput::new(gene, change))
        }
        _ => Err(PipelineError::InputValidation(format!(
            "Expected GENE:CHANGE, got '{}'",
            arg
        ))),
    }
}

fn find_column(index: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| index.get(*alias).copied())
}

/// Read variants from a CSV with flexible column names.
pub fn read_csv(path: &Path) -> Result<Vec<VariantInput>, PipelineError> {
    let invalid = |e: csv::Error| {
        PipelineError::InputValidation(format!("Failed to read {}: {}", path.display(), e))
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(invalid)?;

    let mut index = HashMap::new();
    for (i, name) in reader.headers().map_err(invalid)?.iter().enumerate() {
        index.entry(name.to_lowercase()).or_insert(i);
    }

    let gene_col = find_column(&index, GENE_COLUMNS).ok_or_else(|| {
        PipelineError::InputValidation(format!(
            "{} has no gene column (expected one of: {})",
            path.display(),
            GENE_COLUMNS.join(", ")
        ))
    })?;
    let protein_col = find_column(&index, PROTEIN_COLUMNS).ok_or_else(|| {
        PipelineError::InputValidation(format!(
            "{} has no protein change column (expected one of: {})",
            path.display(),
            PROTEIN_COLUMNS.join(", ")
        ))
    })?;
    let transcript_col = find_column(&index, TRANSCRIPT_COLUMNS);

    let mut variants = Vec::new();
    for row in reader.records() {
        let row = row.map_err(invalid)?;
        let cell = |i: usize| row.get(i).unwrap_or("").to_string();
        let transcript = transcript_col.map(cell);
        variants.push(VariantInput::new(cell(gene_col), cell(protein_col)).with_transcript(transcript));
    }

    debug!("Read {} row(s) from {}", variants.len(), path.display());
    Ok(variants)
}

/// Drop rows without a gene or protein change. Fails when none remain.
pub fn validate_variants(variants: Vec<VariantInput>) -> Result<Vec<VariantInput>, PipelineError> {
    let total = variants.len();
    let valid: Vec<VariantInput> = variants
        .into_iter()
        .filter(|v| {
            let ok = !v.gene.is_empty() && !v.raw_protein_change.is_empty();
            if !ok {
                warn!("Skipping incomplete variant '{}'", v.label());
            }
            ok
        })
        .collect();

    if valid.is_empty() {
        return Err(PipelineError::InputValidation(if total == 0 {
            "No variants provided".to_string()
        } else {
            format!("None of the {} input row(s) has both a gene and a protein change", total)
        }));
    }
    Ok(valid)
}

/// Fill in the configured transcript for genes the input left without one.
pub fn apply_preferred_transcripts(
    variants: Vec<VariantInput>,
    preferred: &BTreeMap<String, String>,
) -> Vec<VariantInput> {
    if preferred.is_empty() {
        return variants;
    }

    variants
        .into_iter()
        .map(|variant| {
            if variant.transcript.is_some() {
                return variant;
            }
            let transcript = preferred
                .get(&variant.gene)
                .or_else(|| preferred.get(&variant.gene.to_uppercase()))
                .cloned();
            variant.with_transcript(transcript)
        })
        .collect()
}
