//! Variant input and annotation models.

use serde::{Deserialize, Serialize};

/// One user-supplied variant.
///
/// Created once from the chosen input mode and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantInput {
    pub gene: String,
    /// Protein change as the user typed it, before normalization.
    pub raw_protein_change: String,
    #[serde(default)]
    pub transcript: Option<String>,
}

impl VariantInput {
    pub fn new(gene: impl Into<String>, raw_protein_change: impl Into<String>) -> Self {
        Self {
            gene: gene.into().trim().to_string(),
            raw_protein_change: raw_protein_change.into().trim().to_string(),
            transcript: None,
        }
    }

    pub fn with_transcript(mut self, transcript: Option<String>) -> Self {
        self.transcript = transcript
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self
    }

    /// `GENE:change` label used in logs and the unsupported report.
    pub fn label(&self) -> String {
        format!("{}:{}", self.gene, self.raw_protein_change)
    }
}

/// Most specific layer found in the annotator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateKind {
    Genomic,
    Coding,
    Protein,
    /// Only a transcript accession was recognized.
    Transcript,
}

impl CoordinateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateKind::Genomic => "genomic",
            CoordinateKind::Coding => "coding",
            CoordinateKind::Protein => "protein",
            CoordinateKind::Transcript => "transcript",
        }
    }
}

impl std::fmt::Display for CoordinateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coordinates extracted from annotator output.
///
/// `chrom` and `pos` come from the same genomic match, so either both are set
/// or neither is. `pos` is kept as text until validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    /// `None` when nothing was recognized.
    #[serde(default)]
    pub kind: Option<CoordinateKind>,
    pub chrom: Option<String>,
    pub pos: Option<String>,
    /// Genomic change text after the position, e.g. `A>T` or `delT`.
    pub change: Option<String>,
    pub coding_pos: Option<String>,
    pub coding_change: Option<String>,
    pub protein_change: Option<String>,
    /// Transcript accession found in the output (`NM_004333.4`).
    pub transcript: Option<String>,
}

impl Coordinates {
    /// Parsed genomic position, if present and numeric.
    pub fn position(&self) -> Option<u64> {
        self.pos.as_deref().and_then(|p| p.parse().ok())
    }

    pub fn is_empty(&self) -> bool {
        self.chrom.is_none()
            && self.pos.is_none()
            && self.coding_pos.is_none()
            && self.protein_change.is_none()
    }
}

/// Outcome of resolving one variant through the annotator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationResult {
    pub gene: String,
    pub transcript: Option<String>,
    /// Normalized protein change that was sent to the annotator.
    pub protein_change: String,
    pub original_input: String,
    pub success: bool,
    /// Always set on success. Failed lookups keep whatever partial
    /// coordinates were recognized.
    pub coordinates: Option<Coordinates>,
    /// Why `transcript` was picked when it was chosen from the tool output.
    #[serde(default)]
    pub transcript_reason: Option<String>,
    pub vcf_line: Option<String>,
    pub error_message: Option<String>,
}

impl AnnotationResult {
    /// Successful lookup. The transcript falls back to the one in the tool output.
    pub fn resolved(input: &VariantInput, protein_change: String, coordinates: Coordinates) -> Self {
        let transcript = input
            .transcript
            .clone()
            .or_else(|| coordinates.transcript.clone());
        Self {
            gene: input.gene.clone(),
            transcript,
            protein_change,
            original_input: input.raw_protein_change.clone(),
            success: true,
            coordinates: Some(coordinates),
            transcript_reason: None,
            vcf_line: None,
            error_message: None,
        }
    }

    pub fn failed(input: &VariantInput, protein_change: String, error: impl Into<String>) -> Self {
        Self {
            gene: input.gene.clone(),
            transcript: input.transcript.clone(),
            protein_change,
            original_input: input.raw_protein_change.clone(),
            success: false,
            coordinates: None,
            transcript_reason: None,
            vcf_line: None,
            error_message: Some(error.into()),
        }
    }

    /// Keep partial coordinates on a failed lookup. Empty coordinates are dropped.
    pub fn with_partial_coordinates(mut self, coordinates: Coordinates) -> Self {
        if !self.success && !coordinates.is_empty() {
            self.coordinates = Some(coordinates);
        }
        self
    }

    pub fn with_transcript_reason(mut self, reason: Option<String>) -> Self {
        self.transcript_reason = reason;
        self
    }
}

/// A variant left out of the VCF, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsupportedVariant {
    pub gene: String,
    pub protein_change: String,
    pub variant_type: String,
    pub reason_skipped: String,
    pub requires_coordinates: bool,
    pub original_input: String,
}
