//! Flattening of per-knowledge-base JSON into CSV rows.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ReportError;

/// Top level of a knowledge-base processor document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KbDocument {
    #[serde(default)]
    pub variants: Vec<KbVariant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KbVariant {
    pub variant: Option<Value>,
    pub gene: Option<Value>,
    pub transcript: Option<Value>,
    pub hgvsc: Option<Value>,
    pub hgvsp: Option<Value>,
    pub variant_type: Option<Value>,
    pub clinical_significance: ClinicalSignificance,
    pub population_frequency: PopulationFrequency,
    pub functional_predictions: FunctionalPredictions,
    pub disease_associations: Vec<DiseaseAssociation>,
    pub therapeutic_implications: Vec<TherapeuticImplication>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClinicalSignificance {
    pub classification: Option<Value>,
    pub evidence: Option<Value>,
    pub acmg_criteria: Vec<Value>,
    pub confidence: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PopulationFrequency {
    pub gnomad: AlleleFrequency,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlleleFrequency {
    pub af: Option<Value>,
    pub ac: Option<Value>,
    pub an: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FunctionalPredictions {
    pub sift: Prediction,
    pub polyphen: Prediction,
    pub cadd: CaddScore,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Prediction {
    pub score: Option<Value>,
    pub prediction: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CaddScore {
    pub phred: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DiseaseAssociation {
    pub disease: Option<Value>,
    pub omim: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TherapeuticImplication {
    pub drug: Option<Value>,
    pub response_type: Option<Value>,
}

/// One row of a per-knowledge-base CSV. Field order is column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlatRow {
    pub variant_id: String,
    pub gene: String,
    pub transcript: String,
    pub hgvsc: String,
    pub hgvsp: String,
    pub protein_change: String,
    pub variant_type: String,
    pub clinical_significance: String,
    pub evidence: String,
    pub acmg_criteria: String,
    pub confidence: String,
    pub gnomad_af: String,
    pub gnomad_ac: String,
    pub gnomad_an: String,
    pub sift_score: String,
    pub sift_prediction: String,
    pub polyphen_score: String,
    pub polyphen_prediction: String,
    pub cadd_phred: String,
    pub diseases: String,
    pub therapeutic_implications: String,
}

pub const CSV_COLUMNS: [&str; 21] = [
    "variant_id",
    "gene",
    "transcript",
    "hgvsc",
    "hgvsp",
    "protein_change",
    "variant_type",
    "clinical_significance",
    "evidence",
    "acmg_criteria",
    "confidence",
    "gnomad_af",
    "gnomad_ac",
    "gnomad_an",
    "sift_score",
    "sift_prediction",
    "polyphen_score",
    "polyphen_prediction",
    "cadd_phred",
    "diseases",
    "therapeutic_implications",
];

/// Render a JSON scalar the way it should appear in a CSV cell.
fn text(value: &Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `NP_004324.2:p.V600E` to `p.V600E`.
pub fn protein_change(hgvsp: &str) -> String {
    match hgvsp.split_once(':') {
        Some((_, change)) => change.to_string(),
        None => hgvsp.to_string(),
    }
}

impl From<&KbVariant> for FlatRow {
    fn from(v: &KbVariant) -> Self {
        let hgvsp = text(&v.hgvsp);
        let clinical = &v.clinical_significance;
        let gnomad = &v.population_frequency.gnomad;
        let predictions = &v.functional_predictions;

        let diseases = v
            .disease_associations
            .iter()
            .map(|d| {
                let omim = text(&d.omim);
                let omim = if omim.is_empty() { "N/A".to_string() } else { omim };
                format!("{} ({})", text(&d.disease), omim)
            })
            .collect::<Vec<_>>()
            .join("; ");

        let therapies = v
            .therapeutic_implications
            .iter()
            .map(|t| format!("{} ({})", text(&t.drug), text(&t.response_type)))
            .collect::<Vec<_>>()
            .join("; ");

        FlatRow {
            variant_id: text(&v.variant),
            gene: text(&v.gene),
            transcript: text(&v.transcript),
            hgvsc: text(&v.hgvsc),
            protein_change: protein_change(&hgvsp),
            hgvsp,
            variant_type: text(&v.variant_type),
            clinical_significance: text(&clinical.classification),
            evidence: text(&clinical.evidence),
            acmg_criteria: clinical
                .acmg_criteria
                .iter()
                .map(|c| text(&Some(c.clone())))
                .collect::<Vec<_>>()
                .join(", "),
            confidence: text(&clinical.confidence),
            gnomad_af: text(&gnomad.af),
            gnomad_ac: text(&gnomad.ac),
            gnomad_an: text(&gnomad.an),
            sift_score: text(&predictions.sift.score),
            sift_prediction: text(&predictions.sift.prediction),
            polyphen_score: text(&predictions.polyphen.score),
            polyphen_prediction: text(&predictions.polyphen.prediction),
            cadd_phred: text(&predictions.cadd.phred),
            diseases,
            therapeutic_implications: therapies,
        }
    }
}

pub fn flatten(document: &KbDocument) -> Vec<FlatRow> {
    document.variants.iter().map(FlatRow::from).collect()
}

/// Read a knowledge-base JSON file and write its CSV. Returns the row count.
pub fn flatten_file(input: &Path, output: &Path) -> Result<usize, ReportError> {
    let content = std::fs::read_to_string(input).map_err(|e| ReportError::io(input, e))?;
    let document: KbDocument = serde_json::from_str(&content).map_err(|e| ReportError::Json {
        path: input.to_path_buf(),
        message: e.to_string(),
    })?;

    let rows = flatten(&document);
    let mut writer = csv::Writer::from_path(output)?;
    if rows.is_empty() {
        writer.write_record(CSV_COLUMNS)?;
    }
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| ReportError::io(output, e))?;
    Ok(rows.len())
}
