//! Final report extraction.
//!
//! Each knowledge base ends up as its own CSV with whatever column names the
//! converter produced. [`extract`] maps those onto the canonical
//! [`fields::REPORT_FIELDS`], folds auxiliary assertion columns into the list
//! fields and stamps every row with its source and a sequential record id.

pub mod fields;
pub mod flatten;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use fields::{assertion_family, ReportField, REPORT_FIELDS};

/// Separator used when list values are written back out.
pub const LIST_SEPARATOR: &str = "; ";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {message}")]
    Json { path: PathBuf, message: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("No records extracted from {0} source file(s)")]
    NoRecords(usize),
}

impl ReportError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

static AUXILIARY_COLUMN: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^kb_results?\.(.+)$",
        r"^knowledge_base\.(.+)$",
        r"^results?\.(.+)$",
        r"^assertions?\.(.+)$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("auxiliary column pattern should compile"))
    .collect()
});

/// A per-knowledge-base CSV and, when known, the version that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSource {
    pub path: PathBuf,
    pub kb_version: Option<String>,
}

impl ReportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kb_version: None,
        }
    }

    pub fn with_kb_version(mut self, version: impl Into<String>) -> Self {
        self.kb_version = Some(version.into());
        self
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// One row of the final report. Field order is column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportRecord {
    pub gene: String,
    pub variant: String,
    pub transcript: String,
    pub inferred_classification: String,
    pub diagnostic_assertions: String,
    pub prognostic_assertions: String,
    pub therapeutic_assertions: String,
    pub trial_ids: String,
    pub diseases: String,
    pub kb_version: String,
    pub source_file: String,
    pub record_id: String,
    pub extraction_timestamp: String,
}

impl ReportRecord {
    /// Canonical field by name. Metadata columns are not addressable.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "gene" => &self.gene,
            "variant" => &self.variant,
            "transcript" => &self.transcript,
            "inferred_classification" => &self.inferred_classification,
            "diagnostic_assertions" => &self.diagnostic_assertions,
            "prognostic_assertions" => &self.prognostic_assertions,
            "therapeutic_assertions" => &self.therapeutic_assertions,
            "trial_ids" => &self.trial_ids,
            "diseases" => &self.diseases,
            "kb_version" => &self.kb_version,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn slot(&mut self, name: &str) -> Option<&mut String> {
        let slot = match name {
            "gene" => &mut self.gene,
            "variant" => &mut self.variant,
            "transcript" => &mut self.transcript,
            "inferred_classification" => &mut self.inferred_classification,
            "diagnostic_assertions" => &mut self.diagnostic_assertions,
            "prognostic_assertions" => &mut self.prognostic_assertions,
            "therapeutic_assertions" => &mut self.therapeutic_assertions,
            "trial_ids" => &mut self.trial_ids,
            "diseases" => &mut self.diseases,
            "kb_version" => &mut self.kb_version,
            _ => return None,
        };
        Some(slot)
    }

    /// Merge `value` into a list field, keeping what is already there.
    fn merge_into(&mut self, name: &str, value: &str) {
        if let Some(slot) = self.slot(name) {
            *slot = merge_list_values(&[slot.as_str(), value]);
        }
    }
}

/// Split one raw list cell into items.
///
/// `["a", "b"]` is read as a JSON array; otherwise `;` separates items, and
/// `,` only when no `;` is present.
fn split_list(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    if raw.starts_with('[') && raw.ends_with(']') {
        if let Ok(items) = serde_json::from_str::<Vec<Value>>(raw) {
            return items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect();
        }
        return raw[1..raw.len() - 1]
            .split(',')
            .map(|s| s.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
            .collect();
    }

    let separator = if raw.contains(';') { ';' } else { ',' };
    raw.split(separator).map(|s| s.trim().to_string()).collect()
}

/// Merge list cells into one `; `-joined value, dropping duplicates and
/// keeping first-seen order.
pub fn merge_list_values(values: &[&str]) -> String {
    let mut merged: Vec<String> = Vec::new();
    for item in values.iter().flat_map(|v| split_list(v)) {
        let item = item.trim().to_string();
        if !item.is_empty() && !merged.contains(&item) {
            merged.push(item);
        }
    }
    merged.join(LIST_SEPARATOR)
}

/// Coverage of one canonical field across the extracted records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCoverage {
    pub field: &'static str,
    pub populated_records: usize,
    pub coverage_percentage: f64,
    pub required: bool,
}

/// Everything extracted from a set of sources.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    #[serde(skip)]
    pub records: Vec<ReportRecord>,
    pub total_records: usize,
    pub sources_read: usize,
    pub skipped_sources: Vec<PathBuf>,
    pub coverage: Vec<FieldCoverage>,
    pub kb_versions: Vec<String>,
}

impl ExtractionReport {
    pub fn coverage_for(&self, field: &str) -> Option<&FieldCoverage> {
        self.coverage.iter().find(|c| c.field == field)
    }
}

/// Lower-cased header name to column index; first occurrence wins.
fn header_index(headers: &csv::StringRecord) -> HashMap<String, usize> {
    let mut index = HashMap::new();
    for (i, name) in headers.iter().enumerate() {
        index.entry(name.trim().to_lowercase()).or_insert(i);
    }
    index
}

fn resolve_field<'r>(
    field: &ReportField,
    index: &HashMap<String, usize>,
    row: &'r csv::StringRecord,
) -> Option<&'r str> {
    field
        .aliases
        .iter()
        .filter_map(|alias| index.get(*alias))
        .filter_map(|i| row.get(*i))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Auxiliary columns as (column index, list field) pairs.
fn auxiliary_columns(headers: &csv::StringRecord) -> Vec<(usize, &'static str)> {
    headers
        .iter()
        .enumerate()
        .filter_map(|(i, name)| {
            let lowered = name.trim().to_lowercase();
            AUXILIARY_COLUMN
                .iter()
                .find_map(|re| re.captures(&lowered))
                .and_then(|caps| assertion_family(&caps[1]))
                .map(|field| (i, field))
        })
        .collect()
}

/// Read every row of one source into canonical records. Metadata columns are
/// left for [`extract`] to fill.
pub fn extract_file(source: &ReportSource) -> Result<Vec<ReportRecord>, ReportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(&source.path)?;
    let headers = reader.headers()?.clone();
    let index = header_index(&headers);
    let auxiliary = auxiliary_columns(&headers);
    let source_file = source.file_name();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = ReportRecord::default();

        for field in &REPORT_FIELDS {
            let value = match resolve_field(field, &index, &row) {
                Some(value) if field.list => merge_list_values(&[value]),
                Some(value) => value.to_string(),
                None => field.default.to_string(),
            };
            if let Some(slot) = record.slot(field.name) {
                *slot = value;
            }
        }

        for (i, field) in &auxiliary {
            if let Some(value) = row.get(*i).map(str::trim).filter(|v| !v.is_empty()) {
                record.merge_into(field, value);
            }
        }

        if record.kb_version.is_empty() {
            if let Some(version) = &source.kb_version {
                record.kb_version = version.clone();
            }
        }
        record.source_file = source_file.clone();
        records.push(record);
    }

    debug!(
        "Extracted {} record(s) from {}",
        records.len(),
        source.path.display()
    );
    Ok(records)
}

fn coverage(records: &[ReportRecord]) -> Vec<FieldCoverage> {
    let total = records.len();
    REPORT_FIELDS
        .iter()
        .map(|field| {
            let populated = records
                .iter()
                .filter(|r| r.get(field.name).is_some_and(|v| !v.is_empty()))
                .count();
            let percentage = if total == 0 {
                0.0
            } else {
                (populated as f64 / total as f64 * 1000.0).round() / 10.0
            };
            FieldCoverage {
                field: field.name,
                populated_records: populated,
                coverage_percentage: percentage,
                required: field.required,
            }
        })
        .collect()
}

/// Sorted, distinct knowledge-base versions named by the records.
fn kb_versions(records: &[ReportRecord]) -> Vec<String> {
    let mut versions: Vec<String> = records
        .iter()
        .flat_map(|r| split_list(&r.kb_version))
        .filter(|v| !v.is_empty())
        .collect();
    versions.sort();
    versions.dedup();
    versions
}

/// Extract all sources into one report.
///
/// Missing or unreadable sources are skipped with a warning. Fails only when
/// nothing at all was extracted.
pub fn extract(sources: &[ReportSource]) -> Result<ExtractionReport, ReportError> {
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
    let mut records = Vec::new();
    let mut skipped = Vec::new();

    for source in sources {
        if !source.path.is_file() {
            warn!("Report source not found, skipping: {}", source.path.display());
            skipped.push(source.path.clone());
            continue;
        }
        match extract_file(source) {
            Ok(rows) => records.extend(rows),
            Err(e) => {
                warn!("Failed to read {}: {}", source.path.display(), e);
                skipped.push(source.path.clone());
            }
        }
    }

    if records.is_empty() {
        return Err(ReportError::NoRecords(sources.len()));
    }

    for (i, record) in records.iter_mut().enumerate() {
        record.record_id = format!("record_{:04}", i + 1);
        record.extraction_timestamp = timestamp.clone();
    }

    Ok(ExtractionReport {
        total_records: records.len(),
        sources_read: sources.len() - skipped.len(),
        skipped_sources: skipped,
        coverage: coverage(&records),
        kb_versions: kb_versions(&records),
        records,
    })
}

/// Merge records describing the same gene and variant.
///
/// List fields and the knowledge-base version are unioned, scalar fields keep
/// the first non-empty value, and a real classification replaces `Unknown`.
pub fn consolidate(records: &[ReportRecord]) -> Vec<ReportRecord> {
    let mut merged: Vec<ReportRecord> = Vec::new();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for record in records {
        let key = (record.gene.to_uppercase(), record.variant.clone());
        let at = match positions.get(&key).copied() {
            Some(at) => at,
            None => {
                positions.insert(key, merged.len());
                merged.push(record.clone());
                continue;
            }
        };

        let target = &mut merged[at];
        for field in &REPORT_FIELDS {
            let incoming = record.get(field.name).unwrap_or_default();
            if incoming.is_empty() {
                continue;
            }
            let Some(slot) = target.slot(field.name) else {
                continue;
            };
            if field.list || field.name == "kb_version" {
                *slot = merge_list_values(&[slot.as_str(), incoming]);
            } else if slot.is_empty() || (!field.default.is_empty() && *slot == field.default) {
                *slot = incoming.to_string();
            }
        }
        target.source_file = merge_list_values(&[target.source_file.as_str(), record.source_file.as_str()]);
    }

    merged
}

/// Write records as CSV. An empty set still gets a header row.
pub fn write_report(path: &Path, records: &[ReportRecord]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        let mut header: Vec<&str> = REPORT_FIELDS.iter().map(|f| f.name).collect();
        header.extend(fields::METADATA_COLUMNS);
        writer.write_record(&header)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush().map_err(|e| ReportError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_merge_list_values() {
        assert_eq!(merge_list_values(&["A", "A; B"]), "A; B");
        assert_eq!(merge_list_values(&["[\"x\", \"y\"]", "y,z"]), "x; y; z");
        assert_eq!(merge_list_values(&["a, b; c"]), "a, b; c");
        assert_eq!(merge_list_values(&["", "  "]), "");
    }

    #[test]
    fn test_extract_aliases_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "cosmic.csv",
            "Gene_Symbol,HGVS_P,Diagnostic,trials\nBRAF,p.V600E,Melanoma;Melanoma,NCT001\n",
        );

        let records = extract_file(&ReportSource::new(&path).with_kb_version("cosmic_v97")).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.gene, "BRAF");
        assert_eq!(record.variant, "p.V600E");
        assert_eq!(record.inferred_classification, "Unknown");
        assert_eq!(record.diagnostic_assertions, "Melanoma");
        assert_eq!(record.trial_ids, "NCT001");
        assert_eq!(record.kb_version, "cosmic_v97");
        assert_eq!(record.source_file, "cosmic.csv");
    }

    #[test]
    fn test_extract_auxiliary_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "kb.csv",
            "gene,variant,therapeutic,kb_results.treatment,assertions.disease_links\nKRAS,p.G12D,Drug A,Drug A; Drug B,CRC\n",
        );

        let records = extract_file(&ReportSource::new(&path)).unwrap();
        assert_eq!(records[0].therapeutic_assertions, "Drug A; Drug B");
        assert_eq!(records[0].diseases, "CRC");
        assert_eq!(records[0].kb_version, "");
    }

    #[test]
    fn test_extract_numbers_records_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_csv(dir.path(), "a.csv", "gene,variant,kb_version\nBRAF,p.V600E,v2\nTP53,p.R273H,v2\n");
        let b = write_csv(dir.path(), "b.csv", "gene,variant,kb_version\nBRAF,p.V600E,v1\n");
        let sources = vec![
            ReportSource::new(&a),
            ReportSource::new(dir.path().join("missing.csv")),
            ReportSource::new(&b),
        ];

        let report = extract(&sources).unwrap();
        assert_eq!(report.total_records, 3);
        assert_eq!(report.sources_read, 2);
        assert_eq!(report.skipped_sources.len(), 1);
        assert_eq!(report.records[2].record_id, "record_0003");
        assert_eq!(report.kb_versions, vec!["v1", "v2"]);

        let gene = report.coverage_for("gene").unwrap();
        assert_eq!(gene.populated_records, 3);
        assert_eq!(gene.coverage_percentage, 100.0);
        assert!(gene.required);
    }

    #[test]
    fn test_extract_fails_without_records() {
        let dir = tempfile::tempdir().unwrap();
        let sources = vec![ReportSource::new(dir.path().join("missing.csv"))];
        assert!(matches!(extract(&sources), Err(ReportError::NoRecords(1))));
    }

    #[test]
    fn test_consolidate_merges_same_variant() {
        let first = ReportRecord {
            gene: "BRAF".into(),
            variant: "p.V600E".into(),
            inferred_classification: "Unknown".into(),
            diseases: "Melanoma".into(),
            kb_version: "cosmic".into(),
            source_file: "a.csv".into(),
            ..Default::default()
        };
        let second = ReportRecord {
            gene: "braf".into(),
            variant: "p.V600E".into(),
            inferred_classification: "Pathogenic".into(),
            diseases: "Melanoma; Thyroid cancer".into(),
            kb_version: "clinvar".into(),
            source_file: "b.csv".into(),
            ..Default::default()
        };
        let other = ReportRecord {
            gene: "KRAS".into(),
            variant: "p.G12D".into(),
            ..Default::default()
        };

        let merged = consolidate(&[first, other, second]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].inferred_classification, "Pathogenic");
        assert_eq!(merged[0].diseases, "Melanoma; Thyroid cancer");
        assert_eq!(merged[0].kb_version, "cosmic; clinvar");
        assert_eq!(merged[0].source_file, "a.csv; b.csv");
    }

    #[test]
    fn test_write_report_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final_report.csv");
        write_report(&path, &[]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.lines().next().unwrap(),
            "gene,variant,transcript,inferred_classification,diagnostic_assertions,prognostic_assertions,therapeutic_assertions,trial_ids,diseases,kb_version,source_file,record_id,extraction_timestamp"
        );
    }
}
