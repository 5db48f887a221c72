//! VCF line and header construction.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::coordinates::validate;
use super::VcfError;
use crate::models::{AnnotationResult, UnsupportedVariant};
use crate::notation::VariantCategory;

/// Name written to `##source=`.
pub const VCF_SOURCE: &str = "varimpact";

/// Version written to `##automationVersion=`.
pub const AUTOMATION_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const COLUMN_HEADER: &str = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO";

static SUBSTITUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ACGT]+)>([ACGT]+)$").expect("substitution pattern"));
static DELETION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^del([ACGT]*)$").expect("deletion pattern"));
static INSERTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ins([ACGT]+)$").expect("insertion pattern"));

/// Build the VCF header. `enhanced` adds the variant-type INFO keys and the
/// automation scope lines.
pub fn build_header(enhanced: bool) -> String {
    let mut lines = vec![
        "##fileformat=VCFv4.2".to_string(),
        format!("##source={}", VCF_SOURCE),
    ];

    if enhanced {
        lines.push(format!("##automationVersion={}", AUTOMATION_VERSION));
    }

    lines.extend(
        [
            r#"##INFO=<ID=GENE,Number=1,Type=String,Description="Gene symbol">"#,
            r#"##INFO=<ID=TRANSCRIPT,Number=1,Type=String,Description="Transcript ID">"#,
            r#"##INFO=<ID=PROTEIN,Number=1,Type=String,Description="Protein change">"#,
        ]
        .map(String::from),
    );

    if enhanced {
        lines.extend(
            [
                r#"##INFO=<ID=VARIANT_TYPE,Number=1,Type=String,Description="Variant classification">"#,
                r#"##INFO=<ID=AUTO_GENERATED,Number=0,Type=Flag,Description="Automatically generated from annotator output">"#,
                "##AUTOMATION_SCOPE=Small variants (substitutions, small indels)",
                "##AUTOMATION_EXCLUDED=CNV, splice, RNA/DNA fusions (require manual coordinates)",
            ]
            .map(String::from),
        );
    }

    lines.push(COLUMN_HEADER.to_string());
    lines.join("\n")
}

/// Derive REF and ALT from a genomic change.
///
/// `A>T` gives a substitution, `delT` a deletion (missing bases become `N`,
/// ALT `.`), `insAG` an insertion (REF `.`). Anything else is undetermined.
pub fn derive_ref_alt(change: &str) -> Option<(String, String)> {
    if let Some(caps) = SUBSTITUTION.captures(change) {
        return Some((caps[1].to_string(), caps[2].to_string()));
    }
    if let Some(caps) = DELETION.captures(change) {
        let bases = if caps[1].is_empty() { "N" } else { &caps[1] };
        return Some((bases.to_string(), ".".to_string()));
    }
    if let Some(caps) = INSERTION.captures(change) {
        return Some((".".to_string(), caps[1].to_string()));
    }
    None
}

/// Build one VCF data line.
///
/// Defined only when the annotation succeeded, its coordinates validate and
/// REF/ALT can be derived. Passing a category switches on the enhanced INFO
/// keys.
pub fn build_line(result: &AnnotationResult, category: Option<VariantCategory>) -> Option<String> {
    if !result.success {
        return None;
    }
    let coords = result.coordinates.as_ref()?;
    validate(coords).ok()?;

    let chrom = coords.chrom.as_deref()?;
    let pos = coords.position()?;
    let (reference, alternate) = derive_ref_alt(coords.change.as_deref()?)?;

    let mut info = format!(
        "GENE={};TRANSCRIPT={};PROTEIN={}",
        info_value(&result.gene),
        info_value(result.transcript.as_deref().unwrap_or("")),
        info_value(&result.protein_change)
    );
    if let Some(category) = category {
        info.push_str(&format!(";VARIANT_TYPE={};AUTO_GENERATED", category));
    }

    Some(format!(
        "{}\t{}\t.\t{}\t{}\t.\t.\t{}",
        chrom, pos, reference, alternate, info
    ))
}

/// INFO values may not contain separators or whitespace.
fn info_value(value: &str) -> String {
    let cleaned: String = value
        .trim()
        .chars()
        .map(|c| match c {
            ';' | '=' | ',' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        ".".to_string()
    } else {
        cleaned
    }
}

/// What [`write_variant_file`] wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VcfWriteSummary {
    pub path: PathBuf,
    pub variants_written: usize,
}

/// Write a header plus data lines.
pub fn write_variant_file(
    path: &Path,
    header: &str,
    lines: &[String],
) -> Result<VcfWriteSummary, VcfError> {
    let mut content = String::with_capacity(header.len() + lines.len() * 96);
    content.push_str(header);
    content.push('\n');
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }

    fs::write(path, content).map_err(|e| VcfError::io(path, e))?;

    Ok(VcfWriteSummary {
        path: path.to_path_buf(),
        variants_written: lines.len(),
    })
}

/// Write `unsupported_variants.csv`.
pub fn write_unsupported_report(
    path: &Path,
    variants: &[UnsupportedVariant],
) -> Result<(), VcfError> {
    let mut writer = csv::Writer::from_path(path)?;
    if variants.is_empty() {
        writer.write_record([
            "gene",
            "protein_change",
            "variant_type",
            "reason_skipped",
            "requires_coordinates",
            "original_input",
        ])?;
    }
    for variant in variants {
        writer.serialize(variant)?;
    }
    writer.flush().map_err(|e| VcfError::io(path, e))?;
    Ok(())
}
