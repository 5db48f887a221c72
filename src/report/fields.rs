//! Canonical report fields and their source-column aliases.

/// One column of the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportField {
    pub name: &'static str,
    /// Source columns tried in order, compared case-insensitively.
    pub aliases: &'static [&'static str],
    pub default: &'static str,
    pub required: bool,
    /// Multi-valued: parsed, merged and re-joined with `; `.
    pub list: bool,
    pub description: &'static str,
}

pub const REPORT_FIELDS: [ReportField; 10] = [
    ReportField {
        name: "gene",
        aliases: &["gene", "gene_symbol"],
        default: "",
        required: true,
        list: false,
        description: "Gene symbol",
    },
    ReportField {
        name: "variant",
        aliases: &["variant", "protein_change", "hgvs_p"],
        default: "",
        required: true,
        list: false,
        description: "Variant notation",
    },
    ReportField {
        name: "transcript",
        aliases: &["transcript", "transcript_id"],
        default: "",
        required: false,
        list: false,
        description: "Transcript identifier",
    },
    ReportField {
        name: "inferred_classification",
        aliases: &[
            "inferred_classification",
            "classification",
            "pathogenicity",
            "clinical_significance",
        ],
        default: "Unknown",
        required: false,
        list: false,
        description: "Inferred variant classification",
    },
    ReportField {
        name: "diagnostic_assertions",
        aliases: &["diagnostic_assertions", "diagnostic", "dx_assertions"],
        default: "",
        required: false,
        list: true,
        description: "Diagnostic assertions from knowledge base",
    },
    ReportField {
        name: "prognostic_assertions",
        aliases: &["prognostic_assertions", "prognostic", "pr_assertions"],
        default: "",
        required: false,
        list: true,
        description: "Prognostic assertions from knowledge base",
    },
    ReportField {
        name: "therapeutic_assertions",
        aliases: &[
            "therapeutic_assertions",
            "therapeutic",
            "tx_assertions",
            "treatment",
            "therapeutic_implications",
        ],
        default: "",
        required: false,
        list: true,
        description: "Therapeutic assertions from knowledge base",
    },
    ReportField {
        name: "trial_ids",
        aliases: &["trial_ids", "clinical_trials", "trials", "trial_id"],
        default: "",
        required: false,
        list: true,
        description: "Clinical trial identifiers",
    },
    ReportField {
        name: "diseases",
        aliases: &["diseases", "disease", "conditions", "indication"],
        default: "",
        required: false,
        list: true,
        description: "Associated diseases and conditions",
    },
    ReportField {
        name: "kb_version",
        aliases: &["kb_version", "knowledge_base", "database_version"],
        default: "",
        required: false,
        list: false,
        description: "Knowledge base version used",
    },
];

/// Columns appended to every record after the canonical fields.
pub const METADATA_COLUMNS: [&str; 3] = ["source_file", "record_id", "extraction_timestamp"];

/// Assertion families recognized in auxiliary `kb_results.X` style columns,
/// mapped to the list field they fold into. Checked in order.
pub const ASSERTION_FAMILIES: [(&[&str], &str); 5] = [
    (&["diagnostic"], "diagnostic_assertions"),
    (&["prognostic"], "prognostic_assertions"),
    (&["therapeutic", "treatment"], "therapeutic_assertions"),
    (&["trial"], "trial_ids"),
    (&["disease", "condition"], "diseases"),
];

/// Map an auxiliary result type (`diagnostic_summary`) to its list field.
pub fn assertion_family(result_type: &str) -> Option<&'static str> {
    let lowered = result_type.to_lowercase();
    ASSERTION_FAMILIES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(_, field)| *field)
}

/// Markdown description of the final report (`varimpact docs report`).
pub fn report_fields_markdown() -> String {
    let mut doc = String::from("# Final Report\n\n");
    doc.push_str(
        "One row per extracted record, merged from every knowledge base's CSV output.\n\n## Report Fields\n\n",
    );

    for field in &REPORT_FIELDS {
        let required = if field.required { " *(Required)*" } else { "" };
        doc.push_str(&format!("### {}{}\n", field.name, required));
        doc.push_str(&format!("- **Description**: {}\n", field.description));
        doc.push_str(&format!("- **Source Columns**: {}\n", field.aliases.join(", ")));
        if !field.default.is_empty() {
            doc.push_str(&format!("- **Default Value**: {}\n", field.default));
        }
        if field.list {
            doc.push_str("- **List field**: values are merged and separated by `; `\n");
        }
        doc.push('\n');
    }

    doc.push_str("## Additional Fields\n\n");
    doc.push_str("- **source_file**: Name of the source CSV file\n");
    doc.push_str("- **record_id**: Sequential identifier (`record_0001`, ...)\n");
    doc.push_str("- **extraction_timestamp**: When the record was extracted\n\n");

    doc.push_str("## Processing Notes\n\n");
    doc.push_str("- Column names are matched case-insensitively, first alias wins\n");
    doc.push_str(
        "- Columns named `kb_results.X`, `knowledge_base.X`, `results.X` or `assertions.X` are folded into the matching assertion field\n",
    );
    doc.push_str("- `final_report_by_variant.csv` merges rows of the same gene and variant\n");
    doc
}
