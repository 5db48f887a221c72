//! Pattern-based variant classification.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Category assigned to a variant notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantCategory {
    Substitution,
    Deletion,
    Insertion,
    CnvGain,
    CnvLoss,
    Splice,
    RnaFusion,
    DnaFusion,
    Complex,
}

impl VariantCategory {
    pub const ALL: [VariantCategory; 9] = [
        VariantCategory::Substitution,
        VariantCategory::Deletion,
        VariantCategory::Insertion,
        VariantCategory::CnvGain,
        VariantCategory::CnvLoss,
        VariantCategory::Splice,
        VariantCategory::RnaFusion,
        VariantCategory::DnaFusion,
        VariantCategory::Complex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VariantCategory::Substitution => "substitution",
            VariantCategory::Deletion => "deletion",
            VariantCategory::Insertion => "insertion",
            VariantCategory::CnvGain => "cnv_gain",
            VariantCategory::CnvLoss => "cnv_loss",
            VariantCategory::Splice => "splice",
            VariantCategory::RnaFusion => "rna_fusion",
            VariantCategory::DnaFusion => "dna_fusion",
            VariantCategory::Complex => "complex",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "substitution" => Some(VariantCategory::Substitution),
            "deletion" => Some(VariantCategory::Deletion),
            "insertion" => Some(VariantCategory::Insertion),
            "cnv_gain" => Some(VariantCategory::CnvGain),
            "cnv_loss" => Some(VariantCategory::CnvLoss),
            "splice" => Some(VariantCategory::Splice),
            "rna_fusion" => Some(VariantCategory::RnaFusion),
            "dna_fusion" => Some(VariantCategory::DnaFusion),
            "complex" => Some(VariantCategory::Complex),
            _ => None,
        }
    }

    /// Whether variants of this category can go through the annotator and
    /// into the VCF without hand-supplied coordinates.
    pub fn is_automatable(&self) -> bool {
        matches!(
            self,
            VariantCategory::Substitution | VariantCategory::Deletion | VariantCategory::Insertion
        )
    }

    /// Documentation template, `None` for [`VariantCategory::Complex`].
    pub fn template(&self) -> Option<&'static VariantTemplate> {
        TEMPLATES.iter().find(|t| t.category == *self)
    }

    /// Reason written to the unsupported report for this category.
    pub fn skip_reason(&self) -> &'static str {
        self.template()
            .map(|t| t.description)
            .unwrap_or("Unknown variant type")
    }

    /// Whether manual coordinates are needed. Unknown categories always need them.
    pub fn requires_coordinates(&self) -> bool {
        self.template().map(|t| t.requires_coordinates).unwrap_or(true)
    }
}

impl std::fmt::Display for VariantCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Describes how a category is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantTemplate {
    pub category: VariantCategory,
    pub example: &'static str,
    pub description: &'static str,
    pub automatable: bool,
    pub requires_coordinates: bool,
}

pub static TEMPLATES: [VariantTemplate; 8] = [
    VariantTemplate {
        category: VariantCategory::Substitution,
        example: "Standard substitution variants (p.A123T, c.123A>T)",
        description: "Single nucleotide or amino acid substitutions",
        automatable: true,
        requires_coordinates: false,
    },
    VariantTemplate {
        category: VariantCategory::Deletion,
        example: "Deletion variants (p.A123del, c.123delA)",
        description: "Small deletions",
        automatable: true,
        requires_coordinates: false,
    },
    VariantTemplate {
        category: VariantCategory::Insertion,
        example: "Insertion variants (p.A123_T124insV, c.123_124insA)",
        description: "Small insertions",
        automatable: true,
        requires_coordinates: false,
    },
    VariantTemplate {
        category: VariantCategory::CnvGain,
        example: "CNV gain/amplification",
        description: "Copy number gains - requires user-provided coordinates",
        automatable: false,
        requires_coordinates: true,
    },
    VariantTemplate {
        category: VariantCategory::CnvLoss,
        example: "CNV loss/deletion",
        description: "Copy number losses - requires user-provided coordinates",
        automatable: false,
        requires_coordinates: true,
    },
    VariantTemplate {
        category: VariantCategory::Splice,
        example: "Splice variants (exon skipping)",
        description: "Splicing alterations - requires user-provided breakpoints",
        automatable: false,
        requires_coordinates: true,
    },
    VariantTemplate {
        category: VariantCategory::RnaFusion,
        example: "RNA fusion events",
        description: "RNA transcript fusions - requires user-provided breakpoints per gene",
        automatable: false,
        requires_coordinates: true,
    },
    VariantTemplate {
        category: VariantCategory::DnaFusion,
        example: "DNA fusion events",
        description: "DNA rearrangements and fusions - requires user-provided breakpoints per gene",
        automatable: false,
        requires_coordinates: true,
    },
];

/// Ordered rules, evaluated against the lower-cased notation. First hit wins.
///
/// Sequence deletions require a position before the trailing `del`
/// (`p.e746_a750del`, `c.123dela`); a `del` with no position in front of it
/// falls through to [`VariantCategory::CnvLoss`].
static RULES: LazyLock<Vec<(VariantCategory, Vec<Regex>)>> = LazyLock::new(|| {
    fn rule(category: VariantCategory, patterns: &[&str]) -> (VariantCategory, Vec<Regex>) {
        let compiled = patterns
            .iter()
            .map(|p| Regex::new(p).expect("classification pattern should compile"))
            .collect();
        (category, compiled)
    }

    vec![
        rule(
            VariantCategory::Substitution,
            &[
                r"^p\.[a-z]\d+(?:[a-z]|\*)$",
                r"^[a-z]\d+(?:[a-z]|\*)$",
                r"c\.\d+[acgt]+>[acgt]+",
                r"g\.\d+[acgt]+>[acgt]+",
            ],
        ),
        rule(
            VariantCategory::Deletion,
            &[
                r"p\.[a-z]\d+(?:_[a-z]\d+)?del$",
                r"[cg]\.\d+(?:_\d+)?del[acgt]*$",
                r"\d+del[acgt]*$",
            ],
        ),
        rule(
            VariantCategory::Insertion,
            &[
                r"p\.[a-z]\d+_[a-z]\d+ins",
                r"[cg]\.\d+_\d+ins",
            ],
        ),
        rule(
            VariantCategory::CnvGain,
            &["gain", "amplification", "duplication"],
        ),
        rule(VariantCategory::CnvLoss, &["loss", "deletion", r"del$"]),
        rule(
            VariantCategory::Splice,
            &["splice", r"exon.*skip", "intron", r"c\.\d+[+-]\d+"],
        ),
        rule(
            VariantCategory::RnaFusion,
            &[r"rna.*fusion", r"transcript.*fusion"],
        ),
        rule(
            VariantCategory::DnaFusion,
            &[r"dna.*fusion", r"chromosomal.*rearrangement"],
        ),
    ]
});

/// Classify a notation string.
///
/// Total: every input, including the empty string, yields exactly one
/// category and anything no rule recognizes is [`VariantCategory::Complex`].
pub fn classify(notation: &str) -> VariantCategory {
    let lowered = notation.trim().to_lowercase();

    RULES
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| p.is_match(&lowered)))
        .map(|(category, _)| *category)
        .unwrap_or(VariantCategory::Complex)
}

/// Render the supported/unsupported category documentation as Markdown.
pub fn variant_templates_markdown() -> String {
    let mut doc = String::from("# Variant Type Support\n\n");

    doc.push_str("## Supported Variant Types (Automated Processing)\n\n");
    for template in TEMPLATES.iter().filter(|t| t.automatable) {
        doc.push_str(&format!(
            "- **{}**: {}\n  - Pattern: {}\n  - Status: Fully automated\n",
            title_case(template.category.as_str()),
            template.description,
            template.example
        ));
    }

    doc.push_str("\n## Unsupported Variant Types (Manual Coordinates Required)\n\n");
    for template in TEMPLATES.iter().filter(|t| !t.automatable) {
        doc.push_str(&format!(
            "- **{}**: {}\n  - Pattern: {}\n  - Status: Requires user-provided coordinates/breakpoints\n",
            title_case(template.category.as_str()),
            template.description,
            template.example
        ));
    }

    doc.push_str("\n## Usage Notes\n\n");
    doc.push_str("- Supported variants are resolved by the annotator and written to the VCF.\n");
    doc.push_str(
        "- Unsupported variants are listed in unsupported_variants.csv with the reason they were skipped.\n",
    );
    doc
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
