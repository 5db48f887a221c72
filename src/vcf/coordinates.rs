//! Coordinate extraction from annotator output.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{CoordinateKind, Coordinates};

static GENOMIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z0-9_.]+):g\.(\d+)(?:_\d+)?([A-Za-z>]+)")
        .expect("genomic pattern should compile")
});

static CODING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:([A-Za-z0-9_.]+):)?c\.([+-]?\d+(?:[+-]\d+)?)(?:_[+-]?\d+(?:[+-]\d+)?)?([A-Za-z>]+)")
        .expect("coding pattern should compile")
});

static PROTEIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"p\.\(?([A-Za-z*]+\d+[A-Za-z0-9*_]*)\)?").expect("protein pattern should compile")
});

static TRANSCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b((?:N[MR]|X[MR])_\d+(?:\.\d+)?|ENST\d+(?:\.\d+)?)\b")
        .expect("transcript pattern should compile")
});

/// Reason coordinates cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("No coordinates found")]
    NotFound,
    #[error("Missing chromosome or position")]
    MissingFields,
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
}

/// Extract coordinates from annotator output text.
///
/// The genomic, coding and protein patterns are tried independently against
/// the whole text; a pattern that does not match leaves its fields unset.
/// `kind` records the most specific layer that matched.
pub fn parse(text: &str) -> Coordinates {
    let mut coords = Coordinates::default();

    if let Some(caps) = GENOMIC.captures(text) {
        coords.chrom = Some(caps[1].to_string());
        coords.pos = Some(caps[2].to_string());
        coords.change = Some(caps[3].to_string());
    }

    if let Some(caps) = CODING.captures(text) {
        coords.coding_pos = Some(caps[2].to_string());
        coords.coding_change = Some(caps[3].to_string());
        coords.transcript = caps.get(1).map(|m| m.as_str().to_string());
    }

    if let Some(caps) = PROTEIN.captures(text) {
        coords.protein_change = Some(format!("p.{}", &caps[1]));
    }

    if coords.transcript.is_none() {
        coords.transcript = TRANSCRIPT.captures(text).map(|c| c[1].to_string());
    }

    coords.kind = if coords.chrom.is_some() {
        Some(CoordinateKind::Genomic)
    } else if coords.coding_pos.is_some() {
        Some(CoordinateKind::Coding)
    } else if coords.protein_change.is_some() {
        Some(CoordinateKind::Protein)
    } else if coords.transcript.is_some() {
        Some(CoordinateKind::Transcript)
    } else {
        None
    };

    coords
}

/// Every distinct transcript accession in `text`, in order of appearance.
pub fn transcripts(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in TRANSCRIPT.captures_iter(text) {
        let accession = &caps[1];
        if !found.iter().any(|t| t == accession) {
            found.push(accession.to_string());
        }
    }
    found
}

/// Check that coordinates can be placed in a VCF.
pub fn validate(coords: &Coordinates) -> Result<(), CoordinateError> {
    if coords.is_empty() {
        return Err(CoordinateError::NotFound);
    }

    let (Some(chrom), Some(pos)) = (coords.chrom.as_deref(), coords.pos.as_deref()) else {
        return Err(CoordinateError::MissingFields);
    };
    if chrom.is_empty() || pos.is_empty() {
        return Err(CoordinateError::MissingFields);
    }

    if pos.parse::<u64>().is_err() {
        return Err(CoordinateError::InvalidPosition(pos.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRAF_OUTPUT: &str = "chr7:g.140453136A>T  NM_004333.4:c.1799T>A  NP_004324.2:p.V600E";

    #[test]
    fn test_parse_all_layers() {
        let coords = parse(BRAF_OUTPUT);
        assert_eq!(coords.chrom.as_deref(), Some("chr7"));
        assert_eq!(coords.pos.as_deref(), Some("140453136"));
        assert_eq!(coords.change.as_deref(), Some("A>T"));
        assert_eq!(coords.coding_pos.as_deref(), Some("1799"));
        assert_eq!(coords.coding_change.as_deref(), Some("T>A"));
        assert_eq!(coords.protein_change.as_deref(), Some("p.V600E"));
        assert_eq!(coords.transcript.as_deref(), Some("NM_004333.4"));
        assert_eq!(coords.kind, Some(CoordinateKind::Genomic));
        assert!(validate(&coords).is_ok());
    }

    #[test]
    fn test_kind_coding_only() {
        let coords = parse("NM_004333.4:c.1799T>A");
        assert_eq!(coords.kind, Some(CoordinateKind::Coding));
        assert_eq!(coords.transcript.as_deref(), Some("NM_004333.4"));
        assert_eq!(validate(&coords), Err(CoordinateError::MissingFields));
    }

    #[test]
    fn test_kind_protein_only() {
        let coords = parse("NP_004324.2:p.V600E");
        assert_eq!(coords.kind, Some(CoordinateKind::Protein));
        assert_eq!(coords.protein_change.as_deref(), Some("p.V600E"));
    }

    #[test]
    fn test_kind_transcript_only() {
        let coords = parse("BRAF\tNM_004333.4 (protein_coding)\tno coordinates");
        assert_eq!(coords.kind, Some(CoordinateKind::Transcript));
        assert!(coords.is_empty());
    }

    #[test]
    fn test_transcripts_in_order() {
        let text = "NM_004333.4:c.1799T>A\nENST00000288602.11:c.1799T>A\nNM_004333.4 (protein_coding)";
        assert_eq!(transcripts(text), vec!["NM_004333.4", "ENST00000288602.11"]);
        assert!(transcripts("nothing here").is_empty());
    }

    #[test]
    fn test_parse_tabular_output() {
        let text = "input\ttranscript\tgene\tstrand\tcoordinates(gDNA/cDNA/protein)\n\
                    BRAF:p.V600E\tNM_004333.4 (protein_coding)\tBRAF\t-\tchr7:g.140453136A>T/c.1799T>A/p.V600E";
        let coords = parse(text);
        assert_eq!(coords.chrom.as_deref(), Some("chr7"));
        assert_eq!(coords.transcript.as_deref(), Some("NM_004333.4"));
    }

    #[test]
    fn test_parse_deletion() {
        let coords = parse("chr13:g.32914438delT");
        assert_eq!(coords.pos.as_deref(), Some("32914438"));
        assert_eq!(coords.change.as_deref(), Some("delT"));

        let coords = parse("chr7:g.55242465_55242479del");
        assert_eq!(coords.pos.as_deref(), Some("55242465"));
        assert_eq!(coords.change.as_deref(), Some("del"));
    }

    #[test]
    fn test_parse_nothing() {
        let coords = parse("no valid transcripts found");
        assert!(coords.is_empty());
        assert_eq!(coords.kind, None);
        assert_eq!(validate(&coords), Err(CoordinateError::NotFound));
    }

    #[test]
    fn test_validate_rejects_non_numeric_position() {
        let coords = Coordinates {
            chrom: Some("chr7".into()),
            pos: Some("x".into()),
            ..Default::default()
        };
        assert_eq!(
            validate(&coords),
            Err(CoordinateError::InvalidPosition("x".into()))
        );
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let coords = Coordinates {
            protein_change: Some("p.V600E".into()),
            ..Default::default()
        };
        assert_eq!(validate(&coords), Err(CoordinateError::MissingFields));
        assert!(validate(&Coordinates::default()).is_err());
    }
}
