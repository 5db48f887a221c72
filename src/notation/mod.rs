//! Protein notation cleanup and variant classification.
//!
//! User-entered protein changes arrive in many shapes (`p.(Val600Glu)`,
//! `V600E`, `p.Gly12fs*7`). [`normalize`] reduces them to a compact
//! one-letter form before they are handed to the annotator or classified.

mod classify;

pub use classify::{classify, variant_templates_markdown, VariantCategory, VariantTemplate};

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Three-letter amino-acid codes and their one-letter forms.
///
/// `Ter` and `Stop` both map to the stop codon `*`.
pub const AMINO_ACIDS: &[(&str, &str)] = &[
    ("Ala", "A"),
    ("Arg", "R"),
    ("Asn", "N"),
    ("Asp", "D"),
    ("Cys", "C"),
    ("Glu", "E"),
    ("Gln", "Q"),
    ("Gly", "G"),
    ("His", "H"),
    ("Ile", "I"),
    ("Leu", "L"),
    ("Lys", "K"),
    ("Met", "M"),
    ("Phe", "F"),
    ("Pro", "P"),
    ("Ser", "S"),
    ("Thr", "T"),
    ("Trp", "W"),
    ("Tyr", "Y"),
    ("Val", "V"),
    ("Ter", "*"),
    ("Stop", "*"),
];

static CODE_LOOKUP: LazyLock<HashMap<String, &'static str>> = LazyLock::new(|| {
    AMINO_ACIDS
        .iter()
        .map(|(code, letter)| (code.to_ascii_lowercase(), *letter))
        .collect()
});

static LETTER_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+").expect("letter run pattern should compile"));

static FRAMESHIFT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)fs\*?\d*|frameshift").expect("frameshift pattern should compile")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern should compile"));

/// Canonicalize raw protein notation.
///
/// Parentheses are stripped, three-letter residue codes become one-letter
/// codes, frameshift suffixes collapse to `fs` and all whitespace is removed.
/// Never fails; an empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    let text: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '(' && *c != ')')
        .collect();

    let text = LETTER_RUN.replace_all(&text, |caps: &regex::Captures| replace_codes(&caps[0]));
    let text = FRAMESHIFT.replace_all(&text, "fs");
    WHITESPACE.replace_all(&text, "").into_owned()
}

/// Residue codes are bounded by non-letters, so digits count as a boundary
/// (`Val600Glu`). A run made only of codes (`GluVal`, `VALTER`) is replaced
/// whole; otherwise each capitalized segment is checked on its own
/// (`delinsGlu` keeps `delins`).
fn replace_codes(run: &str) -> String {
    if let Some(letters) = split_codes(run) {
        return letters;
    }

    camel_segments(run)
        .into_iter()
        .map(|segment| {
            CODE_LOOKUP
                .get(&segment.to_ascii_lowercase())
                .map(|letter| letter.to_string())
                .unwrap_or_else(|| segment.to_string())
        })
        .collect()
}

/// Parse a letter run as a concatenation of residue codes.
fn split_codes(run: &str) -> Option<String> {
    let lower = run.to_ascii_lowercase();
    let mut rest = lower.as_str();
    let mut out = String::new();

    while !rest.is_empty() {
        let (len, letter) = [4usize, 3]
            .iter()
            .filter(|len| rest.len() >= **len)
            .find_map(|len| CODE_LOOKUP.get(&rest[..*len]).map(|l| (*len, *l)))?;
        out.push_str(letter);
        rest = &rest[len..];
    }

    Some(out)
}

/// Split `delinsGluVal` into `delins`, `Glu`, `Val`.
fn camel_segments(run: &str) -> Vec<&str> {
    let bytes = run.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;

    for i in 1..bytes.len() {
        if bytes[i].is_ascii_uppercase() && bytes[i - 1].is_ascii_lowercase() {
            segments.push(&run[start..i]);
            start = i;
        }
    }
    segments.push(&run[start..]);
    segments
}
