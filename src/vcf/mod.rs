//! VCF construction from annotator output.
//!
//! [`coordinates`] pulls genomic/coding/protein coordinates out of annotator
//! text, [`builder`] turns resolved annotations into VCF lines and writes the
//! variant file plus the unsupported-variant report, and [`reader`] reads a
//! VCF back for pre-built input and round-trip checks.

pub mod builder;
pub mod coordinates;
pub mod reader;

pub use builder::{
    build_header, build_line, derive_ref_alt, write_unsupported_report, write_variant_file,
    VcfWriteSummary,
};
pub use coordinates::{parse, transcripts, validate, CoordinateError};
pub use reader::{inspect, VcfRecord, VcfSummary};

use thiserror::Error;

/// Errors from reading or writing VCF-related files.
#[derive(Debug, Error)]
pub enum VcfError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Line {line}: expected at least 8 tab-separated columns, found {columns}")]
    Malformed { line: usize, columns: usize },
}

impl VcfError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
