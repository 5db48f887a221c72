//! varimpact - variant impact assessment pipeline.
//!
//! Normalizes user-entered protein variants, resolves them to genomic
//! coordinates with an external annotator, writes a VCF and drives the
//! downstream report tools across several knowledge bases before merging
//! their output into one report.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod notation;
pub mod pipeline;
pub mod report;
pub mod tools;
pub mod vcf;

pub use config::Config;
pub use error::PipelineError;
pub use pipeline::{Pipeline, PipelineResult, PipelineStage, PipelineStatus, VariantSource};
