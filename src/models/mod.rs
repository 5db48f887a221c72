//! Data models shared across the pipeline.

mod variant;

pub use variant::{
    AnnotationResult, CoordinateKind, Coordinates, UnsupportedVariant, VariantInput,
};
