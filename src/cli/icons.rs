//! Markers for stage headers, classified variants and tool checks.

use console::{style, StyledObject};

use crate::notation::VariantCategory;
use crate::pipeline::PipelineStage;

/// Marker in front of a stage header.
pub fn stage(stage: PipelineStage) -> StyledObject<&'static str> {
    match stage {
        PipelineStage::InputValidation => style("◇").cyan(),
        PipelineStage::AnnotationLookup | PipelineStage::VcfGeneration => style("◆").cyan(),
        PipelineStage::ReportStructureGeneration
        | PipelineStage::KbProcessing
        | PipelineStage::FormatConversion => style("▸").blue(),
        PipelineStage::ReportExtraction => style("▤").blue(),
        PipelineStage::Complete => style("✓").green().bold(),
    }
}

/// How a classified variant will be handled: automated, needs manual
/// coordinates, or unrecognized.
pub fn category(category: VariantCategory) -> StyledObject<&'static str> {
    if category.is_automatable() {
        style("✓").green()
    } else if category == VariantCategory::Complex {
        style("?").magenta()
    } else {
        style("!").yellow()
    }
}

/// Run or tool outcome.
pub fn outcome(ok: bool) -> StyledObject<&'static str> {
    if ok {
        style("✓").green()
    } else {
        style("✗").red()
    }
}

pub fn warning() -> StyledObject<&'static str> {
    style("!").yellow()
}

/// Indented detail lines.
pub fn detail() -> StyledObject<&'static str> {
    style("→").dim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::InputKind;

    #[test]
    fn test_category_markers() {
        assert!(category(VariantCategory::Substitution).to_string().contains("✓"));
        assert!(category(VariantCategory::CnvGain).to_string().contains("!"));
        assert!(category(VariantCategory::Complex).to_string().contains("?"));
    }

    #[test]
    fn test_every_stage_has_a_marker() {
        let mut stage_tag = Some(PipelineStage::InputValidation);
        while let Some(current) = stage_tag {
            assert!(!stage(current).to_string().is_empty());
            stage_tag = current.next(InputKind::Variants, true);
        }
        assert!(stage(PipelineStage::Complete).to_string().contains("✓"));
        assert!(outcome(false).to_string().contains("✗"));
    }
}
