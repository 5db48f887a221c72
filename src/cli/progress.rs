//! Terminal rendering of pipeline status events.

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

use super::icons;
use crate::pipeline::{ListenerResult, PipelineStage, PipelineStatus, StatusListener};

const BAR_LENGTH: u64 = 100;

/// One progress bar per stage; a new stage finishes the previous bar and
/// prints a header line above the next one.
pub struct StageProgress {
    bar: ProgressBar,
    current: Mutex<Option<PipelineStage>>,
}

impl StageProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(BAR_LENGTH);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:30.cyan/blue}] {percent:>3}% {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓░"),
        );
        Self {
            bar,
            current: Mutex::new(None),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for StageProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusListener for StageProgress {
    fn on_status(&self, status: &PipelineStatus) -> ListenerResult {
        let mut current = self.current.lock().map_err(|e| e.to_string())?;

        if *current != Some(status.stage) {
            *current = Some(status.stage);
            self.bar.reset();
            self.bar
                .println(format!("{} {}", icons::stage(status.stage), stage_title(status.stage)));
        }

        if let Some(error) = &status.error {
            self.bar
                .println(format!("  {} {}", icons::outcome(false), error));
            return Ok(());
        }

        self.bar
            .set_position((status.progress * BAR_LENGTH as f64).round() as u64);
        self.bar.set_message(status.message.clone());
        if let Some(details) = &status.details {
            self.bar
                .println(format!("  {} {}", icons::detail(), details));
        }
        Ok(())
    }
}

fn stage_title(stage: PipelineStage) -> &'static str {
    match stage {
        PipelineStage::InputValidation => "Validating input",
        PipelineStage::AnnotationLookup => "Looking up coordinates",
        PipelineStage::VcfGeneration => "Generating VCF",
        PipelineStage::ReportStructureGeneration => "Generating report structure",
        PipelineStage::KbProcessing => "Processing knowledge bases",
        PipelineStage::FormatConversion => "Converting to CSV",
        PipelineStage::ReportExtraction => "Extracting final report",
        PipelineStage::Complete => "Done",
    }
}
