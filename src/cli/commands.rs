//! Command implementations.

use std::path::PathBuf;
use std::sync::Arc;

use console::style;

use super::icons;
use super::progress::StageProgress;
use crate::config::Config;
use crate::notation::{classify, normalize};
use crate::pipeline::{
    parse_variant_arg, ArtifactKind, InputKind, Pipeline, PipelineResult, PipelineStage,
    VariantSource,
};

pub struct RunOptions {
    pub variants: Vec<String>,
    pub csv: Option<PathBuf>,
    pub vcf: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub workers: Option<usize>,
    pub builtin_converter: bool,
    pub json: bool,
}

impl RunOptions {
    fn source(&self) -> anyhow::Result<VariantSource> {
        if let Some(path) = &self.csv {
            return Ok(VariantSource::Csv(path.clone()));
        }
        if let Some(path) = &self.vcf {
            return Ok(VariantSource::Vcf(path.clone()));
        }
        if self.variants.is_empty() {
            anyhow::bail!("Provide variants with --variant GENE:CHANGE, --csv FILE or --vcf FILE");
        }
        let variants = self
            .variants
            .iter()
            .map(|arg| parse_variant_arg(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(VariantSource::Variants(variants))
    }
}

/// Run the pipeline and print a summary.
pub async fn cmd_run(mut config: Config, options: RunOptions) -> anyhow::Result<()> {
    let source = options.source()?;

    if let Some(dir) = options.output_dir.clone() {
        config.paths.output_dir = dir;
    }
    if let Some(workers) = options.workers {
        config.processing.max_workers = workers;
    }
    if options.builtin_converter {
        config.conversion.builtin = true;
    }
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!(
        "{} Running pipeline on {}",
        icons::stage(PipelineStage::InputValidation),
        source.describe()
    );

    let progress = Arc::new(StageProgress::new());
    let pipeline = Pipeline::new(config).with_listener(progress.clone());
    let result = pipeline.run(source).await;
    progress.finish();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_summary(&result);
    }

    if !result.success {
        anyhow::bail!("Pipeline failed");
    }
    Ok(())
}

fn print_summary(result: &PipelineResult) {
    println!();
    let verb = if result.success {
        "completed in"
    } else {
        "failed after"
    };
    println!(
        "{} Pipeline {} {:.1}s",
        icons::outcome(result.success),
        verb,
        result.execution_time
    );

    if let Some(dir) = &result.run_directory {
        println!("  {} Run directory: {}", icons::detail(), dir.display());
    }

    let metrics = &result.metrics;
    println!(
        "  {} Variants: {} in, {} annotated, {} in VCF, {} unsupported",
        icons::detail(),
        metrics.variants_total,
        metrics.annotations_succeeded,
        metrics.vcf_variants_written,
        metrics.unsupported_variants
    );
    println!(
        "  {} Knowledge bases: {} succeeded, {} failed",
        icons::detail(),
        metrics.kb_succeeded,
        metrics.kb_failed
    );

    if let Some(report) = &result.final_report_path {
        println!("  {} Final report: {}", icons::detail(), report.display());
    }
    if let Some(artifact) = result.artifact(ArtifactKind::UnsupportedReport) {
        for path in artifact.paths() {
            println!("  {} Unsupported variants: {}", icons::detail(), path.display());
        }
    }

    for warning in &result.warnings {
        println!("{} {}", icons::warning(), warning);
    }
    for err in &result.errors {
        println!("{} {}", icons::outcome(false), style(err).red());
    }
}

/// Report the setup state of every external tool.
pub fn cmd_check(config: &Config) -> anyhow::Result<()> {
    let pipeline = Pipeline::new(config.clone());
    let mut failures = 0;

    for check in pipeline.check_tools(InputKind::Variants) {
        match &check.outcome {
            Ok(warnings) => {
                println!(
                    "{} {} ({})",
                    icons::outcome(true),
                    check.tool,
                    check.executable.display()
                );
                for warning in warnings {
                    println!("  {} {}", icons::warning(), warning);
                }
            }
            Err(message) => {
                failures += 1;
                println!("{} {}", icons::outcome(false), message);
                println!("  {} {}", icons::detail(), check.hint);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} tool(s) not ready", failures);
    }
    Ok(())
}

pub fn cmd_classify(notations: &[String]) {
    for raw in notations {
        let normalized = normalize(raw);
        let category = classify(&normalized);
        println!(
            "{} {} → {} ({})",
            icons::category(category),
            raw,
            normalized,
            category
        );
        if !category.is_automatable() {
            println!("  {} {}", icons::detail(), category.skip_reason());
        }
    }
}

pub fn cmd_normalize(notations: &[String]) {
    for raw in notations {
        println!("{}\t{}", raw, normalize(raw));
    }
}

pub fn cmd_config(config: &Config) -> anyhow::Result<()> {
    if let Some(path) = &config.source_path {
        eprintln!("{} Loaded from {}", icons::detail(), path.display());
    }
    print!("{}", config.to_toml().map_err(|e| anyhow::anyhow!(e))?);
    Ok(())
}
