//! Command-line interface.

mod commands;
mod icons;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "varimpact")]
#[command(about = "Variant impact assessment pipeline")]
#[command(version)]
pub struct Cli {
    /// Config file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "VARIMPACT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline
    Run {
        /// Variant as GENE:CHANGE (repeatable)
        #[arg(long = "variant", value_name = "GENE:CHANGE", conflicts_with_all = ["csv", "vcf"])]
        variants: Vec<String>,
        /// CSV file of variants
        #[arg(long, conflicts_with = "vcf")]
        csv: Option<PathBuf>,
        /// Pre-built VCF, skips annotation
        #[arg(long)]
        vcf: Option<PathBuf>,
        /// Directory run directories are created under
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Concurrent external invocations
        #[arg(short, long)]
        workers: Option<usize>,
        /// Convert knowledge-base JSON in-process instead of running the converter script
        #[arg(long)]
        builtin_converter: bool,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that every external tool is configured and usable
    Check,

    /// Classify variant notations
    Classify {
        /// Protein change notations
        #[arg(required = true)]
        notations: Vec<String>,
    },

    /// Normalize protein change notations
    Normalize {
        #[arg(required = true)]
        notations: Vec<String>,
    },

    /// Print documentation
    Docs {
        #[command(subcommand)]
        topic: DocsTopic,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Subcommand)]
enum DocsTopic {
    /// Supported and unsupported variant types
    Variants,
    /// Final report fields
    Report,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    match cli.command {
        Commands::Run {
            variants,
            csv,
            vcf,
            output_dir,
            workers,
            builtin_converter,
            json,
        } => {
            let options = commands::RunOptions {
                variants,
                csv,
                vcf,
                output_dir,
                workers,
                builtin_converter,
                json,
            };
            commands::cmd_run(config, options).await
        }
        Commands::Check => commands::cmd_check(&config),
        Commands::Classify { notations } => {
            commands::cmd_classify(&notations);
            Ok(())
        }
        Commands::Normalize { notations } => {
            commands::cmd_normalize(&notations);
            Ok(())
        }
        Commands::Docs { topic } => {
            match topic {
                DocsTopic::Variants => print!("{}", crate::notation::variant_templates_markdown()),
                DocsTopic::Report => print!("{}", crate::report::fields::report_fields_markdown()),
            }
            Ok(())
        }
        Commands::Config => commands::cmd_config(&config),
    }
}
