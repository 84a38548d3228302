use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itertools::Itertools;
use log::info;

use crate::config::{load_config, AnalysisConfig, PValueMode, DEFAULT_INPUT};
use crate::encoding::categories;
use crate::io::{list_sheets, load_table};
use crate::pipeline::{generate_report, AnalysisPipeline};
use crate::preprocess::preprocess;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Correlate variant genotypes with the behavioral codes
    Analyze {
        /// Input workbook (.xlsx/.xls/.ods) or delimited file (.csv/.tsv)
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Worksheet to read (workbooks only)
        #[arg(short, long)]
        sheet: Option<String>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Significance threshold for the p-value filter
        #[arg(long)]
        threshold: Option<f64>,

        /// Column name prefix identifying variant columns
        #[arg(long)]
        prefix: Option<String>,

        /// Compute p-values per indicator column or per variant
        #[arg(long, value_enum)]
        p_value_mode: Option<PValueMode>,

        /// Skip the heatmap
        #[arg(long)]
        no_plot: bool,
    },

    /// List sheets, selected columns and variant categories
    Columns {
        /// Input workbook or delimited file
        #[arg(short, long, default_value = DEFAULT_INPUT)]
        input: PathBuf,

        /// Worksheet to read (workbooks only)
        #[arg(short, long)]
        sheet: Option<String>,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn base_config(path: Option<&PathBuf>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => {
            load_config(path).with_context(|| format!("loading config {}", path.display()))
        }
        None => Ok(AnalysisConfig::default()),
    }
}

/// Main entry point for CLI
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze {
            input,
            sheet,
            config,
            output,
            threshold,
            prefix,
            p_value_mode,
            no_plot,
        } => {
            let mut config = base_config(config.as_ref())?;
            if let Some(sheet) = sheet {
                config.sheet_name = sheet;
            }
            if let Some(threshold) = threshold {
                config.significance_threshold = threshold;
            }
            if let Some(prefix) = prefix {
                config.variant_prefix = prefix;
            }
            if let Some(mode) = p_value_mode {
                config.p_value_mode = mode;
            }

            let pipeline = AnalysisPipeline::new(config)?;
            let outcome = pipeline
                .run_file(&input)
                .with_context(|| format!("analyzing {}", input.display()))?;
            let written = pipeline
                .write_outputs(&outcome, &output, !no_plot)
                .with_context(|| format!("writing results to {}", output.display()))?;

            println!("{}", generate_report(&outcome, pipeline.config()));
            for path in written {
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
        Commands::Columns {
            input,
            sheet,
            config,
        } => {
            let mut config = base_config(config.as_ref())?;
            if let Some(sheet) = sheet {
                config.sheet_name = sheet;
            }

            let sheets = list_sheets(&input)?;
            if !sheets.is_empty() {
                println!("Sheets: {}", sheets.iter().join(", "));
            }

            let table = load_table(&input, &config.sheet_name)
                .with_context(|| format!("reading {}", input.display()))?;
            let cleaned = preprocess(&table, &config)?;
            info!("{} of {} rows complete", cleaned.n_rows(), table.n_rows());

            let dropped = cleaned.dropped_rows();
            if !dropped.is_empty() {
                // data row 0 sits below the header on sheet row 2
                println!(
                    "Incomplete rows dropped ({}): sheet rows {}",
                    dropped.len(),
                    dropped.iter().map(|row| row + 2).join(", ")
                );
            }

            println!("Behavioral codes:");
            for code in cleaned.code_columns() {
                println!("  {} ({})", code, config.display_label(code));
            }

            println!("Variant columns ({}):", cleaned.variant_columns().len());
            for variant in cleaned.variant_columns() {
                let labels = cleaned.variant_labels(variant).unwrap_or_default();
                let counts = labels.iter().counts();
                let summary = categories(&labels)
                    .iter()
                    .map(|category| {
                        let n = counts.get(category).copied().unwrap_or(0);
                        format!("{}={}", category, n)
                    })
                    .join(", ");
                println!("  {}: {}", variant, summary);
            }
            Ok(())
        }
    }
}
