pub mod report;

pub use report::generate_report;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AnalysisConfig, ConfigError, PValueMode};
use crate::encoding::one_hot_encode;
use crate::filter::CombinedTable;
use crate::io::{load_table, write_combined_table, write_json, LoadError};
use crate::preprocess::{preprocess, PreprocessError};
use crate::stats::{correlation_table, p_value_table, StatsError};
use crate::table::DataTable;
use crate::visualization::{HeatmapData, VisualizationError, Visualizer};

pub const TABLE_FILE: &str = "significant_correlations.csv";
pub const HEATMAP_FILE: &str = "significant_correlations_heatmap.svg";
pub const SUMMARY_FILE: &str = "analysis_summary.json";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error(transparent)]
    Visualization(#[from] VisualizationError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Counts and settings describing one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub input: Option<PathBuf>,
    pub sheet_name: String,
    pub rows_loaded: usize,
    pub rows_kept: usize,
    pub variant_columns: usize,
    pub indicator_columns: usize,
    pub significance_threshold: f64,
    pub p_value_mode: PValueMode,
    pub significant_indicators: usize,
    pub processing_time_seconds: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub summary: AnalysisSummary,
    /// Every indicator column, significant or not.
    pub combined: CombinedTable,
    pub significant: CombinedTable,
}

/// Load -> clean -> encode -> correlate -> test -> filter.
pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(AnalysisPipeline { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs the analysis on the configured sheet of `input`.
    pub fn run_file(&self, input: impl AsRef<Path>) -> Result<AnalysisOutcome, PipelineError> {
        let input = input.as_ref();
        info!(
            "Reading sheet '{}' from {}",
            self.config.sheet_name,
            input.display()
        );
        let table = load_table(input, &self.config.sheet_name)?;
        let mut outcome = self.run_table(&table)?;
        outcome.summary.input = Some(input.to_path_buf());
        Ok(outcome)
    }

    /// Runs the analysis on an already loaded table.
    pub fn run_table(&self, table: &DataTable) -> Result<AnalysisOutcome, PipelineError> {
        let start_time = Instant::now();
        let config = &self.config;

        let cleaned = preprocess(table, config)?;
        let encoded = one_hot_encode(&cleaned);
        let correlations = correlation_table(&cleaned, &encoded)?;
        let p_values = p_value_table(&cleaned, &encoded, config.p_value_mode)?;

        let combined = CombinedTable::combine(&encoded.columns, &correlations, &p_values);
        let significant = combined.filter_significant(config.significance_threshold);

        let summary = AnalysisSummary {
            input: None,
            sheet_name: config.sheet_name.clone(),
            rows_loaded: table.n_rows(),
            rows_kept: cleaned.n_rows(),
            variant_columns: cleaned.variant_columns().len(),
            indicator_columns: encoded.n_indicators(),
            significance_threshold: config.significance_threshold,
            p_value_mode: config.p_value_mode,
            significant_indicators: significant.rows.len(),
            processing_time_seconds: start_time.elapsed().as_secs_f64(),
        };
        info!(
            "Analysis complete: {} significant indicator columns in {:.3}s",
            summary.significant_indicators, summary.processing_time_seconds
        );

        Ok(AnalysisOutcome {
            summary,
            combined,
            significant,
        })
    }

    /// Writes the significant table, the run summary and (optionally) the
    /// heatmap into `output_dir`. Returns the written paths.
    pub fn write_outputs(
        &self,
        outcome: &AnalysisOutcome,
        output_dir: impl AsRef<Path>,
        render_heatmap: bool,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;
        let mut written = Vec::new();

        let table_path = output_dir.join(TABLE_FILE);
        write_combined_table(&outcome.significant, &table_path)?;
        written.push(table_path);

        let summary_path = output_dir.join(SUMMARY_FILE);
        write_json(outcome, &summary_path)?;
        written.push(summary_path);

        if render_heatmap {
            let data = HeatmapData::from_significant(&outcome.significant, &self.config);
            let visualizer = Visualizer::new(output_dir)?;
            written.push(visualizer.render_heatmap(&data, HEATMAP_FILE)?);
        }

        Ok(written)
    }
}
