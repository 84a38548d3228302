//! Analysis configuration.
//!
//! Every constant the analysis depends on (sheet name, behavioral code columns,
//! variant prefix, significance threshold, display labels) lives here. The
//! defaults reproduce the original study; a JSON file can override any subset
//! of them and command-line flags override the file.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_INPUT: &str = "clean_data_cases_CoGSI.xlsx";
pub const DEFAULT_SHEET: &str = "Sheet3";
pub const DEFAULT_VARIANT_PREFIX: &str = "rs";
pub const DEFAULT_THRESHOLD: f64 = 0.05;

pub const PHYSICAL_ACTIVITY: &str = "Physical Activity Level code";
pub const OUTSIDE_FOOD: &str = "Outside food Code";
pub const STRESS_PROFILE: &str = "Strees profile";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Significance threshold must be in (0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("At least one behavioral code column is required")]
    NoBehavioralCodes,

    #[error("Variant column prefix must not be empty")]
    EmptyPrefix,
}

/// Which columns the significance test is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PValueMode {
    /// One test per indicator column, same rows as the correlation table.
    #[default]
    Indicator,
    /// One test per original variant column (categories taken as numbers);
    /// indicator rows inherit the p-value of their source variant.
    Variant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sheet_name: String,
    pub behavioral_codes: Vec<String>,
    pub variant_prefix: String,
    pub significance_threshold: f64,
    pub p_value_mode: PValueMode,
    /// Behavioral code -> human readable label used on the heatmap.
    pub display_labels: IndexMap<String, String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let mut display_labels = IndexMap::new();
        display_labels.insert(PHYSICAL_ACTIVITY.to_string(), "Physical Activity".to_string());
        display_labels.insert(OUTSIDE_FOOD.to_string(), "Unhealthy Diet".to_string());

        AnalysisConfig {
            sheet_name: DEFAULT_SHEET.to_string(),
            behavioral_codes: vec![
                PHYSICAL_ACTIVITY.to_string(),
                OUTSIDE_FOOD.to_string(),
                STRESS_PROFILE.to_string(),
            ],
            variant_prefix: DEFAULT_VARIANT_PREFIX.to_string(),
            significance_threshold: DEFAULT_THRESHOLD,
            p_value_mode: PValueMode::default(),
            display_labels,
        }
    }
}

impl AnalysisConfig {
    /// Checks the values a config file or flag could have broken.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.significance_threshold;
        if !(t > 0.0 && t <= 1.0) {
            return Err(ConfigError::InvalidThreshold(t));
        }
        if self.behavioral_codes.is_empty() {
            return Err(ConfigError::NoBehavioralCodes);
        }
        if self.variant_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        Ok(())
    }

    /// Heatmap label for a behavioral code; falls back to the column name.
    pub fn display_label<'a>(&'a self, code: &'a str) -> &'a str {
        self.display_labels
            .get(code)
            .map(String::as_str)
            .unwrap_or(code)
    }

    pub fn is_variant_column(&self, name: &str) -> bool {
        name.starts_with(&self.variant_prefix)
    }
}

/// Loads a config file. Fields missing from the file keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<AnalysisConfig, ConfigError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AnalysisConfig =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded config from {}: {:?}", path.display(), config);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_match_study_constants() {
        let config = AnalysisConfig::default();
        assert_eq!(config.sheet_name, "Sheet3");
        assert_eq!(config.variant_prefix, "rs");
        assert_eq!(config.significance_threshold, 0.05);
        assert_eq!(
            config.behavioral_codes,
            vec![
                "Physical Activity Level code",
                "Outside food Code",
                "Strees profile"
            ]
        );
        assert_eq!(config.display_label(PHYSICAL_ACTIVITY), "Physical Activity");
        assert_eq!(config.display_label(OUTSIDE_FOOD), "Unhealthy Diet");
        assert_eq!(config.display_label(STRESS_PROFILE), "Strees profile");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"significance_threshold": 0.01, "p_value_mode": "variant"}}"#
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.significance_threshold, 0.01);
        assert_eq!(config.p_value_mode, PValueMode::Variant);
        assert_eq!(config.sheet_name, DEFAULT_SHEET);
        assert_eq!(config.behavioral_codes.len(), 3);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"significance_threshold": 0.0}"#).unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidThreshold(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let err = load_config("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
