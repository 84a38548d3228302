pub mod plotter;

pub use plotter::{Visualizer, VisualizationError};

use ndarray::Array2;

use crate::config::AnalysisConfig;
use crate::filter::CombinedTable;

/// Correlation matrix laid out for display.
#[derive(Debug, Clone)]
pub struct HeatmapData {
    pub title: String,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    /// rows x columns correlation values
    pub values: Array2<f64>,
}

/// Display label of an indicator: the text before the first `_`.
pub fn base_variant_label(indicator: &str) -> &str {
    indicator
        .split_once('_')
        .map_or(indicator, |(base, _)| base)
}

impl HeatmapData {
    /// Builds the heatmap from the significant rows, keeping only the
    /// correlation columns. Rows from the same variant keep their shared
    /// base label.
    pub fn from_significant(table: &CombinedTable, config: &AnalysisConfig) -> Self {
        let row_labels = table
            .rows
            .iter()
            .map(|row| base_variant_label(&row.indicator).to_string())
            .collect();
        let column_labels = table
            .codes
            .iter()
            .map(|code| format!("Correlation with {}", config.display_label(code)))
            .collect();

        let mut values = Array2::<f64>::from_elem((table.rows.len(), table.codes.len()), f64::NAN);
        for (i, row) in table.rows.iter().enumerate() {
            for (j, &r) in row.correlations.iter().enumerate() {
                values[[i, j]] = r;
            }
        }

        HeatmapData {
            title: format!(
                "Significant Correlations (P-value < {})",
                config.significance_threshold
            ),
            row_labels,
            column_labels,
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_labels.is_empty()
    }

    /// Half-width of the color scale: the largest finite |r|, or 1.
    pub fn color_range(&self) -> f64 {
        let max = self
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        if max > 0.0 {
            max
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::config::{OUTSIDE_FOOD, PHYSICAL_ACTIVITY, STRESS_PROFILE};
    use crate::filter::CombinedRow;

    fn row(indicator: &str, correlations: Vec<f64>) -> CombinedRow {
        let (variant, category) = indicator.split_once('_').unwrap();
        CombinedRow {
            indicator: indicator.to_string(),
            variant: variant.to_string(),
            category: category.to_string(),
            p_values: vec![0.01; correlations.len()],
            adjusted_p_values: vec![0.02; correlations.len()],
            correlations,
        }
    }

    #[test]
    fn test_relabeling() {
        let table = CombinedTable {
            codes: vec![
                PHYSICAL_ACTIVITY.to_string(),
                OUTSIDE_FOOD.to_string(),
                STRESS_PROFILE.to_string(),
            ],
            rows: vec![
                row("rs1_AA", vec![0.7, -0.1, f64::NAN]),
                row("rs1_AG", vec![-0.7, 0.1, 0.0]),
                row("rs22_CT", vec![0.2, -0.45, 0.3]),
            ],
        };
        let data = HeatmapData::from_significant(&table, &AnalysisConfig::default());

        // duplicate base labels are kept
        assert_eq!(data.row_labels, vec!["rs1", "rs1", "rs22"]);
        assert_eq!(
            data.column_labels,
            vec![
                "Correlation with Physical Activity",
                "Correlation with Unhealthy Diet",
                "Correlation with Strees profile",
            ]
        );
        assert_eq!(data.title, "Significant Correlations (P-value < 0.05)");
        assert_eq!(data.values.dim(), (3, 3));
        assert_relative_eq!(data.color_range(), 0.7);
    }

    #[test]
    fn test_base_label_without_separator() {
        assert_eq!(base_variant_label("rs99"), "rs99");
        assert_eq!(base_variant_label("rs9_A_G"), "rs9");
    }

    #[test]
    fn test_empty_table() {
        let table = CombinedTable {
            codes: vec![PHYSICAL_ACTIVITY.to_string()],
            rows: vec![],
        };
        let data = HeatmapData::from_significant(&table, &AnalysisConfig::default());
        assert!(data.is_empty());
        assert_eq!(data.color_range(), 1.0);
    }
}
