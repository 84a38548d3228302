//! Correlation and significance tables between genotype indicators and
//! behavioral codes.

use log::{debug, info};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{pearson, pearson_test, StatsError};
use crate::config::PValueMode;
use crate::encoding::EncodedDataset;
use crate::preprocess::CleanedDataset;

/// Values keyed by (row, behavioral code). Rows are indicator columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationTable {
    pub row_names: Vec<String>,
    pub code_names: Vec<String>,
    pub values: Array2<f64>,
}

impl AssociationTable {
    #[cfg(test)]
    pub fn get(&self, row: &str, code: &str) -> Option<f64> {
        let i = self.row_names.iter().position(|r| r == row)?;
        let j = self.code_names.iter().position(|c| c == code)?;
        Some(self.values[[i, j]])
    }
}

/// Pearson r of every indicator column against every behavioral code.
pub fn correlation_table(
    cleaned: &CleanedDataset,
    encoded: &EncodedDataset,
) -> Result<AssociationTable, StatsError> {
    let n_codes = cleaned.code_columns().len();
    let mut values = Array2::<f64>::from_elem((encoded.n_indicators(), n_codes), f64::NAN);

    for (i, column) in encoded.columns.iter().enumerate() {
        for j in 0..n_codes {
            values[[i, j]] = pearson(encoded.indicator(i), cleaned.code(j))?;
        }
        debug!("{}: r = {:?}", column.name, values.row(i).to_vec());
    }

    let undefined = values.iter().filter(|v| v.is_nan()).count();
    info!(
        "Computed {} correlations ({} undefined)",
        values.len(),
        undefined
    );
    Ok(AssociationTable {
        row_names: encoded.columns.iter().map(|c| c.name.clone()).collect(),
        code_names: cleaned.code_columns().to_vec(),
        values,
    })
}

/// Two-sided Pearson p-values with the same rows as [`correlation_table`].
///
/// In [`PValueMode::Indicator`] each indicator column is tested directly. In
/// [`PValueMode::Variant`] each original variant column is tested as a
/// numeric column and every indicator row takes its source variant's p-value.
pub fn p_value_table(
    cleaned: &CleanedDataset,
    encoded: &EncodedDataset,
    mode: PValueMode,
) -> Result<AssociationTable, StatsError> {
    let n_codes = cleaned.code_columns().len();
    let mut values = Array2::<f64>::from_elem((encoded.n_indicators(), n_codes), f64::NAN);

    match mode {
        PValueMode::Indicator => {
            for i in 0..encoded.n_indicators() {
                for j in 0..n_codes {
                    values[[i, j]] = pearson_test(encoded.indicator(i), cleaned.code(j))?.p_value;
                }
            }
        }
        PValueMode::Variant => {
            for variant in cleaned.variant_columns() {
                let Some(numeric) = cleaned.variant_as_numeric(variant) else {
                    continue;
                };
                let rows: Vec<usize> = encoded.indicators_of(variant).collect();
                for j in 0..n_codes {
                    let p = pearson_test(numeric.view(), cleaned.code(j))?.p_value;
                    for &i in &rows {
                        values[[i, j]] = p;
                    }
                }
            }
        }
    }

    info!(
        "Computed {} p-values ({:?} mode, {} undefined)",
        values.len(),
        mode,
        values.iter().filter(|v| v.is_nan()).count()
    );
    Ok(AssociationTable {
        row_names: encoded.columns.iter().map(|c| c.name.clone()).collect(),
        code_names: cleaned.code_columns().to_vec(),
        values,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use crate::config::{AnalysisConfig, OUTSIDE_FOOD, PHYSICAL_ACTIVITY, STRESS_PROFILE};
    use crate::encoding::one_hot_encode;
    use crate::preprocess::preprocess;
    use crate::table::{Cell, DataTable};

    /// Ten subjects: rs1 tracks physical activity exactly (AA <-> 1),
    /// rs2 is constant, rs3 is unrelated noise.
    pub(crate) fn linked_table() -> DataTable {
        let activity = [1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let diet = [0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 1.0];
        let stress = [2.0, 1.0, 3.0, 2.0, 1.0, 3.0, 1.0, 2.0, 3.0, 2.0];
        let rs3 = ["CT", "CC", "CC", "TT", "CT", "CT", "TT", "CC", "CT", "TT"];

        let header = vec![
            PHYSICAL_ACTIVITY.to_string(),
            OUTSIDE_FOOD.to_string(),
            STRESS_PROFILE.to_string(),
            "rs1".to_string(),
            "rs2".to_string(),
            "rs3".to_string(),
        ];
        let rows = (0..10)
            .map(|i| {
                vec![
                    Cell::Number(activity[i]),
                    Cell::Number(diet[i]),
                    Cell::Number(stress[i]),
                    Cell::from_text(if activity[i] == 1.0 { "AA" } else { "AG" }),
                    Cell::from_text("GG"),
                    Cell::from_text(rs3[i]),
                ]
            })
            .collect();
        DataTable::from_rows(header, rows)
    }

    fn setup() -> (CleanedDataset, EncodedDataset) {
        let cleaned = preprocess(&linked_table(), &AnalysisConfig::default()).unwrap();
        let encoded = one_hot_encode(&cleaned);
        (cleaned, encoded)
    }

    #[test]
    fn test_perfectly_linked_indicator() {
        let (cleaned, encoded) = setup();
        let corr = correlation_table(&cleaned, &encoded).unwrap();
        let pvals = p_value_table(&cleaned, &encoded, PValueMode::Indicator).unwrap();

        let r = corr.get("rs1_AA", PHYSICAL_ACTIVITY).unwrap();
        assert_abs_diff_eq!(r, 1.0, epsilon = 1e-12);
        let r = corr.get("rs1_AG", PHYSICAL_ACTIVITY).unwrap();
        assert_abs_diff_eq!(r, -1.0, epsilon = 1e-12);
        assert!(pvals.get("rs1_AA", PHYSICAL_ACTIVITY).unwrap() < 1e-6);
    }

    #[test]
    fn test_constant_variant_is_nan() {
        let (cleaned, encoded) = setup();
        let corr = correlation_table(&cleaned, &encoded).unwrap();
        let pvals = p_value_table(&cleaned, &encoded, PValueMode::Indicator).unwrap();

        for code in cleaned.code_columns() {
            assert!(corr.get("rs2_GG", code).unwrap().is_nan());
            assert!(pvals.get("rs2_GG", code).unwrap().is_nan());
        }
    }

    #[test]
    fn test_values_in_range() {
        let (cleaned, encoded) = setup();
        let corr = correlation_table(&cleaned, &encoded).unwrap();
        let pvals = p_value_table(&cleaned, &encoded, PValueMode::Indicator).unwrap();

        assert!(corr.values.iter().all(|r| r.is_nan() || (-1.0..=1.0).contains(r)));
        assert!(pvals.values.iter().all(|p| p.is_nan() || (0.0..=1.0).contains(p)));
        assert_eq!(corr.values.dim(), pvals.values.dim());
        assert_eq!(corr.row_names, pvals.row_names);
    }

    #[test]
    fn test_variant_mode_shares_p_values() {
        let (cleaned, encoded) = setup();
        let pvals = p_value_table(&cleaned, &encoded, PValueMode::Variant).unwrap();

        // rs1 as ranks (AA = 0, AG = 1) is perfectly anti-correlated with activity
        let p_aa = pvals.get("rs1_AA", PHYSICAL_ACTIVITY).unwrap();
        let p_ag = pvals.get("rs1_AG", PHYSICAL_ACTIVITY).unwrap();
        assert!(p_aa < 1e-6);
        assert_eq!(p_aa, p_ag);

        for code in cleaned.code_columns() {
            let p_cc = pvals.get("rs3_CC", code).unwrap();
            assert_eq!(p_cc, pvals.get("rs3_CT", code).unwrap());
            assert_eq!(p_cc, pvals.get("rs3_TT", code).unwrap());
        }
        assert!(pvals.get("rs2_GG", OUTSIDE_FOOD).unwrap().is_nan());
    }
}
