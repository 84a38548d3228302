use itertools::Itertools;

use super::AnalysisOutcome;
use crate::config::AnalysisConfig;

fn fmt_stat(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "NA".to_string()
    } else {
        format!("{:.*}", precision, value)
    }
}

/// Plain-text summary of an analysis run.
pub fn generate_report(outcome: &AnalysisOutcome, config: &AnalysisConfig) -> String {
    let summary = &outcome.summary;
    let mut report = String::new();

    // Header
    report.push_str("SNP / Lifestyle Association Report\n");
    report.push_str("==================================\n\n");

    if let Some(input) = &summary.input {
        report.push_str(&format!(
            "Input: {} (sheet '{}')\n",
            input.display(),
            summary.sheet_name
        ));
    }
    report.push_str(&format!(
        "Subjects: {} loaded, {} complete ({:.1}%)\n",
        summary.rows_loaded,
        summary.rows_kept,
        100.0 * summary.rows_kept as f64 / summary.rows_loaded.max(1) as f64
    ));
    report.push_str(&format!(
        "Variants: {} columns -> {} indicator columns\n",
        summary.variant_columns, summary.indicator_columns
    ));
    report.push_str(&format!(
        "Behavioral codes: {}\n",
        outcome.significant.codes.iter().join(", ")
    ));
    report.push_str(&format!(
        "Significance: p < {} ({:?} p-values)\n\n",
        summary.significance_threshold, summary.p_value_mode
    ));

    if outcome.significant.is_empty() {
        report.push_str("No significant correlations found.\n");
        return report;
    }

    report.push_str(&format!(
        "Significant correlations ({}):\n",
        outcome.significant.rows.len()
    ));
    for row in &outcome.significant.rows {
        let stats = outcome
            .significant
            .codes
            .iter()
            .enumerate()
            .map(|(j, code)| {
                let marker = if row.p_values[j] < summary.significance_threshold {
                    "*"
                } else {
                    ""
                };
                format!(
                    "{}: r={} p={}{}",
                    config.display_label(code),
                    fmt_stat(row.correlations[j], 3),
                    fmt_stat(row.p_values[j], 4),
                    marker
                )
            })
            .join(" | ");
        report.push_str(&format!("  {:<16} {}\n", row.indicator, stats));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PValueMode;
    use crate::filter::{CombinedRow, CombinedTable};
    use crate::pipeline::AnalysisSummary;

    fn outcome(rows: Vec<CombinedRow>) -> AnalysisOutcome {
        let table = CombinedTable {
            codes: vec!["Physical Activity Level code".to_string()],
            rows,
        };
        AnalysisOutcome {
            summary: AnalysisSummary {
                input: None,
                sheet_name: "Sheet3".to_string(),
                rows_loaded: 10,
                rows_kept: 8,
                variant_columns: 2,
                indicator_columns: 5,
                significance_threshold: 0.05,
                p_value_mode: PValueMode::Indicator,
                significant_indicators: table.rows.len(),
                processing_time_seconds: 0.01,
            },
            combined: table.clone(),
            significant: table,
        }
    }

    #[test]
    fn test_report_lists_significant_rows() {
        let row = CombinedRow {
            indicator: "rs7_AG".to_string(),
            variant: "rs7".to_string(),
            category: "AG".to_string(),
            correlations: vec![0.61],
            p_values: vec![0.0123],
            adjusted_p_values: vec![0.03],
        };
        let report = generate_report(&outcome(vec![row]), &AnalysisConfig::default());

        assert!(report.contains("Subjects: 10 loaded, 8 complete (80.0%)"));
        assert!(report.contains("Significant correlations (1):"));
        assert!(report.contains("rs7_AG"));
        assert!(report.contains("Physical Activity: r=0.610 p=0.0123*"));
    }

    #[test]
    fn test_report_without_hits() {
        let report = generate_report(&outcome(vec![]), &AnalysisConfig::default());
        assert!(report.contains("No significant correlations found."));
    }
}
