//! Reporting utilities for evaluation results.
//!
//! Provides formatted console output plus JSON and CSV export.

use super::evaluator::{CaseResult, EvaluationReport};
use crate::domain::prediction::PredictionPath;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One flat CSV row per evaluated case.
#[derive(Debug, Serialize)]
struct CaseRow {
    index: usize,
    trip_duration_days: i64,
    miles_traveled: f64,
    total_receipts_amount: f64,
    expected: Decimal,
    predicted: Decimal,
    error: Decimal,
    path: PredictionPath,
}

impl From<&CaseResult> for CaseRow {
    fn from(case: &CaseResult) -> Self {
        Self {
            index: case.index,
            trip_duration_days: case.input.trip_duration_days,
            miles_traveled: case.input.miles_traveled,
            total_receipts_amount: case.input.total_receipts_amount,
            expected: case.expected,
            predicted: case.predicted,
            error: case.error,
            path: case.path,
        }
    }
}

/// Reporter for evaluation results output.
pub struct EvaluationReporter {
    output_dir: PathBuf,
}

impl EvaluationReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn print_header(&self, dataset: &str, config: &str) {
        println!("{}", "=".repeat(80));
        println!("🧾 REIMBURSEMENT ENGINE EVALUATION");
        println!("{}", "=".repeat(80));
        println!("Dataset:      {}", dataset);
        println!("Config:       {}", config);
        println!("{}", "=".repeat(80));
    }

    pub fn print_summary(&self, report: &EvaluationReport) {
        println!("\n📊 {} ({})", report.model, report.version);
        println!("  Total cases:      {}", report.cases);
        println!(
            "  Exact (±$0.01):   {} ({:.1}%)",
            report.exact_matches,
            report.exact_pct()
        );
        println!(
            "  Close (±$1.00):   {} ({:.1}%)",
            report.close_matches,
            report.close_pct()
        );
        println!("  Average error:    ${:.2}", report.mean_absolute_error);
        println!("  Maximum error:    ${:.2}", report.max_error);
        println!(
            "  Fallback share:   {:.1}%",
            report.fallback_share * 100.0
        );
        println!("\n🎯 Score: {:.2} (lower is better)", report.score);
    }

    pub fn print_worst_cases(&self, report: &EvaluationReport) {
        if report.worst_cases.is_empty() {
            return;
        }

        println!("\n{}", "=".repeat(80));
        println!("⚠️  Top {} worst cases", report.worst_cases.len());
        println!("{}", "=".repeat(80));
        println!(
            "{:<6} | {:>4} | {:>8} | {:>9} | {:>9} | {:>9} | {:>8} | {:<10}",
            "Case", "Days", "Miles", "Receipts", "Expected", "Predicted", "Error", "Path"
        );
        println!("{}", "-".repeat(80));

        for case in &report.worst_cases {
            println!(
                "{:<6} | {:>4} | {:>8.1} | {:>9.2} | {:>9.2} | {:>9.2} | {:>8.2} | {:<10}",
                case.index + 1,
                case.input.trip_duration_days,
                case.input.miles_traveled,
                case.input.total_receipts_amount,
                case.expected,
                case.predicted,
                case.error,
                case.path
            );
        }
        println!("{}\n", "=".repeat(80));
    }

    /// Prints the baseline next to the engine so the gain is visible.
    pub fn print_comparison(&self, engine: &EvaluationReport, baseline: &EvaluationReport) {
        println!("\n📈 Comparison against {}:", baseline.model);
        println!("  {:<18} {:>12} {:>12}", "", "engine", "baseline");
        println!(
            "  {:<18} {:>12} {:>12}",
            "exact matches", engine.exact_matches, baseline.exact_matches
        );
        println!(
            "  {:<18} {:>12.2} {:>12.2}",
            "average error", engine.mean_absolute_error, baseline.mean_absolute_error
        );
        println!(
            "  {:<18} {:>12.2} {:>12.2}",
            "score", engine.score, baseline.score
        );
    }

    /// Writes the summary (with worst cases) as pretty JSON.
    pub fn export_json(&self, report: &EvaluationReport, filename: &str) -> Result<PathBuf> {
        let output_path = self.resolve(filename)?;
        let json_output =
            serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;
        std::fs::write(&output_path, json_output)
            .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

        println!("💾 Report saved to: {}", output_path.display());
        Ok(output_path)
    }

    /// Writes every case, in dataset order, as CSV.
    pub fn export_csv(&self, report: &EvaluationReport, filename: &str) -> Result<PathBuf> {
        let output_path = self.resolve(filename)?;
        let mut wtr = csv::Writer::from_path(&output_path)
            .with_context(|| format!("Failed to create {}", output_path.display()))?;
        for case in &report.results {
            wtr.serialize(CaseRow::from(case))
                .with_context(|| format!("Failed to write case {}", case.index))?;
        }
        wtr.flush().context("Failed to flush CSV writer")?;

        println!("💾 Cases saved to: {}", output_path.display());
        Ok(output_path)
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf> {
        let path = Path::new(filename);
        let output_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        };

        // Ensure directory exists
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        Ok(output_path)
    }
}

impl Default for EvaluationReporter {
    fn default() -> Self {
        Self::new(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::estimation::LinearBaseline;
    use crate::application::evaluation::Evaluator;
    use crate::domain::config::{AmountBounds, BaseCoefficients, Bounds};
    use crate::domain::trip::{LabeledExample, ReferenceSet, TripInput};

    fn report() -> EvaluationReport {
        let baseline = LinearBaseline::new(
            BaseCoefficients::default(),
            Bounds::try_from(AmountBounds::default()).unwrap(),
        );
        let set = ReferenceSet::new(vec![
            LabeledExample::new(TripInput::new(1, 0.0, 0.0).unwrap(), 320.0).unwrap(),
            LabeledExample::new(TripInput::new(2, 10.0, 5.0).unwrap(), 400.0).unwrap(),
        ]);
        Evaluator::new(1).evaluate(&baseline, &set).unwrap()
    }

    #[test]
    fn test_export_json_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let reporter = EvaluationReporter::new(dir.path());
        let report = report();

        let json_path = reporter.export_json(&report, "report.json").unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(json["cases"], 2);
        assert_eq!(json["worst_cases"].as_array().unwrap().len(), 1);
        assert!(json.get("results").is_none());

        let csv_path = reporter.export_csv(&report, "nested/cases.csv").unwrap();
        let mut rdr = csv::Reader::from_path(csv_path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(&headers[0], "index");
        assert_eq!(&headers[7], "path");
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][5], "320.00");
        assert_eq!(&rows[1][7], "rules");
    }
}
