//! Batch evaluation of a predictor against the labeled reference set.
//!
//! Mirrors the scoring of the public challenge harness: exact matches are
//! within one cent, close matches within one dollar, and the score combines
//! the average error with a penalty per inexact case (lower is better).

use crate::application::estimation::ReimbursementPredictor;
use crate::domain::config::AMOUNT_DECIMALS;
use crate::domain::prediction::PredictionPath;
use crate::domain::trip::{ReferenceSet, TripRecord};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::info;

const EXACT_TOLERANCE: Decimal = dec!(0.01);
const CLOSE_TOLERANCE: Decimal = dec!(1.00);

/// Outcome for one reference example.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseResult {
    pub index: usize,
    pub input: TripRecord,
    pub expected: Decimal,
    pub predicted: Decimal,
    pub error: Decimal,
    pub path: PredictionPath,
}

impl CaseResult {
    pub fn is_exact(&self) -> bool {
        self.error <= EXACT_TOLERANCE
    }

    pub fn is_close(&self) -> bool {
        !self.is_exact() && self.error <= CLOSE_TOLERANCE
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub version: String,
    pub cases: usize,
    pub exact_matches: usize,
    pub close_matches: usize,
    pub mean_absolute_error: f64,
    pub max_error: f64,
    /// Fraction of cases answered by the similarity fallback.
    pub fallback_share: f64,
    pub score: f64,
    pub worst_cases: Vec<CaseResult>,
    /// Every case in dataset order.
    #[serde(skip)]
    pub results: Vec<CaseResult>,
}

impl EvaluationReport {
    pub fn exact_pct(&self) -> f64 {
        self.exact_matches as f64 * 100.0 / self.cases as f64
    }

    pub fn close_pct(&self) -> f64 {
        self.close_matches as f64 * 100.0 / self.cases as f64
    }
}

/// Runs a predictor over every reference example in parallel.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator {
    worst_cases: usize,
}

impl Evaluator {
    pub fn new(worst_cases: usize) -> Self {
        Self { worst_cases }
    }

    pub fn evaluate<P>(&self, predictor: &P, examples: &ReferenceSet) -> Result<EvaluationReport>
    where
        P: ReimbursementPredictor + ?Sized,
    {
        if examples.is_empty() {
            bail!("Reference set is empty, nothing to evaluate");
        }

        info!(
            "Evaluating '{}' on {} cases...",
            predictor.name(),
            examples.len()
        );

        let results: Vec<CaseResult> = examples
            .examples()
            .par_iter()
            .enumerate()
            .map(|(index, example)| -> Result<CaseResult> {
                let (result, path) = predictor
                    .predict_routed(&example.input)
                    .with_context(|| format!("Prediction failed for case {}", index))?;
                let expected = Decimal::from_f64(example.observed)
                    .with_context(|| format!("Case {} expected amount is out of range", index))?
                    .round_dp_with_strategy(
                        AMOUNT_DECIMALS,
                        RoundingStrategy::MidpointAwayFromZero,
                    );
                Ok(CaseResult {
                    index,
                    input: TripRecord::from(&example.input),
                    expected,
                    predicted: result.amount,
                    error: (result.amount - expected).abs(),
                    path,
                })
            })
            .collect::<Result<_>>()?;

        Ok(self.summarize(predictor, results))
    }

    fn summarize<P>(&self, predictor: &P, results: Vec<CaseResult>) -> EvaluationReport
    where
        P: ReimbursementPredictor + ?Sized,
    {
        let cases = results.len();
        let exact_matches = results.iter().filter(|r| r.is_exact()).count();
        let close_matches = results.iter().filter(|r| r.is_close()).count();
        let errors: Vec<f64> = results
            .iter()
            .map(|r| r.error.to_f64().unwrap_or(f64::MAX))
            .collect();
        let mean_absolute_error = errors.iter().sum::<f64>() / cases as f64;
        let max_error = errors.iter().copied().fold(0.0, f64::max);
        let fallback = results
            .iter()
            .filter(|r| r.path == PredictionPath::Similarity)
            .count();

        let mut worst: Vec<&CaseResult> = results.iter().collect();
        worst.sort_by(|a, b| match b.error.cmp(&a.error) {
            Ordering::Equal => a.index.cmp(&b.index),
            other => other,
        });
        let worst_cases = worst
            .into_iter()
            .take(self.worst_cases)
            .cloned()
            .collect();

        let report = EvaluationReport {
            timestamp: Utc::now(),
            model: predictor.name().to_string(),
            version: predictor.version().to_string(),
            cases,
            exact_matches,
            close_matches,
            mean_absolute_error,
            max_error,
            fallback_share: fallback as f64 / cases as f64,
            score: challenge_score(mean_absolute_error, cases, exact_matches),
            worst_cases,
            results,
        };

        info!(
            "Evaluation done: {} exact, {} close, MAE {:.2}, score {:.2}",
            report.exact_matches, report.close_matches, report.mean_absolute_error, report.score
        );
        report
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(5)
    }
}

/// `avg_error * 100 + (cases - exact) * 0.1`, lower is better.
pub fn challenge_score(mean_absolute_error: f64, cases: usize, exact_matches: usize) -> f64 {
    mean_absolute_error * 100.0 + (cases - exact_matches) as f64 * 0.1
}
