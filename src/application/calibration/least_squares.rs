use crate::domain::config::BaseCoefficients;
use crate::domain::trip::ReferenceSet;
use anyhow::{Result, anyhow, bail};
use serde::Serialize;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use tracing::info;

/// Unknowns of the base formula: three slopes and the intercept.
const UNKNOWNS: usize = 4;

/// Result of an ordinary least-squares fit of the base formula.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FittedCoefficients {
    pub coefficients: BaseCoefficients,
    /// Mean absolute error of the fitted formula over the training examples.
    pub mae: f64,
    pub r_squared: f64,
    pub samples: usize,
}

/// Fits `observed ~ days + miles + receipts + intercept` over the reference set.
pub fn fit_base_coefficients(examples: &ReferenceSet) -> Result<FittedCoefficients> {
    let n = examples.len();
    if n < UNKNOWNS {
        bail!(
            "Need at least {} labeled examples to fit the base formula, got {}",
            UNKNOWNS,
            n
        );
    }

    let x: Vec<Vec<f64>> = examples
        .iter()
        .map(|e| {
            vec![
                f64::from(e.input.days()),
                e.input.miles(),
                e.input.receipts(),
            ]
        })
        .collect();
    let y: Vec<f64> = examples.iter().map(|e| e.observed).collect();

    info!("Fitting base coefficients on {} samples...", n);
    let x_matrix = DenseMatrix::from_2d_vec(&x).map_err(|e| anyhow!("Matrix error: {}", e))?;
    let model: LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>> =
        LinearRegression::fit(&x_matrix, &y, LinearRegressionParameters::default())
            .map_err(|e| anyhow!("Training error: {}", e))?;

    // Origin and unit vectors recover the intercept and each slope.
    let probes = DenseMatrix::from_2d_vec(&vec![
        vec![0.0, 0.0, 0.0],
        vec![1.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
    ])
    .map_err(|e| anyhow!("Matrix error: {}", e))?;
    let probe: Vec<f64> = model
        .predict(&probes)
        .map_err(|e| anyhow!("Predict error: {}", e))?;
    let &[intercept, at_days, at_miles, at_receipts] = probe.as_slice() else {
        bail!("Expected {} probe predictions, got {}", UNKNOWNS, probe.len());
    };

    let coefficients = BaseCoefficients {
        days: at_days - intercept,
        miles: at_miles - intercept,
        receipts: at_receipts - intercept,
        intercept,
    };
    coefficients
        .validate()
        .map_err(|e| anyhow!("Fit produced unusable coefficients: {}", e))?;

    let residuals: Vec<f64> = examples
        .iter()
        .map(|e| e.observed - coefficients.linear(&e.input))
        .collect();
    let mae = residuals.iter().map(|r| r.abs()).sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = y.iter().map(|v| (v - mean_y).powi(2)).sum();
    let ss_res: f64 = residuals.iter().map(|r| r.powi(2)).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    info!(
        "Fit complete: days={:.4}, miles={:.4}, receipts={:.4}, intercept={:.4} (MAE {:.2}, R² {:.4})",
        coefficients.days,
        coefficients.miles,
        coefficients.receipts,
        coefficients.intercept,
        mae,
        r_squared
    );

    Ok(FittedCoefficients {
        coefficients,
        mae,
        r_squared,
        samples: n,
    })
}
