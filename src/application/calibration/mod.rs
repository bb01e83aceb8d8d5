pub mod least_squares;

pub use least_squares::{FittedCoefficients, fit_base_coefficients};
