//! Configuration module for the reimbursement tools.
//!
//! Structured configuration loading from environment variables. Binaries call
//! `dotenvy::dotenv()` first so a local `.env` file can provide the values.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

pub const ENGINE_CONFIG_VAR: &str = "REIMBURSE_ENGINE_CONFIG";
pub const REFERENCE_DATA_VAR: &str = "REIMBURSE_REFERENCE_DATA";
pub const WORST_CASES_VAR: &str = "REIMBURSE_WORST_CASES";

const DEFAULT_REFERENCE_DATA: &str = "public_cases.json";
const DEFAULT_WORST_CASES: usize = 5;

/// Main application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// TOML engine artifact; `None` means the built-in defaults.
    pub engine_config: Option<PathBuf>,
    pub reference_data: PathBuf,
    pub worst_cases: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let engine_config = lookup(ENGINE_CONFIG_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let reference_data = lookup(REFERENCE_DATA_VAR)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_REFERENCE_DATA.to_string())
            .into();

        let worst_cases = match lookup(WORST_CASES_VAR) {
            Some(raw) => raw.trim().parse::<usize>().with_context(|| {
                format!(
                    "Failed to parse {} - must be a non-negative integer, got '{}'",
                    WORST_CASES_VAR, raw
                )
            })?,
            None => DEFAULT_WORST_CASES,
        };

        Ok(Self {
            engine_config,
            reference_data,
            worst_cases,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_config: None,
            reference_data: PathBuf::from(DEFAULT_REFERENCE_DATA),
            worst_cases: DEFAULT_WORST_CASES,
        }
    }
}
