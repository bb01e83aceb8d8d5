//! Loader for the labeled reference dataset (JSON).

use crate::domain::trip::{LabeledExample, ReferenceSet, TripInput, TripRecord};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// One record of the reference dataset as stored on disk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReferenceCase {
    pub input: TripRecord,
    pub expected_output: f64,
}

/// Parses and validates every record, failing on the first bad one.
pub fn parse_reference_set(content: &str) -> Result<ReferenceSet> {
    let cases: Vec<ReferenceCase> =
        serde_json::from_str(content).context("Failed to parse reference data JSON")?;

    let examples = cases
        .into_iter()
        .enumerate()
        .map(|(index, case)| {
            let input = TripInput::try_from(case.input)
                .with_context(|| format!("Invalid reference case {}", index))?;
            LabeledExample::new(input, case.expected_output)
                .with_context(|| format!("Invalid reference case {}", index))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ReferenceSet::new(examples))
}

pub fn load_reference_set(path: &Path) -> Result<ReferenceSet> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read reference data {:?}", path))?;
    let set = parse_reference_set(&content)
        .with_context(|| format!("Invalid reference data {:?}", path))?;

    info!("Loaded {} reference cases from {:?}", set.len(), path);
    Ok(set)
}
