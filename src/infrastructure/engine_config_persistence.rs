//! Persistence for the versioned engine configuration artifact (TOML).

use crate::domain::config::EngineConfig;
use crate::domain::errors::ConfigurationError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Parses and validates a configuration document.
pub fn parse_engine_config(content: &str) -> Result<EngineConfig, ConfigurationError> {
    let config: EngineConfig = toml::from_str(content).map_err(|e| ConfigurationError::Parse {
        reason: e.to_string(),
    })?;
    config.validate()?;
    Ok(config)
}

/// Handles reading and writing the configuration artifact.
pub struct EngineConfigPersistence {
    file_path: PathBuf,
}

impl EngineConfigPersistence {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn load(&self) -> Result<EngineConfig> {
        let content = fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read engine config {:?}", self.file_path))?;
        let config = parse_engine_config(&content)
            .with_context(|| format!("Invalid engine config {:?}", self.file_path))?;

        info!(
            "Loaded engine config from {:?} ({} rules, {} edge regions)",
            self.file_path,
            config.rules.len(),
            config.edge_cases.len()
        );
        Ok(config)
    }

    pub fn save(&self, config: &EngineConfig) -> Result<()> {
        config
            .validate()
            .context("Refusing to save an invalid engine config")?;
        let content =
            toml::to_string_pretty(config).context("Failed to serialize engine config")?;

        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        // Atomic write: write to temp file then rename
        let temp_path = self.file_path.with_extension("tmp");
        fs::write(&temp_path, content).context("Failed to write temp config file")?;
        fs::rename(&temp_path, &self.file_path).context("Failed to rename config file")?;

        info!("Saved engine config to {:?}", self.file_path);
        Ok(())
    }
}

/// Loads the artifact at `path`, or the built-in defaults when none is set.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfigPersistence::new(path).load(),
        None => {
            info!("No engine config file configured, using built-in defaults");
            Ok(EngineConfig::default())
        }
    }
}
