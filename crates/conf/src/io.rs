use std::{fs, path::Path};

use anyhow::{Context, Result};
use tracing::info;

use crate::{conf, persisted};

/// Loads, parses and validates configuration from a YAML file. Default
/// configuration is returned if the file does not exist.
pub fn load_conf(path: &Path) -> Result<conf::Configuration> {
    match load_conf_text(path)? {
        Some(text) => {
            let persistent: persisted::Configuration =
                serde_yaml::from_str(text.as_str()).context("Failed to parse configuration")?;
            conf::Configuration::try_from(persistent)
        }
        None => Ok(conf::Configuration::default()),
    }
}

/// Loads configuration file to a string. Returns Ok(None) if the configuration
/// file does not exist.
fn load_conf_text(path: &Path) -> Result<Option<String>> {
    if path.is_file() {
        info!("Loading configuration from {}", path.to_string_lossy());
        fs::read_to_string(path).map(Some).with_context(|| {
            format!(
                "Could not load configuration file: {}",
                path.to_string_lossy(),
            )
        })
    } else {
        info!(
            "Configuration does not exist or is not a file, using defaults: {}",
            path.to_string_lossy()
        );
        Ok(None)
    }
}
