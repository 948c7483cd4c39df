//! Configuration loading from disk.
//!
//! Settings can live in a standalone `.autoroute.json` file at the project
//! root or under `[package.metadata.autoroute]` in `Cargo.toml`. The JSON
//! file takes precedence when both exist. Loading runs once at startup,
//! before any walking begins.

use std::fs;
use std::path::Path;

use crate::config::schema::Config;
use crate::config::validation::validate_config;
use crate::error::LoadError;

/// Standalone settings file probed by [`Config::discover`].
pub const CONFIG_FILE: &str = ".autoroute.json";

/// Cargo manifest probed for `[package.metadata.autoroute]`.
pub const MANIFEST_FILE: &str = "Cargo.toml";

/// Load and validate configuration from a JSON settings file.
pub fn load_config(path: &Path) -> Result<Config, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = serde_json::from_str(&content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_config(&config)?;

    Ok(config)
}

impl Config {
    /// Look for settings in `dir`: first `.autoroute.json`, then the
    /// `[package.metadata.autoroute]` table of `Cargo.toml`. Returns
    /// `None` when neither carries settings.
    pub fn discover(dir: &Path) -> Result<Option<Config>, LoadError> {
        let standalone = dir.join(CONFIG_FILE);
        if standalone.exists() {
            return load_config(&standalone).map(Some);
        }

        let manifest = dir.join(MANIFEST_FILE);
        if !manifest.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&manifest).map_err(|source| LoadError::Io {
            path: manifest.clone(),
            source,
        })?;
        let value: toml::Value = toml::from_str(&content).map_err(|source| LoadError::Toml {
            path: manifest.clone(),
            source,
        })?;

        let metadata = value
            .get("package")
            .and_then(|package| package.get("metadata"))
            .and_then(|metadata| metadata.get("autoroute"));

        match metadata {
            Some(table) => {
                let config: Config =
                    table
                        .clone()
                        .try_into()
                        .map_err(|source| LoadError::Toml {
                            path: manifest,
                            source,
                        })?;
                validate_config(&config)?;
                Ok(Some(config))
            }
            None => Ok(None),
        }
    }
}
