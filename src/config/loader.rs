//! Generic configuration loader for loading items from a YAML file.

use std::{fs, path::PathBuf};

use config::{Config, File, FileFormat};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// A generic loader for YAML files.
pub struct ConfigLoader {
    path: PathBuf,
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// The file could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file content could not be parsed into the requested type.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] config::ConfigError),

    /// The file is not a YAML file.
    #[error("Unsupported configuration format")]
    UnsupportedFormat,
}

impl ConfigLoader {
    /// Creates a new `ConfigLoader`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads a vector of items stored under the top-level `key`
    /// (e.g., "monitors").
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, LoaderError> {
        let config = self.read()?;
        Ok(config.get(key)?)
    }

    /// Loads the whole document as a single value.
    pub fn load_document<T: DeserializeOwned>(&self) -> Result<T, LoaderError> {
        let config = self.read()?;
        Ok(config.try_deserialize()?)
    }

    fn read(&self) -> Result<Config, LoaderError> {
        if !self.is_yaml_file() {
            return Err(LoaderError::UnsupportedFormat);
        }

        let config_str = fs::read_to_string(&self.path)?;

        let config = Config::builder()
            .add_source(File::from_str(&config_str, FileFormat::Yaml))
            .build()?;

        Ok(config)
    }

    /// Checks if the file has a YAML extension.
    fn is_yaml_file(&self) -> bool {
        matches!(
            self.path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        )
    }
}
