//! A location directory backed by a YAML file.

use std::path::PathBuf;

use async_trait::async_trait;
use config::{Config, File, FileFormat};

use super::traits::{DirectoryError, LocationDirectory};
use crate::models::LocationListing;

/// Reads `public_locations` and `private_locations` from a YAML file on every
/// listing.
#[derive(Debug, Clone)]
pub struct FileLocationDirectory {
    path: PathBuf,
}

impl FileLocationDirectory {
    /// Creates a directory reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LocationDirectory for FileLocationDirectory {
    #[tracing::instrument(skip(self), fields(path = %self.path.display()), level = "debug")]
    async fn list_locations(&self) -> Result<LocationListing, DirectoryError> {
        let content = tokio::fs::read_to_string(&self.path).await?;

        let listing: LocationListing = Config::builder()
            .add_source(File::from_str(&content, FileFormat::Yaml))
            .build()
            .and_then(|config| config.try_deserialize::<LocationListing>())
            .map_err(|e| DirectoryError::Parse(e.to_string()))?;

        tracing::debug!(
            public = listing.public_locations.len(),
            private = listing.private_locations.len(),
            "Location directory loaded."
        );
        Ok(listing)
    }
}
