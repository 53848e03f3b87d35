//! The location registry resolves location ids to labels using a catalog that
//! is loaded on first use and cached for the rest of one aggregation run.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use thiserror::Error;
use tokio::sync::OnceCell;

use crate::providers::traits::{DirectoryError, LocationDirectory};

/// Errors that can occur while resolving location labels.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The location directory could not be listed.
    #[error("Failed to load location catalog: {0}")]
    Load(#[from] DirectoryError),
}

/// Resolves location ids to labels for one aggregation run.
///
/// The registry starts unloaded. The first lookup lists the directory and
/// concurrent lookups wait on that same load. A failed load is not cached, so
/// the next lookup tries again. Ids missing from the catalog resolve to
/// themselves.
pub struct LocationRegistry {
    directory: Arc<dyn LocationDirectory>,
    catalog: OnceCell<HashMap<String, String>>,
    misses: AtomicUsize,
}

impl LocationRegistry {
    /// Creates an unloaded registry over `directory`.
    pub fn new(directory: Arc<dyn LocationDirectory>) -> Self {
        Self { directory, catalog: OnceCell::new(), misses: AtomicUsize::new(0) }
    }

    /// Returns true once the catalog has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.catalog.initialized()
    }

    /// Number of lookups that fell back to the id.
    pub fn miss_count(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Resolves a single location id.
    pub async fn label_for(&self, location_id: &str) -> Result<String, RegistryError> {
        let catalog = self.catalog().await?;
        Ok(self.lookup(catalog, location_id))
    }

    /// Resolves a batch of ids against one catalog access, preserving order.
    /// An empty batch never triggers a load.
    pub async fn labels_for(&self, location_ids: &[String]) -> Result<Vec<String>, RegistryError> {
        if location_ids.is_empty() {
            return Ok(Vec::new());
        }
        let catalog = self.catalog().await?;
        Ok(location_ids.iter().map(|id| self.lookup(catalog, id)).collect())
    }

    async fn catalog(&self) -> Result<&HashMap<String, String>, RegistryError> {
        self.catalog.get_or_try_init(|| self.load()).await
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn load(&self) -> Result<HashMap<String, String>, RegistryError> {
        tracing::debug!("Loading location catalog.");
        let listing = self
            .directory
            .list_locations()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to list locations."))?;

        let mut catalog = HashMap::with_capacity(listing.len());
        // Public locations come first and win on duplicate ids.
        for location in listing.into_locations() {
            catalog.entry(location.id).or_insert(location.label);
        }

        tracing::info!(locations = catalog.len(), "Location catalog loaded.");
        Ok(catalog)
    }

    fn lookup(&self, catalog: &HashMap<String, String>, location_id: &str) -> String {
        match catalog.get(location_id) {
            Some(label) => label.clone(),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    location_id,
                    "Location not found in catalog, using its id as label."
                );
                location_id.to_string()
            }
        }
    }
}
