//! The inventory aggregator drains a monitor cursor page by page and folds the
//! records into an `AggregationResult`.

use std::sync::Arc;

use thiserror::Error;

use super::{
    accumulator::AggregationAccumulator,
    classifier::classify,
    registry::{LocationRegistry, RegistryError},
    resolver::LocationResolver,
};
use crate::{
    models::{AggregationResult, MonitorRecord},
    providers::traits::{FetchError, FindQuery, LocationDirectory, MonitorCursor, MonitorStore},
};

/// Errors that abort an aggregation run.
#[derive(Debug, Error)]
pub enum AggregationError {
    /// The object store failed to open the cursor or to serve a page.
    #[error("Failed to fetch monitors: {0}")]
    Fetch(#[from] FetchError),

    /// The location catalog could not be loaded.
    #[error("Failed to resolve location labels: {0}")]
    Registry(#[from] RegistryError),

    /// A record without a query id was served by the store.
    #[error("Malformed monitor record at position {position}: missing query id")]
    MalformedRecord {
        /// Zero-based position of the record in the stream.
        position: usize,
    },
}

/// Aggregates the monitor inventory of an object store.
pub struct InventoryAggregator {
    store: Arc<dyn MonitorStore>,
    directory: Arc<dyn LocationDirectory>,
}

impl InventoryAggregator {
    /// Creates an aggregator reading monitors from `store` and location labels
    /// from `directory`.
    pub fn new(store: Arc<dyn MonitorStore>, directory: Arc<dyn LocationDirectory>) -> Self {
        Self { store, directory }
    }

    /// Runs one aggregation over the monitors matching `query`.
    ///
    /// The cursor is closed on every path once opened, including when the
    /// returned future is dropped mid-run; a close failure is only logged. Any
    /// other failure fails the whole run.
    #[tracing::instrument(skip(self), fields(page_size = query.page_size), level = "info")]
    pub async fn aggregate(
        &self,
        query: &FindQuery,
    ) -> Result<AggregationResult, AggregationError> {
        query.validate()?;

        let mut resolver =
            LocationResolver::new(LocationRegistry::new(Arc::clone(&self.directory)));

        let cursor = self.store.open(query).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to open monitor cursor.");
        })?;
        let mut cursor = CursorGuard::new(cursor);

        let drained = drain(&mut cursor, &mut resolver).await;
        cursor.close().await;

        let accumulator = drained.inspect_err(|e| {
            tracing::error!(error = %e, "Monitor aggregation failed.");
        })?;

        let misses = resolver.registry().miss_count();
        if misses > 0 {
            tracing::warn!(
                misses,
                "Some location ids are missing from the location catalog."
            );
        }

        let result = accumulator.finish();
        tracing::info!(
            total = result.all_ids.len(),
            enabled = result.enabled_ids.len(),
            disabled = result.disabled_monitor_count,
            projects = result.project_monitor_count,
            locations = result.all_distinct_locations.len(),
            max_period_ms = result.max_period_ms,
            "Monitor inventory aggregated."
        );
        Ok(result)
    }
}

/// Owns an open cursor and closes it exactly once. A guard dropped before
/// [`CursorGuard::close`] ran, e.g. because the run was cancelled, hands the
/// close to the runtime.
struct CursorGuard {
    cursor: Option<Box<dyn MonitorCursor>>,
}

impl CursorGuard {
    fn new(cursor: Box<dyn MonitorCursor>) -> Self {
        Self { cursor: Some(cursor) }
    }

    async fn next_page(&mut self) -> Result<Option<Vec<MonitorRecord>>, FetchError> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.next_page().await,
            None => Err(FetchError::Page("cursor is closed".into())),
        }
    }

    async fn close(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            close_cursor(cursor.as_mut()).await;
        }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        let Some(mut cursor) = self.cursor.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("Closing monitor cursor of an abandoned run.");
                handle.spawn(async move { close_cursor(cursor.as_mut()).await });
            }
            Err(_) => tracing::warn!("No runtime left to close an abandoned monitor cursor."),
        }
    }
}

async fn close_cursor(cursor: &mut dyn MonitorCursor) {
    if let Err(e) = cursor.close().await {
        tracing::warn!(error = %e, "Failed to close monitor cursor.");
    }
}

/// Processes pages in arrival order, each one completely before the next is
/// requested.
async fn drain(
    cursor: &mut CursorGuard,
    resolver: &mut LocationResolver,
) -> Result<AggregationAccumulator, AggregationError> {
    let mut accumulator = AggregationAccumulator::new();
    let mut pages = 0usize;

    while let Some(page) = cursor.next_page().await? {
        pages += 1;

        if let Some(offset) = page.iter().position(|record| record.query_id.is_empty()) {
            return Err(AggregationError::MalformedRecord {
                position: accumulator.records_seen() + offset,
            });
        }

        resolver.prefetch(&page).await?;

        for record in &page {
            let classification = classify(record);
            let labels = if classification.is_enabled() {
                resolver.labels_for(record)
            } else {
                Vec::new()
            };
            accumulator.fold(record, classification, labels);
        }

        tracing::debug!(page = pages, records = page.len(), "Folded monitor page.");
    }

    Ok(accumulator)
}
