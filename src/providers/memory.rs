//! In-memory implementations of the store and directory interfaces, backed by
//! a fixed snapshot. Used by unit and integration tests.

use std::{
    cmp::Ordering as CmpOrdering,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    vec::IntoIter,
};

use async_trait::async_trait;

use super::traits::{
    DirectoryError, FetchError, FindQuery, LocationDirectory, MonitorCursor, MonitorStore,
    SortField, SortOrder,
};
use crate::models::{LocationListing, MonitorRecord};

/// Returns true if the record's name or query id contains `needle`, ignoring
/// case. `needle` must already be lowercase.
pub(crate) fn matches_search(record: &MonitorRecord, needle: &str) -> bool {
    record.query_id.to_lowercase().contains(needle)
        || record.name.as_deref().is_some_and(|name| name.to_lowercase().contains(needle))
}

fn compare_records(a: &MonitorRecord, b: &MonitorRecord, field: SortField) -> CmpOrdering {
    match field {
        SortField::Name => {
            a.name.as_deref().unwrap_or_default().cmp(b.name.as_deref().unwrap_or_default())
        }
        SortField::QueryId => a.query_id.cmp(&b.query_id),
    }
}

/// Counters shared between a store and the cursors it opened.
#[derive(Debug, Default)]
struct CursorStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    pages: AtomicUsize,
}

/// A monitor store serving a fixed snapshot of records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMonitorStore {
    records: Arc<Vec<MonitorRecord>>,
    fail_after_pages: Option<usize>,
    stats: Arc<CursorStats>,
}

impl InMemoryMonitorStore {
    /// Creates a store over `records`.
    pub fn new(records: Vec<MonitorRecord>) -> Self {
        Self { records: Arc::new(records), fail_after_pages: None, stats: Arc::default() }
    }

    /// Makes every cursor fail once it has served `pages` pages.
    pub fn fail_after_pages(mut self, pages: usize) -> Self {
        self.fail_after_pages = Some(pages);
        self
    }

    /// Number of cursors opened so far.
    pub fn opened_cursors(&self) -> usize {
        self.stats.opened.load(Ordering::SeqCst)
    }

    /// Number of cursors closed so far.
    pub fn closed_cursors(&self) -> usize {
        self.stats.closed.load(Ordering::SeqCst)
    }

    /// Number of non-empty pages served so far, across all cursors.
    pub fn pages_served(&self) -> usize {
        self.stats.pages.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MonitorStore for InMemoryMonitorStore {
    async fn open(&self, query: &FindQuery) -> Result<Box<dyn MonitorCursor>, FetchError> {
        let sort_field = query.validate()?;
        let needle = query.search_text().map(str::to_lowercase);

        let mut records: Vec<MonitorRecord> = self
            .records
            .iter()
            .filter(|record| needle.as_deref().is_none_or(|needle| matches_search(record, needle)))
            .cloned()
            .collect();

        if let Some(field) = sort_field {
            let order = query.sort_order.unwrap_or_default();
            records.sort_by(|a, b| {
                let ordering = compare_records(a, b, field);
                let ordering = match order {
                    SortOrder::Asc => ordering,
                    SortOrder::Desc => ordering.reverse(),
                };
                ordering.then_with(|| a.query_id.cmp(&b.query_id))
            });
        }

        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            records = records.len(),
            page_size = query.page_size,
            "Opened in-memory monitor cursor."
        );

        Ok(Box::new(InMemoryCursor {
            records: records.into_iter(),
            page_size: query.page_size,
            pages_served: 0,
            fail_after_pages: self.fail_after_pages,
            closed: false,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct InMemoryCursor {
    records: IntoIter<MonitorRecord>,
    page_size: usize,
    pages_served: usize,
    fail_after_pages: Option<usize>,
    closed: bool,
    stats: Arc<CursorStats>,
}

#[async_trait]
impl MonitorCursor for InMemoryCursor {
    async fn next_page(&mut self) -> Result<Option<Vec<MonitorRecord>>, FetchError> {
        if self.closed {
            return Err(FetchError::Page("cursor is closed".into()));
        }
        if self.fail_after_pages.is_some_and(|limit| self.pages_served >= limit) {
            return Err(FetchError::Page(format!(
                "snapshot unavailable after {} pages",
                self.pages_served
            )));
        }

        let page: Vec<MonitorRecord> = self.records.by_ref().take(self.page_size).collect();
        if page.is_empty() {
            return Ok(None);
        }

        self.pages_served += 1;
        self.stats.pages.fetch_add(1, Ordering::SeqCst);
        Ok(Some(page))
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        if !self.closed {
            self.closed = true;
            self.stats.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// A location directory serving fixed catalogs.
#[derive(Debug, Clone, Default)]
pub struct StaticLocationDirectory {
    listing: LocationListing,
    failure: Option<String>,
    loads: Arc<AtomicUsize>,
}

impl StaticLocationDirectory {
    /// Creates a directory serving `listing`.
    pub fn new(listing: LocationListing) -> Self {
        Self { listing, failure: None, loads: Arc::default() }
    }

    /// Creates a directory whose every lookup fails with `message`.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            listing: LocationListing::default(),
            failure: Some(message.into()),
            loads: Arc::default(),
        }
    }

    /// Number of times the catalogs were listed.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationDirectory for StaticLocationDirectory {
    async fn list_locations(&self) -> Result<LocationListing, DirectoryError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(message) => Err(DirectoryError::Unavailable(message.clone())),
            None => Ok(self.listing.clone()),
        }
    }
}
