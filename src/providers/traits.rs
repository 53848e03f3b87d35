//! This module defines the interfaces the inventory engine consumes: a paged
//! monitor object store and a location directory.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{LocationListing, MonitorRecord};

/// The object type monitor records are stored under.
pub const MONITOR_OBJECT_TYPE: &str = "synthetics-monitor";

/// The page size requested when none is configured.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// The largest page a query may request.
pub const MAX_PAGE_SIZE: usize = 10_000;

/// Custom error type for object store operations.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The find query cannot be served by the store.
    #[error("Invalid find query: {0}")]
    InvalidQuery(String),

    /// The store failed to open a cursor.
    #[error("Failed to open monitor cursor: {0}")]
    Open(String),

    /// The store failed to return the next page.
    #[error("Failed to fetch monitor page: {0}")]
    Page(String),

    /// A stored record could not be decoded.
    #[error("Failed to decode monitor record '{query_id}': {reason}")]
    Decode {
        /// The query id of the offending record.
        query_id: String,
        /// Why decoding failed.
        reason: String,
    },

    /// The store failed to release the cursor.
    #[error("Failed to close monitor cursor: {0}")]
    Close(String),
}

/// Custom error type for location directory operations.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The directory file could not be read.
    #[error("Failed to read location directory: {0}")]
    Io(#[from] std::io::Error),

    /// The directory content could not be parsed.
    #[error("Failed to parse location directory: {0}")]
    Parse(String),

    /// The directory service is unavailable.
    #[error("Location directory unavailable: {0}")]
    Unavailable(String),
}

/// Sort direction of a find query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// The SQL keyword for this order.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(FetchError::InvalidQuery(format!("unknown sort order '{other}'"))),
        }
    }
}

/// Record fields a find query can sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// The monitor name. Unnamed monitors sort as the empty string.
    Name,
    /// The monitor query id.
    QueryId,
}

impl FromStr for SortField {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" | "name.keyword" => Ok(Self::Name),
            "query_id" => Ok(Self::QueryId),
            other => Err(FetchError::InvalidQuery(format!("unsupported sort field '{other}'"))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::QueryId => f.write_str("query_id"),
        }
    }
}

/// A paged find request against the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindQuery {
    /// The object type to find.
    pub object_type: String,
    /// Maximum number of records per page. Must be non-zero.
    pub page_size: usize,
    /// Case-insensitive text matched against monitor names and query ids.
    pub search: Option<String>,
    /// Field to sort by. Stores fall back to query id order.
    pub sort_field: Option<String>,
    /// Sort direction, ascending when absent.
    pub sort_order: Option<SortOrder>,
    /// Projection hint. Stores that cannot project return whole records.
    pub fields: Option<Vec<String>>,
}

impl FindQuery {
    /// A query over all monitors with the default page size.
    pub fn monitors() -> Self {
        Self {
            object_type: MONITOR_OBJECT_TYPE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            sort_field: None,
            sort_order: None,
            fields: None,
        }
    }

    /// Sets the page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the search text.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Sets the sort field and order.
    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    /// Checks the parts of the query every store relies on and returns the
    /// parsed sort field.
    pub fn validate(&self) -> Result<Option<SortField>, FetchError> {
        if self.object_type != MONITOR_OBJECT_TYPE {
            return Err(FetchError::InvalidQuery(format!(
                "unsupported object type '{}'",
                self.object_type
            )));
        }
        if self.page_size == 0 {
            return Err(FetchError::InvalidQuery("page size must be greater than zero".into()));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(FetchError::InvalidQuery(format!(
                "page size {} exceeds the maximum of {MAX_PAGE_SIZE}",
                self.page_size
            )));
        }
        self.sort_field.as_deref().map(str::parse).transpose()
    }

    /// The search text with surrounding whitespace removed, if any remains.
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl Default for FindQuery {
    fn default() -> Self {
        Self::monitors()
    }
}

/// A store of monitor records that can be read page by page.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MonitorStore: Send + Sync {
    /// Opens a cursor over the records matching `query`.
    async fn open(&self, query: &FindQuery) -> Result<Box<dyn MonitorCursor>, FetchError>;
}

/// An open, forward-only cursor over a store snapshot.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MonitorCursor: Send {
    /// Fetches the next page. Returns `None` once the cursor is exhausted.
    async fn next_page(&mut self) -> Result<Option<Vec<MonitorRecord>>, FetchError>;

    /// Releases the cursor. Calling it more than once is a no-op.
    async fn close(&mut self) -> Result<(), FetchError>;
}

/// The directory of locations monitors can run from.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationDirectory: Send + Sync {
    /// Lists the public and private location catalogs.
    async fn list_locations(&self) -> Result<LocationListing, DirectoryError>;
}
