//! Collaborators the inventory engine reads from: the monitor object store and
//! the location directory.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileLocationDirectory;
pub use memory::{InMemoryMonitorStore, StaticLocationDirectory};
pub use traits::{
    DEFAULT_PAGE_SIZE, DirectoryError, FetchError, FindQuery, LocationDirectory,
    MAX_PAGE_SIZE, MONITOR_OBJECT_TYPE, MonitorCursor, MonitorStore, SortField, SortOrder,
};
