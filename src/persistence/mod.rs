//! Storage of monitor configuration records.

pub mod error;
pub mod sqlite;
pub use sqlite::SqliteMonitorStore;
