//! Commands run by the `monitor-inventory` binary.

pub mod aggregate;
pub mod import;

use thiserror::Error;

pub use aggregate::AggregateArgs;
pub use import::ImportArgs;

use crate::{
    config::LoaderError, engine::AggregationError, persistence::error::PersistenceError,
    providers::FetchError,
};

/// Errors surfaced by the commands.
#[derive(Error, Debug)]
pub enum Error {
    /// The application configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ::config::ConfigError),
    /// The monitor file could not be loaded.
    #[error("Monitor loading error: {0}")]
    MonitorLoading(#[from] LoaderError),
    /// The monitor store failed.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    /// A command line query argument was invalid.
    #[error("Invalid query: {0}")]
    Query(#[from] FetchError),
    /// The aggregation run failed.
    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),
    /// The result could not be serialized.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
