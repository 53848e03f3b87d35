//! Configuration module for the inventory service.

mod app_config;
mod helpers;
mod loader;

pub use app_config::AppConfig;
pub use helpers::{
    deserialize_source_type, deserialize_u64_from_str_or_int, serialize_u64_as_str,
};
pub use loader::{ConfigLoader, LoaderError};
