//! A set of helpers for testing

mod location;
mod monitor;

pub use location::{create_test_location_directory, location_listing};
pub use monitor::MonitorRecordBuilder;
