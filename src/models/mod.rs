//! Data models shared across the inventory engine, its collaborators and the
//! command line.

pub mod aggregation;
pub mod location;
pub mod monitor;
pub mod schedule;

pub use aggregation::AggregationResult;
pub use location::{LocationListing, LocationRef, ServiceLocation};
pub use monitor::{MonitorRecord, SourceType};
pub use schedule::{SchedulePeriod, ScheduleUnit, period_to_ms};
