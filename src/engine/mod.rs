//! The inventory engine classifies monitor records, resolves their location
//! labels and folds them into an aggregation result.

pub mod accumulator;
pub mod aggregator;
pub mod classifier;
pub mod registry;
pub mod resolver;

pub use accumulator::AggregationAccumulator;
pub use aggregator::{AggregationError, InventoryAggregator};
pub use classifier::{Classification, MonitorBucket, classify};
pub use registry::{LocationRegistry, RegistryError};
pub use resolver::{LocationResolver, partition_locations};
