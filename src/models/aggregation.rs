//! The summary produced by one aggregation run.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The inventory summary over every monitor in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// The longest schedule period among enabled monitors, in milliseconds.
    pub max_period_ms: u64,

    /// Query ids of every monitor observed, in arrival order.
    pub all_ids: Vec<String>,

    /// Query ids of enabled monitors, in arrival order.
    pub enabled_ids: Vec<String>,

    /// Number of location slots declared on disabled monitors.
    pub disabled_location_instance_count: usize,

    /// Number of disabled monitors.
    pub disabled_monitor_count: usize,

    /// Number of monitors pushed from a project.
    pub project_monitor_count: usize,

    /// Distinct location labels per enabled monitor.
    pub monitor_location_map: BTreeMap<String, Vec<String>>,

    /// Every distinct location label in use, in order of first appearance.
    pub all_distinct_locations: Vec<String>,
}
