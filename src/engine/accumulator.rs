//! Folds classified and resolved monitor records into an `AggregationResult`.

use std::collections::BTreeMap;

use indexmap::IndexSet;

use super::classifier::{Classification, MonitorBucket};
use crate::models::{AggregationResult, MonitorRecord, period_to_ms};

/// The running state of one aggregation.
#[derive(Debug, Default)]
pub struct AggregationAccumulator {
    max_period_ms: u64,
    all_ids: Vec<String>,
    enabled_ids: Vec<String>,
    disabled_location_instance_count: usize,
    disabled_monitor_count: usize,
    project_monitor_count: usize,
    monitor_location_map: BTreeMap<String, IndexSet<String>>,
    distinct_locations: IndexSet<String>,
}

impl AggregationAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records folded so far.
    pub fn records_seen(&self) -> usize {
        self.all_ids.len()
    }

    /// Folds one record. `labels` are the record's resolved location labels
    /// and are ignored for disabled monitors.
    pub fn fold(
        &mut self,
        record: &MonitorRecord,
        classification: Classification,
        labels: Vec<String>,
    ) {
        self.all_ids.push(record.query_id.clone());
        if classification.is_project {
            self.project_monitor_count += 1;
        }

        match classification.bucket {
            MonitorBucket::Disabled => {
                self.disabled_monitor_count += 1;
                self.disabled_location_instance_count += record.locations.len();
            }
            MonitorBucket::Enabled => {
                self.enabled_ids.push(record.query_id.clone());
                self.distinct_locations.extend(labels.iter().cloned());
                self.monitor_location_map
                    .entry(record.query_id.clone())
                    .or_default()
                    .extend(labels);
                self.max_period_ms = self.max_period_ms.max(period_to_ms(&record.schedule));
            }
        }
    }

    /// Materializes the result. Distinct locations keep first appearance order.
    pub fn finish(self) -> AggregationResult {
        AggregationResult {
            max_period_ms: self.max_period_ms,
            all_ids: self.all_ids,
            enabled_ids: self.enabled_ids,
            disabled_location_instance_count: self.disabled_location_instance_count,
            disabled_monitor_count: self.disabled_monitor_count,
            project_monitor_count: self.project_monitor_count,
            monitor_location_map: self
                .monitor_location_map
                .into_iter()
                .map(|(query_id, labels)| (query_id, labels.into_iter().collect()))
                .collect(),
            all_distinct_locations: self.distinct_locations.into_iter().collect(),
        }
    }
}
