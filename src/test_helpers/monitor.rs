//! A builder for creating `MonitorRecord` instances in tests.

use crate::models::{LocationRef, MonitorRecord, SchedulePeriod, ScheduleUnit, SourceType};

/// A builder for creating `MonitorRecord` instances in tests.
pub struct MonitorRecordBuilder {
    query_id: Option<String>,
    name: Option<String>,
    enabled: Option<bool>,
    source_type: Option<SourceType>,
    schedule: Option<SchedulePeriod>,
    locations: Option<Vec<LocationRef>>,
}

impl Default for MonitorRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorRecordBuilder {
    /// Creates a new `MonitorRecordBuilder` instance.
    pub fn new() -> Self {
        MonitorRecordBuilder {
            query_id: None,
            name: None,
            enabled: None,
            source_type: None,
            schedule: None,
            locations: None,
        }
    }

    /// Sets the query id for the monitor.
    pub fn query_id(mut self, query_id: &str) -> Self {
        self.query_id = Some(query_id.to_string());
        self
    }

    /// Sets the name for the monitor.
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Sets the enabled flag explicitly.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Sets the source type for the monitor.
    pub fn source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type);
        self
    }

    /// Sets the schedule for the monitor.
    pub fn schedule(mut self, number: u64, unit: ScheduleUnit) -> Self {
        self.schedule = Some(SchedulePeriod::new(number, unit));
        self
    }

    /// Sets the locations for the monitor.
    pub fn locations(mut self, locations: Vec<LocationRef>) -> Self {
        self.locations = Some(locations);
        self
    }

    /// Builds the `MonitorRecord` instance.
    pub fn build(self) -> MonitorRecord {
        MonitorRecord {
            query_id: self.query_id.unwrap_or("test-monitor".to_string()),
            name: self.name,
            enabled: self.enabled,
            source_type: self.source_type,
            schedule: self.schedule.unwrap_or(SchedulePeriod::new(1, ScheduleUnit::Minutes)),
            locations: self.locations.unwrap_or_default(),
        }
    }
}
