//! Sorts monitor records into enabled and disabled buckets.

use crate::models::MonitorRecord;

/// The bucket a monitor is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorBucket {
    /// The monitor runs.
    Enabled,
    /// The monitor is switched off.
    Disabled,
}

/// The outcome of classifying one monitor record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether the monitor runs.
    pub bucket: MonitorBucket,
    /// Whether the monitor was pushed from a project.
    pub is_project: bool,
}

impl Classification {
    /// Returns true for the enabled bucket.
    pub fn is_enabled(&self) -> bool {
        self.bucket == MonitorBucket::Enabled
    }
}

/// Classifies a record. Only an explicit `enabled: false` disables a monitor,
/// and only `source_type: project` marks it as a project monitor.
pub fn classify(record: &MonitorRecord) -> Classification {
    let bucket =
        if record.is_enabled() { MonitorBucket::Enabled } else { MonitorBucket::Disabled };
    Classification { bucket, is_project: record.is_project() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::SourceType, test_helpers::MonitorRecordBuilder};

    #[test]
    fn test_absent_enabled_is_enabled() {
        let classification = classify(&MonitorRecordBuilder::new().build());
        assert_eq!(
            classification,
            Classification { bucket: MonitorBucket::Enabled, is_project: false }
        );
    }

    #[test]
    fn test_explicit_flags() {
        let enabled = classify(&MonitorRecordBuilder::new().enabled(true).build());
        assert!(enabled.is_enabled());

        let disabled = classify(&MonitorRecordBuilder::new().enabled(false).build());
        assert_eq!(disabled.bucket, MonitorBucket::Disabled);
        assert!(!disabled.is_enabled());
    }

    #[test]
    fn test_project_source() {
        let project = classify(
            &MonitorRecordBuilder::new().enabled(false).source_type(SourceType::Project).build(),
        );
        assert!(project.is_project);
        assert_eq!(project.bucket, MonitorBucket::Disabled);

        let other = classify(&MonitorRecordBuilder::new().source_type(SourceType::Other).build());
        assert!(!other.is_project);
    }
}
