//! This module defines `MonitorRecord`, a monitor configuration entity as it is
//! retrieved from the object store.

use serde::{Deserialize, Serialize};

use super::{location::LocationRef, schedule::SchedulePeriod};
use crate::config::deserialize_source_type;

/// Where a monitor's configuration originates from.
///
/// Deserialized through [`deserialize_source_type`], which maps every source
/// other than `project` to [`SourceType::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Pushed from a monitoring project.
    Project,
    /// Any other source, e.g. created through the UI.
    #[default]
    Other,
}

impl SourceType {
    /// Maps a stored source name. Anything but `project` is [`SourceType::Other`].
    pub fn from_stored(source: &str) -> Self {
        match source.trim() {
            s if s.eq_ignore_ascii_case("project") => Self::Project,
            _ => Self::Other,
        }
    }

    /// The stored form of the source type.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Other => "other",
        }
    }
}

/// A monitor configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorRecord {
    /// Stable identifier of the monitor, unique within one snapshot.
    ///
    /// An empty value marks a malformed record and fails aggregation.
    #[serde(default)]
    pub query_id: String,

    /// Display name of the monitor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether the monitor is enabled. Absent means enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Origin of the configuration. Absent means not a project monitor.
    #[serde(
        default,
        deserialize_with = "deserialize_source_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_type: Option<SourceType>,

    /// How often the monitor runs.
    pub schedule: SchedulePeriod,

    /// Locations the monitor runs from, in declaration order. May repeat.
    #[serde(default)]
    pub locations: Vec<LocationRef>,
}

impl MonitorRecord {
    /// Only an explicit `false` disables a monitor.
    pub fn is_enabled(&self) -> bool {
        self.enabled != Some(false)
    }

    /// Returns true if the monitor was pushed from a project.
    pub fn is_project(&self) -> bool {
        self.source_type == Some(SourceType::Project)
    }
}
