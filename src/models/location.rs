//! Location references carried by monitors and the canonical catalog entries
//! served by the location directory.

use serde::{Deserialize, Serialize};

/// A location declared on a monitor record.
///
/// Older records predate label denormalization and carry only the `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    /// Identifier of the location.
    pub id: String,
    /// Human-readable label, when the record carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl LocationRef {
    /// Creates a location reference with a label.
    pub fn labeled(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: Some(label.into()) }
    }

    /// Creates a location reference without a label.
    pub fn unlabeled(id: impl Into<String>) -> Self {
        Self { id: id.into(), label: None }
    }

    /// Returns the label if present. An empty label counts as missing.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref().filter(|label| !label.is_empty())
    }
}

/// A canonical `{id, label}` pair from the location directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLocation {
    /// Identifier of the location.
    pub id: String,
    /// Human-readable label.
    pub label: String,
}

impl ServiceLocation {
    /// Creates a new service location.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into() }
    }
}

/// The public and private location catalogs returned by the directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationListing {
    /// Managed locations available to every monitor.
    #[serde(default)]
    pub public_locations: Vec<ServiceLocation>,
    /// Locations hosted by the user.
    #[serde(default)]
    pub private_locations: Vec<ServiceLocation>,
}

impl LocationListing {
    /// All locations, public first.
    pub fn into_locations(self) -> impl Iterator<Item = ServiceLocation> {
        self.public_locations.into_iter().chain(self.private_locations)
    }

    /// Total number of locations across both catalogs.
    pub fn len(&self) -> usize {
        self.public_locations.len() + self.private_locations.len()
    }

    /// Returns true if both catalogs are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
