//! Turns the locations declared on enabled monitors into label sets, filling
//! in missing labels through the location registry.

use std::collections::HashMap;

use indexmap::IndexSet;

use super::{classifier::classify, registry::LocationRegistry};
use crate::{
    engine::registry::RegistryError,
    models::{LocationRef, MonitorRecord},
};

/// Splits locations into present labels and the distinct ids whose label is
/// missing, both in declaration order.
pub fn partition_locations(locations: &[LocationRef]) -> (Vec<&str>, Vec<&str>) {
    let mut labels = Vec::new();
    let mut missing: Vec<&str> = Vec::new();
    for location in locations {
        match location.label() {
            Some(label) => labels.push(label),
            None if !missing.contains(&location.id.as_str()) => missing.push(&location.id),
            None => {}
        }
    }
    (labels, missing)
}

/// Resolves location labels for the monitors of one aggregation run.
///
/// Ids resolved through the registry are remembered, so each distinct
/// unlabeled id is looked up at most once per run.
pub struct LocationResolver {
    registry: LocationRegistry,
    resolved: HashMap<String, String>,
}

impl LocationResolver {
    /// Creates a resolver over a fresh registry.
    pub fn new(registry: LocationRegistry) -> Self {
        Self { registry, resolved: HashMap::new() }
    }

    /// The registry backing this resolver.
    pub fn registry(&self) -> &LocationRegistry {
        &self.registry
    }

    /// Number of distinct ids resolved through the registry so far.
    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    /// Resolves, in one batch, every unlabeled id on the enabled records of
    /// `records` that has not been resolved yet. Returns how many ids were
    /// looked up.
    pub async fn prefetch(&mut self, records: &[MonitorRecord]) -> Result<usize, RegistryError> {
        let mut pending: IndexSet<&str> = IndexSet::new();
        for record in records.iter().filter(|record| classify(record).is_enabled()) {
            let (_, missing) = partition_locations(&record.locations);
            for id in missing {
                if !self.resolved.contains_key(id) {
                    pending.insert(id);
                }
            }
        }

        if pending.is_empty() {
            return Ok(0);
        }

        let ids: Vec<String> = pending.into_iter().map(str::to_string).collect();
        let labels = self.registry.labels_for(&ids).await?;
        let count = ids.len();
        tracing::debug!(count, "Resolved missing location labels.");
        self.resolved.extend(ids.into_iter().zip(labels));
        Ok(count)
    }

    /// The distinct labels of `record`: present labels first, then resolved
    /// ones, in first appearance order. Ids that were never prefetched fall
    /// back to themselves, like catalog misses do.
    pub fn labels_for(&self, record: &MonitorRecord) -> Vec<String> {
        let (labels, missing) = partition_locations(&record.locations);
        let mut set: IndexSet<&str> = labels.into_iter().collect();
        set.extend(missing.into_iter().map(|id| self.resolved.get(id).map_or(id, String::as_str)));
        set.into_iter().map(str::to_string).collect()
    }

    /// Resolves a single record.
    pub async fn resolve(&mut self, record: &MonitorRecord) -> Result<Vec<String>, RegistryError> {
        self.prefetch(std::slice::from_ref(record)).await?;
        Ok(self.labels_for(record))
    }
}
