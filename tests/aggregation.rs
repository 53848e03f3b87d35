//! Integration tests for the inventory aggregator

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use monitor_inventory::{
    engine::{AggregationError, InventoryAggregator},
    models::{
        AggregationResult, LocationListing, LocationRef, MonitorRecord, ScheduleUnit, SourceType,
        period_to_ms,
    },
    providers::{
        DirectoryError, FetchError, FindQuery, InMemoryMonitorStore, LocationDirectory,
        StaticLocationDirectory,
    },
    test_helpers::{MonitorRecordBuilder, create_test_location_directory},
};

fn tokyo_directory() -> StaticLocationDirectory {
    create_test_location_directory(&[("us_east", "us-east")], &[("loc-7", "Tokyo")])
}

fn aggregator(
    store: &InMemoryMonitorStore,
    directory: &StaticLocationDirectory,
) -> InventoryAggregator {
    InventoryAggregator::new(Arc::new(store.clone()), Arc::new(directory.clone()))
}

fn mixed_inventory() -> Vec<MonitorRecord> {
    vec![
        MonitorRecordBuilder::new()
            .query_id("homepage")
            .name("Homepage")
            .schedule(3, ScheduleUnit::Minutes)
            .locations(vec![
                LocationRef::labeled("us_east", "us-east"),
                LocationRef::unlabeled("loc-7"),
            ])
            .build(),
        MonitorRecordBuilder::new()
            .query_id("checkout")
            .name("Checkout")
            .source_type(SourceType::Project)
            .schedule(10, ScheduleUnit::Minutes)
            .locations(vec![LocationRef::unlabeled("loc-7"), LocationRef::unlabeled("orphan")])
            .build(),
        MonitorRecordBuilder::new()
            .query_id("legacy")
            .name("Legacy")
            .enabled(false)
            .source_type(SourceType::Project)
            .schedule(1, ScheduleUnit::Hours)
            .locations(vec![
                LocationRef::unlabeled("loc-7"),
                LocationRef::labeled("us_east", "us-east"),
                LocationRef::unlabeled("loc-9"),
            ])
            .build(),
        MonitorRecordBuilder::new()
            .query_id("api")
            .name("API")
            .enabled(true)
            .schedule(30, ScheduleUnit::Seconds)
            .locations(vec![LocationRef::labeled("eu", "eu-west")])
            .build(),
        MonitorRecordBuilder::new()
            .query_id("tcp")
            .name("TCP")
            .enabled(false)
            .schedule(2, ScheduleUnit::Days)
            .locations(vec![LocationRef::labeled("eu", "eu-west")])
            .build(),
    ]
}

#[tokio::test]
async fn test_single_labeled_enabled_monitor() {
    let store = InMemoryMonitorStore::new(vec![
        MonitorRecordBuilder::new()
            .query_id("id")
            .schedule(60, ScheduleUnit::Seconds)
            .locations(vec![LocationRef::labeled("us_east", "us-east")])
            .build(),
    ]);
    let directory = tokyo_directory();

    let result = aggregator(&store, &directory).aggregate(&FindQuery::monitors()).await.unwrap();

    assert_eq!(result.max_period_ms, 60_000);
    assert_eq!(result.enabled_ids, vec!["id"]);
    assert_eq!(
        result.monitor_location_map,
        BTreeMap::from([("id".to_string(), vec!["us-east".to_string()])])
    );
    assert_eq!(result.all_distinct_locations, vec!["us-east"]);
    assert_eq!(directory.load_count(), 0, "labeled locations must not load the catalog");
}

#[tokio::test]
async fn test_single_disabled_monitor() {
    let store = InMemoryMonitorStore::new(vec![
        MonitorRecordBuilder::new()
            .query_id("off")
            .enabled(false)
            .locations(vec![
                LocationRef::unlabeled("loc-7"),
                LocationRef::labeled("us_east", "us-east"),
            ])
            .build(),
    ]);
    let directory = tokyo_directory();

    let result = aggregator(&store, &directory).aggregate(&FindQuery::monitors()).await.unwrap();

    assert_eq!(result.disabled_monitor_count, 1);
    assert_eq!(result.disabled_location_instance_count, 2);
    assert!(result.enabled_ids.is_empty());
    assert!(result.monitor_location_map.is_empty());
    assert_eq!(result.max_period_ms, 0);
    assert_eq!(directory.load_count(), 0);
}

#[tokio::test]
async fn test_unlabeled_location_resolves_through_registry_once() {
    let records = (0..4)
        .map(|i| {
            MonitorRecordBuilder::new()
                .query_id(&format!("m-{i}"))
                .locations(vec![LocationRef::unlabeled("loc-7")])
                .build()
        })
        .collect();
    let store = InMemoryMonitorStore::new(records);
    let directory = tokyo_directory();

    // One record per page, so resolution spans several pages.
    let result = aggregator(&store, &directory)
        .aggregate(&FindQuery::monitors().with_page_size(1))
        .await
        .unwrap();

    assert_eq!(store.pages_served(), 4);
    assert_eq!(directory.load_count(), 1);
    for i in 0..4 {
        assert_eq!(result.monitor_location_map[&format!("m-{i}")], vec!["Tokyo"]);
    }
    assert_eq!(result.all_distinct_locations, vec!["Tokyo"]);
}

#[tokio::test]
async fn test_empty_inventory() {
    let store = InMemoryMonitorStore::new(Vec::new());
    let directory = tokyo_directory();

    let result = aggregator(&store, &directory).aggregate(&FindQuery::monitors()).await.unwrap();

    assert_eq!(result, AggregationResult::default());
    assert_eq!(store.closed_cursors(), 1);
    assert_eq!(directory.load_count(), 0);
}

#[tokio::test]
async fn test_summary_properties_hold_for_mixed_inventory() {
    let records = mixed_inventory();
    let store = InMemoryMonitorStore::new(records.clone());
    let directory = tokyo_directory();

    let result = aggregator(&store, &directory)
        .aggregate(&FindQuery::monitors().with_page_size(2))
        .await
        .unwrap();

    let total = records.len();
    assert_eq!(result.all_ids.len(), total);
    assert_eq!(result.enabled_ids.len() + result.disabled_monitor_count, total);
    assert!(result.enabled_ids.iter().all(|id| result.all_ids.contains(id)));

    let disabled_slots: usize =
        records.iter().filter(|r| r.enabled == Some(false)).map(|r| r.locations.len()).sum();
    assert_eq!(result.disabled_location_instance_count, disabled_slots);

    let max_enabled = records
        .iter()
        .filter(|r| r.enabled != Some(false))
        .map(|r| period_to_ms(&r.schedule))
        .max()
        .unwrap_or(0);
    assert_eq!(result.max_period_ms, max_enabled);
    assert_eq!(result.max_period_ms, 600_000);

    for labels in result.monitor_location_map.values() {
        assert!(labels.iter().all(|label| result.all_distinct_locations.contains(label)));
    }

    assert_eq!(result.project_monitor_count, 2);
    assert_eq!(result.monitor_location_map["homepage"], vec!["us-east", "Tokyo"]);
    assert_eq!(result.monitor_location_map["checkout"], vec!["Tokyo", "orphan"]);
    assert_eq!(result.monitor_location_map["api"], vec!["eu-west"]);
    assert_eq!(result.all_distinct_locations, vec!["us-east", "Tokyo", "orphan", "eu-west"]);
    assert_eq!(directory.load_count(), 1);
}

#[tokio::test]
async fn test_repeated_runs_are_identical_and_load_per_run() {
    let store = InMemoryMonitorStore::new(mixed_inventory());
    let directory = tokyo_directory();
    let aggregator = aggregator(&store, &directory);

    let first = aggregator.aggregate(&FindQuery::monitors().with_page_size(3)).await.unwrap();
    let second = aggregator.aggregate(&FindQuery::monitors().with_page_size(3)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(directory.load_count(), 2, "each run builds its own registry");
    assert_eq!(store.opened_cursors(), 2);
    assert_eq!(store.closed_cursors(), 2);
}

#[tokio::test]
async fn test_result_does_not_depend_on_page_size() {
    let store = InMemoryMonitorStore::new(mixed_inventory());
    let directory = tokyo_directory();
    let aggregator = aggregator(&store, &directory);

    let whole = aggregator.aggregate(&FindQuery::monitors()).await.unwrap();
    for page_size in 1..=5 {
        let paged =
            aggregator.aggregate(&FindQuery::monitors().with_page_size(page_size)).await.unwrap();
        assert_eq!(paged, whole, "page size {page_size}");
    }
}

#[tokio::test]
async fn test_search_limits_the_inventory() {
    let store = InMemoryMonitorStore::new(mixed_inventory());
    let directory = tokyo_directory();

    let result = aggregator(&store, &directory)
        .aggregate(&FindQuery::monitors().with_search("check"))
        .await
        .unwrap();

    assert_eq!(result.all_ids, vec!["checkout"]);
}

#[tokio::test]
async fn test_fetch_failure_closes_cursor_and_returns_no_result() {
    let store = InMemoryMonitorStore::new(mixed_inventory()).fail_after_pages(1);
    let directory = tokyo_directory();

    let result = aggregator(&store, &directory)
        .aggregate(&FindQuery::monitors().with_page_size(2))
        .await;

    assert!(matches!(result, Err(AggregationError::Fetch(FetchError::Page(_)))));
    assert_eq!(store.opened_cursors(), 1);
    assert_eq!(store.closed_cursors(), 1);
}

#[tokio::test]
async fn test_directory_failure_fails_run_and_is_retried_next_run() {
    let store = InMemoryMonitorStore::new(mixed_inventory());
    let failing = StaticLocationDirectory::unavailable("directory offline");

    let result = aggregator(&store, &failing).aggregate(&FindQuery::monitors()).await;

    assert!(matches!(result, Err(AggregationError::Registry(_))));
    assert_eq!(store.closed_cursors(), 1);

    let result = aggregator(&store, &failing).aggregate(&FindQuery::monitors()).await;
    assert!(result.is_err());
    assert_eq!(failing.load_count(), 2, "a failed load is never cached");
}

#[tokio::test]
async fn test_malformed_record_fails_run() {
    let mut records = mixed_inventory();
    records[3].query_id.clear();
    let store = InMemoryMonitorStore::new(records);
    let directory = tokyo_directory();

    let result = aggregator(&store, &directory)
        .aggregate(&FindQuery::monitors().with_page_size(2))
        .await;

    assert!(matches!(result, Err(AggregationError::MalformedRecord { position: 3 })));
    assert_eq!(store.closed_cursors(), 1);
}

struct StalledDirectory;

#[async_trait]
impl LocationDirectory for StalledDirectory {
    async fn list_locations(&self) -> Result<LocationListing, DirectoryError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(LocationListing::default())
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_run_still_closes_cursor() {
    let store = InMemoryMonitorStore::new(mixed_inventory());
    let aggregator = InventoryAggregator::new(Arc::new(store.clone()), Arc::new(StalledDirectory));

    let query = FindQuery::monitors();
    let result =
        tokio::time::timeout(Duration::from_millis(50), aggregator.aggregate(&query)).await;

    assert!(result.is_err(), "the catalog load never finishes");
    assert_eq!(store.opened_cursors(), 1);

    for _ in 0..10 {
        if store.closed_cursors() == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(store.closed_cursors(), 1);
}
