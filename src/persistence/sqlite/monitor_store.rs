//! Implementation of the MonitorStore trait for SqliteMonitorStore

use async_trait::async_trait;
use sqlx::{Sqlite, Transaction};

use super::SqliteMonitorStore;
use crate::{
    models::{LocationRef, MonitorRecord, SchedulePeriod, ScheduleUnit, SourceType},
    providers::traits::{FetchError, FindQuery, MonitorCursor, MonitorStore, SortField},
};

// Helper struct for mapping from the database row
#[derive(sqlx::FromRow)]
struct MonitorRow {
    query_id: String,
    name: Option<String>,
    enabled: Option<bool>,
    source_type: Option<String>,
    schedule_number: i64,
    schedule_unit: String,
    locations: String,
}

impl TryFrom<MonitorRow> for MonitorRecord {
    type Error = FetchError;

    fn try_from(row: MonitorRow) -> Result<Self, Self::Error> {
        let decode_error =
            |reason: String| FetchError::Decode { query_id: row.query_id.clone(), reason };

        let number = u64::try_from(row.schedule_number)
            .map_err(|e| decode_error(format!("invalid schedule number: {e}")))?;
        let unit = row
            .schedule_unit
            .parse::<ScheduleUnit>()
            .map_err(|e| decode_error(format!("{e}")))?;
        let locations: Vec<LocationRef> = serde_json::from_str(&row.locations)
            .map_err(|e| decode_error(format!("invalid locations: {e}")))?;
        let source_type = row.source_type.as_deref().map(SourceType::from_stored);

        Ok(MonitorRecord {
            query_id: row.query_id,
            name: row.name,
            enabled: row.enabled,
            source_type,
            schedule: SchedulePeriod::new(number, unit),
            locations,
        })
    }
}

/// Escapes LIKE wildcards so the search text matches literally.
fn like_pattern(search: &str) -> String {
    let escaped = search
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn build_page_sql(query: &FindQuery, sort_field: Option<SortField>) -> String {
    let order = query.sort_order.unwrap_or_default().as_sql();
    let order_by = match sort_field {
        Some(SortField::Name) => format!("COALESCE(name, '') {order}, query_id ASC"),
        Some(SortField::QueryId) => format!("query_id {order}"),
        None => "query_id ASC".to_string(),
    };

    format!(
        "SELECT query_id, name, enabled, source_type, schedule_number, schedule_unit, locations \
         FROM monitors \
         WHERE ?1 IS NULL \
            OR LOWER(query_id) LIKE ?1 ESCAPE '\\' \
            OR LOWER(COALESCE(name, '')) LIKE ?1 ESCAPE '\\' \
         ORDER BY {order_by} \
         LIMIT ?2 OFFSET ?3"
    )
}

#[async_trait]
impl MonitorStore for SqliteMonitorStore {
    /// Opens a read transaction so every page comes from the same snapshot.
    #[tracing::instrument(skip(self), level = "debug")]
    async fn open(&self, query: &FindQuery) -> Result<Box<dyn MonitorCursor>, FetchError> {
        let sort_field = query.validate()?;
        let page_size = i64::try_from(query.page_size)
            .map_err(|e| FetchError::InvalidQuery(format!("page size out of range: {e}")))?;

        let tx = self.pool.begin().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to begin read transaction.");
            FetchError::Open(e.to_string())
        })?;

        tracing::debug!(page_size, sort_field = ?sort_field, "Opened SQLite monitor cursor.");

        Ok(Box::new(SqliteMonitorCursor {
            tx: Some(tx),
            sql: build_page_sql(query, sort_field),
            pattern: query.search_text().map(like_pattern),
            page_size,
            offset: 0,
            exhausted: false,
        }))
    }
}

/// A cursor paging through monitors inside one read transaction.
struct SqliteMonitorCursor {
    tx: Option<Transaction<'static, Sqlite>>,
    sql: String,
    pattern: Option<String>,
    page_size: i64,
    offset: i64,
    exhausted: bool,
}

#[async_trait]
impl MonitorCursor for SqliteMonitorCursor {
    async fn next_page(&mut self) -> Result<Option<Vec<MonitorRecord>>, FetchError> {
        if self.exhausted {
            return Ok(None);
        }
        let Some(tx) = self.tx.as_mut() else {
            return Err(FetchError::Page("cursor is closed".into()));
        };

        let rows: Vec<MonitorRow> = sqlx::query_as(&self.sql)
            .bind(self.pattern.as_deref())
            .bind(self.page_size)
            .bind(self.offset)
            .fetch_all(&mut **tx)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, offset = self.offset, "Failed to fetch monitor page.");
                FetchError::Page(e.to_string())
            })?;

        let fetched = i64::try_from(rows.len()).unwrap_or(i64::MAX);
        if fetched < self.page_size {
            self.exhausted = true;
        }
        if rows.is_empty() {
            return Ok(None);
        }
        self.offset += fetched;

        let page = rows.into_iter().map(MonitorRecord::try_from).collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(records = page.len(), offset = self.offset, "Fetched monitor page.");
        Ok(Some(page))
    }

    async fn close(&mut self) -> Result<(), FetchError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await.map_err(|e| FetchError::Close(e.to_string()))?;
            tracing::debug!(offset = self.offset, "Closed SQLite monitor cursor.");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{providers::traits::SortOrder, test_helpers::MonitorRecordBuilder};

    async fn seeded_store(monitors: &[MonitorRecord]) -> SqliteMonitorStore {
        let store = SqliteMonitorStore::new("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory db");
        store.run_migrations().await.expect("Failed to run migrations");
        store.add_monitors(monitors).await.expect("Failed to seed monitors");
        store
    }

    async fn drain_ids(store: &SqliteMonitorStore, query: &FindQuery) -> Vec<Vec<String>> {
        let mut cursor = store.open(query).await.unwrap();
        let mut pages = Vec::new();
        while let Some(page) = cursor.next_page().await.unwrap() {
            pages.push(page.into_iter().map(|m| m.query_id).collect());
        }
        cursor.close().await.unwrap();
        pages
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_Off"), "%50\\%\\_off%");
    }

    #[tokio::test]
    async fn test_round_trips_records() {
        let monitor = MonitorRecordBuilder::new()
            .query_id("checkout")
            .name("Checkout")
            .enabled(false)
            .source_type(SourceType::Project)
            .schedule(10, ScheduleUnit::Minutes)
            .locations(vec![
                LocationRef::labeled("us_east", "US East"),
                LocationRef::unlabeled("loc-7"),
            ])
            .build();
        let store = seeded_store(std::slice::from_ref(&monitor)).await;

        let mut cursor = store.open(&FindQuery::monitors()).await.unwrap();
        let page = cursor.next_page().await.unwrap().unwrap();
        cursor.close().await.unwrap();

        assert_eq!(page, vec![monitor]);
    }

    #[tokio::test]
    async fn test_pages_by_page_size() {
        let monitors: Vec<MonitorRecord> = ["a", "b", "c", "d", "e"]
            .iter()
            .map(|id| MonitorRecordBuilder::new().query_id(id).build())
            .collect();
        let store = seeded_store(&monitors).await;

        let pages = drain_ids(&store, &FindQuery::monitors().with_page_size(2)).await;

        assert_eq!(pages, vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]);
    }

    #[tokio::test]
    async fn test_exact_multiple_of_page_size() {
        let monitors: Vec<MonitorRecord> =
            ["a", "b"].iter().map(|id| MonitorRecordBuilder::new().query_id(id).build()).collect();
        let store = seeded_store(&monitors).await;

        let pages = drain_ids(&store, &FindQuery::monitors().with_page_size(2)).await;

        assert_eq!(pages, vec![vec!["a", "b"]]);
    }

    #[tokio::test]
    async fn test_search_and_sort() {
        let store = seeded_store(&[
            MonitorRecordBuilder::new().query_id("api-1").name("Zeta API").build(),
            MonitorRecordBuilder::new().query_id("web-1").name("Homepage").build(),
            MonitorRecordBuilder::new().query_id("api-2").name("Alpha API").build(),
            MonitorRecordBuilder::new().query_id("promo").name("100% off_sale").build(),
        ])
        .await;

        let query = FindQuery::monitors().with_search("api").with_sort("name", SortOrder::Asc);
        assert_eq!(drain_ids(&store, &query).await, vec![vec!["api-2", "api-1"]]);

        let query = FindQuery::monitors().with_search("%").with_sort("query_id", SortOrder::Desc);
        assert_eq!(drain_ids(&store, &query).await, vec![vec!["promo"]]);

        let query = FindQuery::monitors().with_sort("query_id", SortOrder::Desc);
        assert_eq!(drain_ids(&store, &query).await, vec![vec!["web-1", "promo", "api-2", "api-1"]]);
    }

    #[tokio::test]
    async fn test_next_page_after_close_fails() {
        let store = seeded_store(&[MonitorRecordBuilder::new().query_id("a").build()]).await;
        let mut cursor = store.open(&FindQuery::monitors()).await.unwrap();

        cursor.close().await.unwrap();
        cursor.close().await.unwrap();

        assert!(matches!(cursor.next_page().await, Err(FetchError::Page(_))));
    }

    #[tokio::test]
    async fn test_open_rejects_unknown_sort_field() {
        let store = seeded_store(&[]).await;
        let result = store.open(&FindQuery::monitors().with_sort("enabled", SortOrder::Asc)).await;
        assert!(matches!(result, Err(FetchError::InvalidQuery(_))));
    }
}
