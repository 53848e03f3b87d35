//! This module provides a SQLite-backed monitor object store.

use std::str::FromStr;

use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

mod monitor_store;

use crate::{models::MonitorRecord, persistence::error::PersistenceError};

/// A monitor object store persisted in SQLite.
pub struct SqliteMonitorStore {
    /// The SQLite connection pool used for database operations.
    pool: SqlitePool,
}

impl SqliteMonitorStore {
    /// Creates a new instance of SqliteMonitorStore with the provided
    /// database URL. This will create the database file if it does not
    /// exist.
    #[tracing::instrument(level = "info")]
    pub async fn new(database_url: &str) -> Result<Self, PersistenceError> {
        tracing::debug!(database_url, "Attempting to connect to SQLite database.");
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| PersistenceError::InvalidInput(e.to_string()))?
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            PersistenceError::OperationFailed(format!("Failed to connect to database: {}", e))
        })?;
        tracing::info!(database_url, "Successfully connected to SQLite database.");
        Ok(Self { pool })
    }

    /// Runs database migrations.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn run_migrations(&self) -> Result<(), PersistenceError> {
        tracing::debug!("Running database migrations.");
        sqlx::migrate!("./migrations").run(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run database migrations.");
            PersistenceError::MigrationError(e.to_string())
        })?;
        tracing::info!("Database migrations completed successfully.");
        Ok(())
    }

    /// Closes the connection pool gracefully.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn close(&self) {
        tracing::debug!("Closing SQLite connection pool.");
        self.pool.close().await;
        tracing::info!("SQLite connection pool closed successfully.");
    }

    /// Inserts or replaces `monitors`, keyed by query id, in one transaction.
    #[tracing::instrument(skip(self, monitors), fields(count = monitors.len()), level = "debug")]
    pub async fn add_monitors(&self, monitors: &[MonitorRecord]) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to begin transaction.");
            PersistenceError::OperationFailed(e.to_string())
        })?;

        for monitor in monitors {
            if monitor.query_id.is_empty() {
                return Err(PersistenceError::InvalidInput(
                    "monitor query id must not be empty".into(),
                ));
            }
            let number = i64::try_from(monitor.schedule.number).map_err(|e| {
                tracing::error!(
                    error = %e,
                    query_id = %monitor.query_id,
                    "Schedule number does not fit in i64."
                );
                PersistenceError::InvalidInput(e.to_string())
            })?;
            let locations = serde_json::to_string(&monitor.locations)
                .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

            sqlx::query(
                "INSERT OR REPLACE INTO monitors \
                 (query_id, name, enabled, source_type, schedule_number, schedule_unit, locations) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&monitor.query_id)
            .bind(&monitor.name)
            .bind(monitor.enabled)
            .bind(monitor.source_type.map(|source| source.as_str()))
            .bind(number)
            .bind(monitor.schedule.unit.as_str())
            .bind(locations)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    query_id = %monitor.query_id,
                    "Failed to insert monitor."
                );
                PersistenceError::OperationFailed(e.to_string())
            })?;
        }

        tx.commit().await.map_err(|e| PersistenceError::OperationFailed(e.to_string()))?;
        tracing::info!(count = monitors.len(), "Monitors stored successfully.");
        Ok(())
    }

    /// Deletes every stored monitor.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn clear_monitors(&self) -> Result<(), PersistenceError> {
        sqlx::query("DELETE FROM monitors").execute(&self.pool).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to clear monitors.");
            PersistenceError::OperationFailed(e.to_string())
        })?;
        tracing::debug!("Monitors cleared.");
        Ok(())
    }

    /// Returns the number of stored monitors.
    pub async fn count_monitors(&self) -> Result<u64, PersistenceError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM monitors")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PersistenceError::OperationFailed(e.to_string()))?;
        u64::try_from(count).map_err(|e| PersistenceError::OperationFailed(e.to_string()))
    }
}
