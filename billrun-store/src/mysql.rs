//! MySQL-backed status store

use async_trait::async_trait;
use billrun_core::{JobId, JobStatus, StatusRow};
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use std::time::Duration;
use tracing::debug;

use crate::StatusStore;
use crate::error::Result;

/// Status store reading the billing system's `billing_request` table
#[derive(Debug, Clone)]
pub struct MySqlStatusStore {
    pool: MySqlPool,
}

impl MySqlStatusStore {
    /// Opens the connection pool once; it is reused for every poll
    pub async fn connect(options: MySqlConnectOptions) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StatusStore for MySqlStatusStore {
    async fn fetch_status(&self, id: &JobId) -> Result<Vec<StatusRow>> {
        let rows = sqlx::query_as::<_, BillingRequestRow>(
            r#"
            SELECT name, status
            FROM billing_request
            WHERE uuid = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} status row(s) for request {}", rows.len(), id);

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct BillingRequestRow {
    name: String,
    status: String,
}

impl From<BillingRequestRow> for StatusRow {
    fn from(row: BillingRequestRow) -> Self {
        StatusRow {
            name: row.name,
            status: JobStatus::from_label(&row.status),
        }
    }
}
