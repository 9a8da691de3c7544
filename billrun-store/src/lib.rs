//! Billrun Status Store
//!
//! Read-only access to the table where the billing system records the status
//! of each billing request.
//!
//! The store is an oracle owned by another system: this crate never writes,
//! never caches and never opens a transaction. Every call re-queries.
//!
//! # Example
//!
//! ```no_run
//! use billrun_core::JobId;
//! use billrun_store::{MySqlStatusStore, StatusStore};
//! use sqlx::mysql::MySqlConnectOptions;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = MySqlConnectOptions::new()
//!         .host("localhost")
//!         .username("root")
//!         .database("billing");
//!     let store = MySqlStatusStore::connect(options).await?;
//!
//!     let id = JobId::parse("ABCDEFGHIJ")?;
//!     for row in store.fetch_status(&id).await? {
//!         println!("{} {}", row.name, row.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
#[cfg(any(test, feature = "testing"))]
mod memory;
mod mysql;

pub use error::{Result, StoreError};
#[cfg(any(test, feature = "testing"))]
pub use memory::ScriptedStatusStore;
pub use mysql::MySqlStatusStore;

use async_trait::async_trait;
use billrun_core::{JobId, StatusRow};

/// Query interface over billing request status
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Returns the current `(name, status)` rows for a billing request
    ///
    /// Zero rows is a valid answer (the request is not visible yet).
    /// Errors are fatal to the caller's wait.
    async fn fetch_status(&self, id: &JobId) -> Result<Vec<StatusRow>>;
}
