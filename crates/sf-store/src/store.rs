//! Entity store contract
//!
//! Every write replaces a collection in its entirety; there are no partial
//! updates and no transactions. Concurrent writers race at collection
//! granularity and the later write wins in full.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backup::{BackupInfo, BackupKind, RestoreOutcome};
use crate::collection::Collection;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Transport failure; the caller degrades to cache-only operation.
    #[error("Store unreachable: {0}")]
    Unreachable(String),

    /// A collection document exists but does not parse. Fatal for that read;
    /// the caller falls back to an empty collection.
    #[error("Malformed document for {collection}: {message}")]
    Malformed {
        collection: &'static str,
        message: String,
    },

    #[error("Backup not found: {0}")]
    BackupNotFound(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// A full snapshot of all four collections, the unit of bootstrap reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreSnapshot {
    pub users: Vec<Value>,
    pub projects: Vec<Value>,
    pub processes: Vec<Value>,
    pub daily_reports: Vec<Value>,
}

impl StoreSnapshot {
    pub fn collection(&self, collection: Collection) -> &Vec<Value> {
        match collection {
            Collection::Users => &self.users,
            Collection::Projects => &self.projects,
            Collection::WorkProcesses => &self.processes,
            Collection::DailyReports => &self.daily_reports,
        }
    }

    pub fn collection_mut(&mut self, collection: Collection) -> &mut Vec<Value> {
        match collection {
            Collection::Users => &mut self.users,
            Collection::Projects => &mut self.projects,
            Collection::WorkProcesses => &mut self.processes,
            Collection::DailyReports => &mut self.daily_reports,
        }
    }

    pub fn is_empty(&self) -> bool {
        Collection::ALL.iter().all(|c| self.collection(*c).is_empty())
    }
}

/// The entity store contract consumed by the synchronization layer.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Read every document of a collection. A missing collection reads as
    /// empty.
    async fn get_collection(&self, collection: Collection) -> StoreResult<Vec<Value>>;

    /// Replace a collection in its entirety.
    async fn put_collection(&self, collection: Collection, documents: Vec<Value>)
        -> StoreResult<()>;

    /// Read all four collections at once. Any failed read fails the whole
    /// snapshot.
    async fn fetch_snapshot(&self) -> StoreResult<StoreSnapshot> {
        let mut snapshot = StoreSnapshot::default();
        for collection in Collection::ALL {
            *snapshot.collection_mut(collection) = self.get_collection(collection).await?;
        }
        Ok(snapshot)
    }

    /// Create a backup of the current data state.
    async fn create_backup(
        &self,
        kind: BackupKind,
        include_config: bool,
    ) -> StoreResult<BackupInfo>;

    /// All known backups, newest first.
    async fn list_backups(&self) -> StoreResult<Vec<BackupInfo>>;

    /// Restore the named backup over the live data, after taking a safety
    /// backup of the current state.
    async fn restore(&self, name: &str) -> StoreResult<RestoreOutcome>;

    /// Delete the named backup.
    async fn delete_backup(&self, name: &str) -> StoreResult<()>;
}
