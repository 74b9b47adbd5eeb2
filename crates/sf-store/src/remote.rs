//! Remote entity store client
//!
//! Speaks the sf-server HTTP surface so a client cache on another machine can
//! run the same synchronization protocol against a shared store.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::backup::{BackupInfo, BackupKind, RestoreOutcome};
use crate::collection::Collection;
use crate::store::{EntityStore, StoreError, StoreResult, StoreSnapshot};

/// HTTP client implementation of [`EntityStore`].
pub struct RemoteStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct BackupResponse {
    backup: BackupInfo,
}

impl RemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn transport(e: reqwest::Error) -> StoreError {
        StoreError::Unreachable(e.to_string())
    }

    fn status_error(status: StatusCode, context: &str) -> StoreError {
        StoreError::Unreachable(format!("{context}: server answered {status}"))
    }
}

#[async_trait]
impl EntityStore for RemoteStore {
    async fn get_collection(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let response = self
            .client
            .get(self.url(collection.api_path()))
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), collection.as_str()));
        }
        response.json().await.map_err(|e| StoreError::Malformed {
            collection: collection.as_str(),
            message: e.to_string(),
        })
    }

    async fn put_collection(
        &self,
        collection: Collection,
        documents: Vec<Value>,
    ) -> StoreResult<()> {
        let response = self
            .client
            .post(self.url(collection.api_path()))
            .json(&documents)
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), collection.as_str()));
        }
        Ok(())
    }

    async fn fetch_snapshot(&self) -> StoreResult<StoreSnapshot> {
        let response = self
            .client
            .get(self.url("sync-data"))
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), "sync-data"));
        }
        response.json().await.map_err(|e| StoreError::Malformed {
            collection: "snapshot",
            message: e.to_string(),
        })
    }

    async fn create_backup(
        &self,
        kind: BackupKind,
        include_config: bool,
    ) -> StoreResult<BackupInfo> {
        let request = match kind {
            BackupKind::Manual => self
                .client
                .post(self.url("backup"))
                .json(&serde_json::json!({ "includeConfig": include_config })),
            BackupKind::Auto => self.client.post(self.url("backup/auto")),
            // The safety backup is taken server-side as part of restore.
            BackupKind::AutoBeforeRestore => {
                return Err(StoreError::Unsupported(
                    "auto_before_restore backups are created by the server during restore",
                ))
            }
        };

        let response = request.send().await.map_err(Self::transport)?;
        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), "backup"));
        }
        let body: BackupResponse = response.json().await.map_err(Self::transport)?;
        Ok(body.backup)
    }

    async fn list_backups(&self) -> StoreResult<Vec<BackupInfo>> {
        let response = self
            .client
            .get(self.url("backups"))
            .send()
            .await
            .map_err(Self::transport)?;
        if !response.status().is_success() {
            return Err(Self::status_error(response.status(), "backups"));
        }
        response.json().await.map_err(Self::transport)
    }

    async fn restore(&self, name: &str) -> StoreResult<RestoreOutcome> {
        let response = self
            .client
            .post(self.url(&format!("restore/{name}")))
            .send()
            .await
            .map_err(Self::transport)?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::BackupNotFound(name.to_string())),
            status if status.is_success() => response.json().await.map_err(Self::transport),
            status => Err(Self::status_error(status, "restore")),
        }
    }

    async fn delete_backup(&self, name: &str) -> StoreResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("backup/{name}")))
            .send()
            .await
            .map_err(Self::transport)?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::BackupNotFound(name.to_string())),
            status if status.is_success() => Ok(()),
            status => Err(Self::status_error(status, "delete backup")),
        }
    }
}
