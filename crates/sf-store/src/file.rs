//! File-backed entity store
//!
//! A data directory of flat JSON documents, one per collection, replaced
//! wholesale on every write. Backups are folders under `<data>/backups/`,
//! each carrying a `backup-info.json` manifest.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sf_models::{Role, User};
use tracing::{info, warn};

use crate::backup::{
    backup_name, BackupInfo, BackupKind, RestoreOutcome, AUTO_BACKUP_NAME, BACKUP_MANIFEST,
};
use crate::collection::Collection;
use crate::store::{EntityStore, StoreError, StoreResult};

/// Flat-file JSON store rooted at a data directory.
pub struct FileStore {
    data_dir: PathBuf,
    /// Server configuration file, included in backups on request.
    config_path: Option<PathBuf>,
}

impl FileStore {
    /// Open (and if necessary create) a data directory. Seeds the users
    /// collection with a default administrator on first start.
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;

        let store = Self {
            data_dir,
            config_path: None,
        };
        store.seed_default_users()?;
        Ok(store)
    }

    /// Register the configuration file to include in backups.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.file_name())
    }

    fn backups_dir(&self) -> PathBuf {
        self.data_dir.join("backups")
    }

    fn seed_default_users(&self) -> StoreResult<()> {
        let users_path = self.collection_path(Collection::Users);
        if users_path.exists() {
            return Ok(());
        }

        let mut admin = User::new("admin", "System Administrator", Role::Admin, None);
        admin.password = Some("admin".to_string());

        let documents = vec![serde_json::to_value(&admin)?];
        std::fs::write(&users_path, serde_json::to_string_pretty(&documents)?)?;
        info!("seeded default administrator account");
        Ok(())
    }

    async fn read_documents(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = tokio::fs::read_to_string(&path).await?;
        serde_json::from_str(&raw).map_err(|e| StoreError::Malformed {
            collection: collection.as_str(),
            message: e.to_string(),
        })
    }

    /// Copy every existing data file into `dest`, returning the copied names.
    async fn copy_data_files(&self, dest: &Path) -> StoreResult<Vec<String>> {
        let mut copied = Vec::new();
        for collection in Collection::ALL {
            let src = self.collection_path(collection);
            if src.exists() {
                tokio::fs::copy(&src, dest.join(collection.file_name())).await?;
                copied.push(collection.file_name().to_string());
            }
        }
        Ok(copied)
    }
}

#[async_trait]
impl EntityStore for FileStore {
    async fn get_collection(&self, collection: Collection) -> StoreResult<Vec<Value>> {
        self.read_documents(collection).await
    }

    async fn put_collection(
        &self,
        collection: Collection,
        documents: Vec<Value>,
    ) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(&documents)?;
        tokio::fs::write(self.collection_path(collection), raw).await?;
        Ok(())
    }

    async fn create_backup(
        &self,
        kind: BackupKind,
        include_config: bool,
    ) -> StoreResult<BackupInfo> {
        let backups_dir = self.backups_dir();
        tokio::fs::create_dir_all(&backups_dir).await?;

        let timestamp = Utc::now();
        let name = backup_name(kind, timestamp);
        let backup_path = backups_dir.join(&name);

        // The auto slot holds only the most recent backup.
        if kind == BackupKind::Auto && backup_path.exists() {
            tokio::fs::remove_dir_all(&backup_path).await?;
        }
        tokio::fs::create_dir_all(&backup_path).await?;

        let mut files = self.copy_data_files(&backup_path).await?;

        if include_config {
            if let Some(config_path) = &self.config_path {
                if config_path.exists() {
                    tokio::fs::copy(config_path, backup_path.join("config.json")).await?;
                    files.push("config.json".to_string());
                }
            }
        }

        let info = BackupInfo {
            name,
            timestamp,
            kind,
            files,
        };
        tokio::fs::write(
            backup_path.join(BACKUP_MANIFEST),
            serde_json::to_string_pretty(&info)?,
        )
        .await?;

        info!(backup = %info.name, kind = ?kind, "backup created");
        Ok(info)
    }

    async fn list_backups(&self) -> StoreResult<Vec<BackupInfo>> {
        let backups_dir = self.backups_dir();
        if !backups_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        let mut entries = tokio::fs::read_dir(&backups_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let manifest_path = entry.path().join(BACKUP_MANIFEST);
            if !manifest_path.exists() {
                continue;
            }
            let raw = tokio::fs::read_to_string(&manifest_path).await?;
            match serde_json::from_str::<BackupInfo>(&raw) {
                Ok(info) => backups.push(info),
                Err(e) => {
                    warn!(path = %manifest_path.display(), error = %e, "skipping unreadable backup manifest");
                }
            }
        }

        backups.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(backups)
    }

    async fn restore(&self, name: &str) -> StoreResult<RestoreOutcome> {
        let backup_path = self.backups_dir().join(name);
        if !backup_path.exists() {
            return Err(StoreError::BackupNotFound(name.to_string()));
        }

        // Safety net first: the current state must stay recoverable even if
        // the restore itself goes wrong.
        let safety = self
            .create_backup(BackupKind::AutoBeforeRestore, true)
            .await?;

        let mut restored = Vec::new();
        for collection in Collection::ALL {
            let src = backup_path.join(collection.file_name());
            if src.exists() {
                tokio::fs::copy(&src, self.collection_path(collection)).await?;
                restored.push(collection.file_name().to_string());
            }
        }

        // Configuration comes back only when the backup carried it.
        let config_src = backup_path.join("config.json");
        if config_src.exists() {
            if let Some(config_path) = &self.config_path {
                tokio::fs::copy(&config_src, config_path).await?;
                restored.push("config.json".to_string());
            }
        }

        info!(backup = name, safety = %safety.name, "data restored");
        Ok(RestoreOutcome {
            restored,
            safety_backup: safety.name,
        })
    }

    async fn delete_backup(&self, name: &str) -> StoreResult<()> {
        let backup_path = self.backups_dir().join(name);
        if !backup_path.exists() {
            return Err(StoreError::BackupNotFound(name.to_string()));
        }
        tokio::fs::remove_dir_all(&backup_path).await?;
        info!(backup = name, "backup deleted");
        Ok(())
    }
}
