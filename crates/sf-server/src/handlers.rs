//! Store surface handlers: collections, sync snapshot, backups, config, and
//! data statistics.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use parking_lot::RwLock;
use serde_json::{json, Value};
use sf_core::AppConfig;
use sf_store::{
    BackupInfo, BackupKind, Collection, EntityStore, FileStore, RestoreOutcome, StoreSnapshot,
    AUTO_BACKUP_NAME,
};
use tracing::info;

use crate::error::{ApiError, ApiResult};

/// Shared server state: the file store plus the live configuration.
pub struct AppState {
    pub store: Arc<FileStore>,
    pub config: RwLock<AppConfig>,
    pub config_path: PathBuf,
}

fn strip_password(mut document: Value) -> Value {
    if let Some(map) = document.as_object_mut() {
        map.remove("password");
    }
    document
}

// ==================== health & config ====================

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    let version = state.config.read().app.version.clone();
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
        "version": version,
    }))
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.config.read().public_view())
}

pub async fn save_config(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<Value>,
) -> ApiResult<Json<Value>> {
    let merged = state
        .config
        .read()
        .merged_with(patch)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    merged
        .save(&state.config_path)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    *state.config.write() = merged;
    info!("configuration saved");
    Ok(Json(json!({ "success": true, "message": "configuration saved" })))
}

// ==================== collections ====================

pub async fn get_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    let users = state.store.get_collection(Collection::Users).await?;
    Ok(Json(users.into_iter().map(strip_password).collect()))
}

pub async fn put_users(
    State(state): State<Arc<AppState>>,
    Json(documents): Json<Vec<Value>>,
) -> ApiResult<Json<Value>> {
    state
        .store
        .put_collection(Collection::Users, documents)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// Remove one user by username. The administrator account cannot be removed.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Json<Value>> {
    let mut users = state.store.get_collection(Collection::Users).await?;
    let Some(index) = users.iter().position(|u| u["username"] == username.as_str()) else {
        return Err(ApiError::NotFound(format!("user {username}")));
    };
    if users[index]["role"] == "admin" {
        return Err(ApiError::Forbidden(
            "the administrator account cannot be removed".to_string(),
        ));
    }

    users.remove(index);
    state.store.put_collection(Collection::Users, users).await?;
    info!(username = %username, "user removed");
    Ok(Json(json!({ "success": true })))
}

pub async fn department_users(
    State(state): State<Arc<AppState>>,
    Path(department): Path<String>,
) -> ApiResult<Json<Vec<Value>>> {
    let users = state.store.get_collection(Collection::Users).await?;
    Ok(Json(
        users
            .into_iter()
            .filter(|u| u["department"] == department.as_str())
            .map(strip_password)
            .collect(),
    ))
}

pub async fn get_projects(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(state.store.get_collection(Collection::Projects).await?))
}

pub async fn put_projects(
    State(state): State<Arc<AppState>>,
    Json(documents): Json<Vec<Value>>,
) -> ApiResult<Json<Value>> {
    state
        .store
        .put_collection(Collection::Projects, documents)
        .await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn get_processes(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(
        state
            .store
            .get_collection(Collection::WorkProcesses)
            .await?,
    ))
}

pub async fn put_processes(
    State(state): State<Arc<AppState>>,
    Json(documents): Json<Vec<Value>>,
) -> ApiResult<Json<Value>> {
    state
        .store
        .put_collection(Collection::WorkProcesses, documents)
        .await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn get_daily_reports(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(
        state
            .store
            .get_collection(Collection::DailyReports)
            .await?,
    ))
}

pub async fn put_daily_reports(
    State(state): State<Arc<AppState>>,
    Json(documents): Json<Vec<Value>>,
) -> ApiResult<Json<Value>> {
    state
        .store
        .put_collection(Collection::DailyReports, documents)
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// The whole-store snapshot consumed by client bootstrap. User documents are
/// stripped of their password field before leaving the server.
pub async fn sync_data(State(state): State<Arc<AppState>>) -> ApiResult<Json<StoreSnapshot>> {
    let mut snapshot = state.store.fetch_snapshot().await?;
    snapshot.users = snapshot.users.into_iter().map(strip_password).collect();
    Ok(Json(snapshot))
}

// ==================== backups ====================

pub async fn create_backup(
    State(state): State<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> ApiResult<Json<Value>> {
    let include_config = body
        .and_then(|Json(options)| options.get("includeConfig").and_then(Value::as_bool))
        .unwrap_or(false);
    let backup = state
        .store
        .create_backup(BackupKind::Manual, include_config)
        .await?;
    Ok(Json(json!({ "success": true, "backup": backup })))
}

pub async fn create_auto_backup(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let backup = state.store.create_backup(BackupKind::Auto, true).await?;
    Ok(Json(json!({ "success": true, "backup": backup })))
}

pub async fn auto_backup_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let auto = state
        .store
        .list_backups()
        .await?
        .into_iter()
        .find(|b| b.name == AUTO_BACKUP_NAME);
    Ok(Json(match auto {
        Some(backup) => json!({ "exists": true, "backup": backup }),
        None => json!({ "exists": false }),
    }))
}

pub async fn list_backups(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<BackupInfo>>> {
    Ok(Json(state.store.list_backups().await?))
}

pub async fn restore_backup(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<RestoreOutcome>> {
    let outcome = state.store.restore(&name).await?;

    // A restored configuration file takes effect immediately.
    if outcome.restored.iter().any(|f| f == "config.json") {
        *state.config.write() = AppConfig::load(&state.config_path);
        info!("configuration reloaded from restored backup");
    }
    Ok(Json(outcome))
}

pub async fn delete_backup(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> ApiResult<Json<Value>> {
    state.store.delete_backup(&name).await?;
    Ok(Json(json!({ "success": true })))
}

// ==================== statistics ====================

pub async fn data_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let mut counts = serde_json::Map::new();
    let mut data_size = 0u64;
    for collection in Collection::ALL {
        let documents = state.store.get_collection(collection).await?;
        counts.insert(collection.as_str().to_string(), json!(documents.len()));

        let path = state.store.data_dir().join(collection.file_name());
        if let Ok(metadata) = std::fs::metadata(path) {
            data_size += metadata.len();
        }
    }

    let backups = state.store.list_backups().await?.len();
    Ok(Json(json!({
        "users": counts["users"],
        "projects": counts["projects"],
        "processes": counts["workProcesses"],
        "dailyReports": counts["dailyReports"],
        "backups": backups,
        "dataSize": data_size,
    })))
}
