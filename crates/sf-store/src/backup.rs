//! Backup metadata types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Manifest file written into every backup folder.
pub const BACKUP_MANIFEST: &str = "backup-info.json";

/// Reserved folder name for the single automatic backup slot.
pub const AUTO_BACKUP_NAME: &str = "auto_backup";

/// Backup kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupKind {
    /// New folder per call, never overwritten.
    Manual,
    /// Single reserved slot, recreated on every call.
    Auto,
    /// Safety backup taken immediately before a restore.
    AutoBeforeRestore,
}

/// Backup manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: BackupKind,
    pub files: Vec<String>,
}

/// Result of a restore: the data files actually copied, and the name of the
/// safety backup taken beforehand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    pub restored: Vec<String>,
    pub safety_backup: String,
}

/// Folder name for a backup of the given kind, derived from the current time
/// for the timestamped kinds.
pub fn backup_name(kind: BackupKind, now: DateTime<Utc>) -> String {
    match kind {
        BackupKind::Auto => AUTO_BACKUP_NAME.to_string(),
        BackupKind::Manual => format!("backup_{}", now.format("%Y-%m-%dT%H-%M-%S-%3fZ")),
        BackupKind::AutoBeforeRestore => {
            format!("auto_before_restore_{}", now.timestamp_millis())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_name_is_fixed() {
        let a = backup_name(BackupKind::Auto, Utc::now());
        let b = backup_name(BackupKind::Auto, Utc::now());
        assert_eq!(a, b);
        assert_eq!(a, "auto_backup");
    }

    #[test]
    fn test_kind_wire_format() {
        assert_eq!(
            serde_json::to_value(BackupKind::AutoBeforeRestore).unwrap(),
            serde_json::json!("auto_before_restore")
        );
    }

    #[test]
    fn test_manifest_roundtrip() {
        let info = BackupInfo {
            name: "backup_x".into(),
            timestamp: Utc::now(),
            kind: BackupKind::Manual,
            files: vec!["projects.json".into()],
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value["type"], "manual");
    }
}
