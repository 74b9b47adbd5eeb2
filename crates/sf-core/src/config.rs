//! Configuration types and loading
//!
//! The server reads a single JSON document (`config.json`) next to its data
//! directory. A missing or unparseable file falls back to the defaults; a
//! partial document is merged over them section by section.

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener configuration
    pub server: ServerSection,

    /// Instance identity
    pub app: AppSection,

    /// Registration and session settings
    pub security: SecuritySection,

    /// Entity store location
    pub database: DatabaseSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppSection {
    pub title: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct SecuritySection {
    /// Invite code required for self-registration
    pub invite_code: String,
    /// Session lifetime in milliseconds
    pub session_timeout: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseSection {
    /// Store kind; only "file" is supported
    #[serde(rename = "type")]
    pub kind: String,
    /// Data directory, relative to the server working directory
    pub data_dir: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            title: "Shopfloor".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for SecuritySection {
    fn default() -> Self {
        Self {
            invite_code: "admin".to_string(),
            session_timeout: 86_400_000,
        }
    }
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            kind: "file".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            app: AppSection::default(),
            security: SecuritySection::default(),
            database: DatabaseSection::default(),
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(#[from] std::io::Error),

    #[error("Invalid config document: {0}")]
    Invalid(#[from] serde_json::Error),
}

impl AppConfig {
    /// Load configuration from a JSON file, falling back to defaults when the
    /// file is missing or unreadable.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "config parse failed, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Apply environment overrides (`HOST`, `PORT`, `SHOPFLOOR_DATA_DIR`,
    /// `SHOPFLOOR_INVITE_CODE`).
    pub fn apply_env(mut self) -> Self {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port.parse().unwrap_or(self.server.port);
        }
        if let Ok(dir) = std::env::var("SHOPFLOOR_DATA_DIR") {
            self.database.data_dir = dir;
        }
        if let Ok(code) = std::env::var("SHOPFLOOR_INVITE_CODE") {
            self.security.invite_code = code;
        }
        self
    }

    /// Shallow-merge a partial JSON document over this configuration.
    ///
    /// Top-level sections present in the patch replace the corresponding
    /// section wholesale, matching the save-config contract.
    pub fn merged_with(&self, patch: serde_json::Value) -> Result<Self, ConfigError> {
        let mut base = serde_json::to_value(self)?;
        if let (Some(base_map), Some(patch_map)) = (base.as_object_mut(), patch.as_object()) {
            for (key, value) in patch_map {
                base_map.insert(key.clone(), value.clone());
            }
        }
        Ok(serde_json::from_value(base)?)
    }

    /// The publicly visible slice of the configuration (no session internals).
    pub fn public_view(&self) -> serde_json::Value {
        serde_json::json!({
            "server": self.server,
            "app": self.app,
            "inviteCode": self.security.invite_code,
        })
    }

    /// Socket address for the HTTP listener.
    pub fn server_addr(&self) -> SocketAddr {
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(ip, self.server.port)
    }
}
