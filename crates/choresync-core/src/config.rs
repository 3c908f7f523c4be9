//! ChoreSync configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ChoreSyncError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoreSyncConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl ChoreSyncConfig {
    /// Load config from the default path (~/.choresync/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default().with_env_overrides())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ChoreSyncError::Config(format!("Failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse a TOML document, then apply env overrides.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ChoreSyncError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config.with_env_overrides())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the ChoreSync home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".choresync")
    }

    /// FCM credentials from the environment win over file values.
    fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var("CHORESYNC_FCM_ACCESS_TOKEN")
            && !token.is_empty()
        {
            self.push.access_token = token;
        }
        if let Ok(project) = std::env::var("CHORESYNC_FCM_PROJECT_ID")
            && !project.is_empty()
        {
            self.push.project_id = project;
        }
        self
    }
}

fn bool_true() -> bool { true }

/// Document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "sqlite" or "memory".
    #[serde(default = "default_store_backend")]
    pub backend: String,
    #[serde(default = "default_store_path")]
    pub path: String,
}

fn default_store_backend() -> String { "sqlite".into() }
fn default_store_path() -> String { "~/.choresync/documents.db".into() }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: default_store_path(),
        }
    }
}

/// Push transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// "fcm" or "log".
    #[serde(default = "default_push_provider")]
    pub provider: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_fcm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_push_timeout")]
    pub timeout_secs: u64,
}

fn default_push_provider() -> String { "log".into() }
fn default_fcm_endpoint() -> String { "https://fcm.googleapis.com".into() }
fn default_push_timeout() -> u64 { 10 }

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            provider: default_push_provider(),
            project_id: String::new(),
            access_token: String::new(),
            endpoint: default_fcm_endpoint(),
            timeout_secs: default_push_timeout(),
        }
    }
}

/// Chore reminder scan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    /// "every N minutes|hours" or a 5-field cron expression.
    #[serde(default = "default_reminder_schedule")]
    pub schedule: String,
    /// Households processed at the same time during one scan.
    #[serde(default = "default_household_concurrency")]
    pub household_concurrency: usize,
}

fn default_reminder_schedule() -> String { "every 1 hours".into() }
fn default_household_concurrency() -> usize { 4 }

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            schedule: default_reminder_schedule(),
            household_concurrency: default_household_concurrency(),
        }
    }
}

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 { 3000 }
fn default_host() -> String { "127.0.0.1".into() }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChoreSyncConfig::default();
        assert_eq!(config.store.backend, "sqlite");
        assert_eq!(config.push.provider, "log");
        assert_eq!(config.reminders.schedule, "every 1 hours");
        assert!(config.reminders.enabled);
        assert_eq!(config.gateway.port, 3000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = ChoreSyncConfig::from_toml(
            r#"
            [reminders]
            schedule = "every 30 minutes"

            [store]
            backend = "memory"
            "#,
        )
        .unwrap();
        assert_eq!(config.reminders.schedule, "every 30 minutes");
        assert_eq!(config.reminders.household_concurrency, 4);
        assert_eq!(config.store.backend, "memory");
        assert_eq!(config.store.path, "~/.choresync/documents.db");
        assert_eq!(config.push.endpoint, "https://fcm.googleapis.com");
    }

    #[test]
    fn test_invalid_toml() {
        let err = ChoreSyncConfig::from_toml("[reminders\nschedule = 1").unwrap_err();
        assert!(matches!(err, ChoreSyncError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join("choresync-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[gateway]\nport = 8088\n").unwrap();

        let loaded = ChoreSyncConfig::load_from(&path).unwrap();
        assert_eq!(loaded.gateway.port, 8088);
        assert_eq!(loaded.gateway.host, "127.0.0.1");
        std::fs::remove_dir_all(&dir).ok();
    }
}
