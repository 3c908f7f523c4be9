//! # ChoreSync Push
//!
//! Push transports behind the `PushSender` trait.
//! `fcm` talks to Firebase Cloud Messaging; `log` only writes log lines.

pub mod fcm;
pub mod log_sender;

use std::sync::Arc;

use choresync_core::config::PushConfig;
use choresync_core::error::{ChoreSyncError, Result};
use choresync_core::traits::PushSender;

pub use fcm::FcmSender;
pub use log_sender::LogSender;

/// Create a push sender from configuration.
pub fn create_sender(config: &PushConfig) -> Result<Arc<dyn PushSender>> {
    match config.provider.as_str() {
        "fcm" => Ok(Arc::new(FcmSender::from_config(config)?)),
        "log" => Ok(Arc::new(LogSender::new())),
        other => Err(ChoreSyncError::Config(format!(
            "Unknown push provider '{other}' (available: {})",
            available_providers().join(", ")
        ))),
    }
}

/// List all available provider names.
pub fn available_providers() -> Vec<&'static str> {
    vec!["fcm", "log"]
}
