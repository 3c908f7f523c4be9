//! # ChoreSync Store
//!
//! Document store backends:
//! - `memory`: nested maps behind a lock, nothing survives a restart
//! - `sqlite`: one `documents` table, fields kept as JSON
//!
//! [`fixture::seed`] loads JSON fixtures into either.

pub mod fixture;
pub mod memory;
pub mod sqlite;

use std::path::Path;
use std::sync::Arc;

use choresync_core::config::StoreConfig;
use choresync_core::error::{ChoreSyncError, Result};
use choresync_core::traits::DocumentStore;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Create a store from configuration.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "sqlite" => {
            let path = shellexpand::tilde(&config.path).to_string();
            let path = Path::new(&path);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            tracing::info!("🗄️ Document store: sqlite at {}", path.display());
            Ok(Arc::new(SqliteStore::open(path)?))
        }
        other => Err(ChoreSyncError::Config(format!(
            "Unknown store backend '{other}' (expected 'sqlite' or 'memory')"
        ))),
    }
}
