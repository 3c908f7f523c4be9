//! JSON fixtures for seeding a store.
//!
//! ```json
//! {
//!   "users": { "u1": { "householdId": "h1", "fcmToken": "T1" } },
//!   "households/h1/chores": {
//!     "c1": { "task": "Dishes", "completed": false,
//!             "dueDate": { "$timestamp": "2026-03-01T12:30:00Z" } }
//!   }
//! }
//! ```

use choresync_core::error::{ChoreSyncError, Result};
use choresync_core::traits::DocumentStore;
use choresync_core::types::{CollectionPath, Document, fields_from_json};

/// Write every document in `fixture` to `store`. Returns the number written.
pub async fn seed(store: &dyn DocumentStore, fixture: serde_json::Value) -> Result<usize> {
    let serde_json::Value::Object(collections) = fixture else {
        return Err(ChoreSyncError::InvalidInput(
            "Fixture must be an object keyed by collection path".into(),
        ));
    };

    let mut written = 0;
    for (path, docs) in collections {
        let collection = CollectionPath::parse(&path)?;
        let serde_json::Value::Object(docs) = docs else {
            return Err(ChoreSyncError::InvalidInput(format!(
                "Fixture collection '{path}' must map document ids to objects"
            )));
        };
        for (id, fields) in docs {
            let serde_json::Value::Object(fields) = fields else {
                return Err(ChoreSyncError::InvalidInput(format!(
                    "Fixture document '{path}/{id}' must be an object"
                )));
            };
            let doc = Document {
                id,
                fields: fields_from_json(fields)?,
            };
            store.put(&collection, doc).await?;
            written += 1;
        }
        tracing::debug!("🌱 Seeded {}", collection);
    }
    Ok(written)
}
