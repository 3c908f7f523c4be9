//! SQLite-backed document store.
//! Every document is a row; fields are JSON with `$timestamp` markers.

use async_trait::async_trait;
use chrono::Utc;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use choresync_core::error::{ChoreSyncError, Result};
use choresync_core::traits::DocumentStore;
use choresync_core::types::{CollectionPath, Document, Fields, Query, fields_from_json, fields_to_json};

pub struct SqliteStore {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteStore {
    /// Open or create the document database.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = rusqlite::Connection::open(path)
            .map_err(|e| ChoreSyncError::Store(format!("DB open: {e}")))?;
        Self::with_connection(conn)
    }

    /// Private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()
            .map_err(|e| ChoreSyncError::Store(format!("DB open: {e}")))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: rusqlite::Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.lock()?
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,      -- 'users', 'households/h1/chores'
                id TEXT NOT NULL,
                fields TEXT NOT NULL,          -- JSON object
                updated_at TEXT NOT NULL,
                PRIMARY KEY (collection, id)
            );
         ",
            )
            .map_err(|e| ChoreSyncError::Store(format!("Migration: {e}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, rusqlite::Connection>> {
        self.conn
            .lock()
            .map_err(|_| ChoreSyncError::Store("sqlite connection lock poisoned".into()))
    }

    fn decode_fields(collection: &CollectionPath, id: &str, raw: &str) -> Result<Fields> {
        let json: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
            ChoreSyncError::Store(format!("Corrupt document {collection}/{id}: {e}"))
        })?;
        let serde_json::Value::Object(map) = json else {
            return Err(ChoreSyncError::Store(format!(
                "Corrupt document {collection}/{id}: fields are not an object"
            )));
        };
        fields_from_json(map)
            .map_err(|e| ChoreSyncError::Store(format!("Corrupt document {collection}/{id}: {e}")))
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let rows: Vec<(String, String)> = {
            let conn = self.lock()?;
            let mut stmt = conn
                .prepare("SELECT id, fields FROM documents WHERE collection = ?1 ORDER BY id")
                .map_err(|e| ChoreSyncError::Store(format!("Query {}: {e}", query.collection)))?;
            stmt.query_map([query.collection.as_str()], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .and_then(|mapped| mapped.collect())
            .map_err(|e| ChoreSyncError::Store(format!("Query {}: {e}", query.collection)))?
        };

        let mut docs = Vec::with_capacity(rows.len());
        for (id, raw) in rows {
            let fields = Self::decode_fields(&query.collection, &id, &raw)?;
            let doc = Document { id, fields };
            if query.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Document>> {
        let raw: Option<String> = {
            let conn = self.lock()?;
            let mut stmt = conn
                .prepare("SELECT fields FROM documents WHERE collection = ?1 AND id = ?2")
                .map_err(|e| ChoreSyncError::Store(format!("Get {collection}/{id}: {e}")))?;
            let mut rows = stmt
                .query_map([collection.as_str(), id], |row| row.get::<_, String>(0))
                .map_err(|e| ChoreSyncError::Store(format!("Get {collection}/{id}: {e}")))?;
            rows.next()
                .transpose()
                .map_err(|e| ChoreSyncError::Store(format!("Get {collection}/{id}: {e}")))?
        };

        match raw {
            Some(raw) => Ok(Some(Document {
                id: id.to_string(),
                fields: Self::decode_fields(collection, id, &raw)?,
            })),
            None => Ok(None),
        }
    }

    async fn put(&self, collection: &CollectionPath, doc: Document) -> Result<()> {
        let fields = fields_to_json(&doc.fields).to_string();
        self.lock()?
            .execute(
                "INSERT OR REPLACE INTO documents (collection, id, fields, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![collection.as_str(), doc.id, fields, Utc::now().to_rfc3339()],
            )
            .map_err(|e| ChoreSyncError::Store(format!("Put {collection}/{}: {e}", doc.id)))?;
        tracing::debug!("💾 Saved {}/{}", collection, doc.id);
        Ok(())
    }
}
