//! In-memory document store.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::RwLock;

use choresync_core::error::{ChoreSyncError, Result};
use choresync_core::traits::DocumentStore;
use choresync_core::types::{CollectionPath, Document, Fields, Query};

/// Collections keyed by path, documents keyed by id (id order on reads).
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<CollectionPath, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous insert, handy for seeding.
    pub fn insert(&self, collection: &CollectionPath, doc: Document) -> Result<()> {
        let mut guard = self
            .collections
            .write()
            .map_err(|_| ChoreSyncError::Store("memory store lock poisoned".into()))?;
        guard
            .entry(collection.clone())
            .or_default()
            .insert(doc.id, doc.fields);
        Ok(())
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: &CollectionPath) -> usize {
        self.collections
            .read()
            .map(|g| g.get(collection).map_or(0, BTreeMap::len))
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let guard = self
            .collections
            .read()
            .map_err(|_| ChoreSyncError::Store("memory store lock poisoned".into()))?;
        let Some(docs) = guard.get(&query.collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .filter(|doc| query.matches(doc))
            .collect())
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Document>> {
        let guard = self
            .collections
            .read()
            .map_err(|_| ChoreSyncError::Store("memory store lock poisoned".into()))?;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn put(&self, collection: &CollectionPath, doc: Document) -> Result<()> {
        self.insert(collection, doc)
    }
}
