//! Document store trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CollectionPath, Document, Query};

/// Read/write access to a hierarchical document store.
///
/// Every call is a snapshot read; nothing is cached between calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// All documents in `query.collection` matching every filter.
    async fn query(&self, query: &Query) -> Result<Vec<Document>>;

    /// Single document lookup. `Ok(None)` when it does not exist.
    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Document>>;

    /// All documents in a collection.
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>> {
        self.query(&Query::new(collection.clone())).await
    }

    /// Create or replace a document.
    async fn put(&self, collection: &CollectionPath, doc: Document) -> Result<()>;
}
