//! Test doubles shared by the scheduler's unit tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use choresync_core::error::{ChoreSyncError, Result};
use choresync_core::traits::push::{
    BatchResponse, MulticastMessage, PushMessage, SendResponse,
};
use choresync_core::traits::{DocumentStore, PushSender};
use choresync_core::types::{CollectionPath, Document, Query};
use choresync_store::MemoryStore;

/// Records every message; tokens in `rejected` fail individually.
#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<PushMessage>>,
    pub multicasts: Mutex<Vec<MulticastMessage>>,
    pub rejected: HashSet<String>,
    pub transport_down: bool,
}

impl RecordingSender {
    pub fn rejecting(tokens: &[&str]) -> Self {
        Self {
            rejected: tokens.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn down() -> Self {
        Self {
            transport_down: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<PushMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn multicasts(&self) -> Vec<MulticastMessage> {
        self.multicasts.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushSender for RecordingSender {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, message: &PushMessage) -> Result<String> {
        self.sent.lock().unwrap().push(message.clone());
        if self.transport_down || self.rejected.contains(&message.token) {
            return Err(ChoreSyncError::Push(format!("rejected {}", message.token)));
        }
        Ok(format!("msg-{}", message.token))
    }

    async fn send_each_for_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse> {
        self.multicasts.lock().unwrap().push(message.clone());
        if self.transport_down {
            return Err(ChoreSyncError::Push("transport down".into()));
        }
        let responses = message
            .tokens
            .iter()
            .map(|t| {
                if self.rejected.contains(t) {
                    SendResponse::failure(t, "UNREGISTERED".into())
                } else {
                    SendResponse::success(t, format!("msg-{t}"))
                }
            })
            .collect();
        Ok(BatchResponse { responses })
    }
}

/// Memory store whose reads fail for chosen collections or documents.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    /// Collection paths whose queries fail.
    pub failing_collections: HashSet<String>,
    /// Document ids whose direct lookups fail.
    pub failing_docs: HashSet<String>,
}

impl FlakyStore {
    pub fn fail_collection(mut self, path: &str) -> Self {
        self.failing_collections.insert(path.to_string());
        self
    }

    pub fn fail_doc(mut self, id: &str) -> Self {
        self.failing_docs.insert(id.to_string());
        self
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        if self.failing_collections.contains(query.collection.as_str()) {
            return Err(ChoreSyncError::Store(format!(
                "{} unavailable",
                query.collection
            )));
        }
        self.inner.query(query).await
    }

    async fn get(&self, collection: &CollectionPath, id: &str) -> Result<Option<Document>> {
        if self.failing_docs.contains(id) {
            return Err(ChoreSyncError::Store(format!("{collection}/{id} unavailable")));
        }
        self.inner.get(collection, id).await
    }

    async fn put(&self, collection: &CollectionPath, doc: Document) -> Result<()> {
        self.inner.put(collection, doc).await
    }
}
