//! Dry-run sender: every send succeeds and is logged.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use choresync_core::error::Result;
use choresync_core::traits::PushSender;
use choresync_core::traits::push::{BatchResponse, MulticastMessage, PushMessage, SendResponse};

#[derive(Default)]
pub struct LogSender {
    sent: AtomicU64,
}

impl LogSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages "delivered" so far.
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    fn next_id(&self) -> String {
        format!("log-{}", self.sent.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

#[async_trait]
impl PushSender for LogSender {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, message: &PushMessage) -> Result<String> {
        let id = self.next_id();
        tracing::info!(
            "📨 [{}] {} → {}: {}",
            id,
            message.notification.title,
            message.token,
            message.notification.body
        );
        Ok(id)
    }

    async fn send_each_for_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse> {
        let responses = message
            .tokens
            .iter()
            .map(|token| SendResponse::success(token, self.next_id()))
            .collect();
        tracing::info!(
            "📨 {} → {} device(s): {}",
            message.notification.title,
            message.tokens.len(),
            message.notification.body
        );
        Ok(BatchResponse { responses })
    }
}
