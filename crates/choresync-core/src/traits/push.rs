//! Push delivery trait and payload types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What the client renders: `{"notification": {"title", "body"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

impl PushNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Single-target message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    pub token: String,
    pub notification: PushNotification,
}

/// One notification addressed to many tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub notification: PushNotification,
}

/// Outcome of one token inside a multicast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    pub token: String,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl SendResponse {
    pub fn success(token: &str, message_id: String) -> Self {
        Self {
            token: token.to_string(),
            message_id: Some(message_id),
            error: None,
        }
    }

    pub fn failure(token: &str, error: String) -> Self {
        Self {
            token: token.to_string(),
            message_id: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-token breakdown of a multicast, in token order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub responses: Vec<SendResponse>,
}

impl BatchResponse {
    pub fn success_count(&self) -> usize {
        self.responses.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.responses.len() - self.success_count()
    }
}

/// Push transport.
#[async_trait]
pub trait PushSender: Send + Sync {
    fn name(&self) -> &str;

    /// Send to one token. Returns the transport's message id.
    async fn send(&self, message: &PushMessage) -> Result<String>;

    /// Attempt every token independently. `Err` only when the transport as a
    /// whole is unusable; per-token failures live in the [`BatchResponse`].
    async fn send_each_for_multicast(&self, message: &MulticastMessage) -> Result<BatchResponse>;
}
