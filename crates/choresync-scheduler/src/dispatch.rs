//! Notification dispatch. Hands notifications to the push transport.
//! Delivery failures are logged and counted, never raised.

use serde::Serialize;
use std::sync::Arc;

use choresync_core::traits::PushSender;
use choresync_core::traits::push::{MulticastMessage, PushMessage, PushNotification};

/// A non-empty set of device tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients(Vec<String>);

impl Recipients {
    /// `None` for an empty token list: there is nobody to notify.
    pub fn new(tokens: Vec<String>) -> Option<Self> {
        if tokens.is_empty() {
            None
        } else {
            Some(Self(tokens))
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Counts from one multicast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Result of a single-target send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Sent(String),
    Failed(String),
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent(_))
    }
}

/// Fire-and-forget dispatcher. One attempt per invocation, no retry.
#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn PushSender>,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn PushSender>) -> Self {
        Self { sender }
    }

    /// Deliver to every recipient. Per-token failures are logged and counted.
    pub async fn multicast(
        &self,
        recipients: &Recipients,
        notification: &PushNotification,
    ) -> DispatchReport {
        let message = MulticastMessage {
            tokens: recipients.tokens().to_vec(),
            notification: notification.clone(),
        };
        let attempted = recipients.len();

        match self.sender.send_each_for_multicast(&message).await {
            Ok(batch) => {
                for failure in batch.responses.iter().filter(|r| !r.is_success()) {
                    tracing::warn!(
                        "⚠️ Push to {} failed: {}",
                        failure.token,
                        failure.error.as_deref().unwrap_or("unknown error")
                    );
                }
                let report = DispatchReport {
                    attempted,
                    succeeded: batch.success_count(),
                    failed: attempted.saturating_sub(batch.success_count()),
                };
                tracing::info!(
                    "📣 '{}' delivered to {}/{} device(s) via {}",
                    notification.title,
                    report.succeeded,
                    report.attempted,
                    self.sender.name()
                );
                report
            }
            Err(e) => {
                tracing::warn!(
                    "⚠️ Multicast '{}' to {} device(s) failed: {e}",
                    notification.title,
                    attempted
                );
                DispatchReport {
                    attempted,
                    succeeded: 0,
                    failed: attempted,
                }
            }
        }
    }

    /// Deliver to one token. A failure is logged and returned, never raised.
    pub async fn unicast(&self, token: &str, notification: &PushNotification) -> DispatchOutcome {
        let message = PushMessage {
            token: token.to_string(),
            notification: notification.clone(),
        };
        match self.sender.send(&message).await {
            Ok(id) => DispatchOutcome::Sent(id),
            Err(e) => {
                tracing::warn!("⚠️ Push '{}' failed: {e}", notification.title);
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }
}
