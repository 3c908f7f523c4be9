//! Event-triggered notifier. Fans a new message or notification record out
//! to the household.
//!
//! ## Flow
//! ```text
//! DocumentCreated (households/{h}/messages/{m} | households/{h}/notifications/{n})
//!   → plan_notification(event)        pure: title/body + who to exclude
//!   → MembershipResolver::resolve_tokens
//!   → Dispatcher::multicast            only when someone is reachable
//! ```
//!
//! Messages go to every member, the sender included. Notification records
//! skip their sender.

use serde::{Deserialize, Serialize};

use choresync_core::entities::{MESSAGES, MessageRecord, NOTIFICATIONS, NotificationRecord};
use choresync_core::error::Result;
use choresync_core::traits::push::PushNotification;
use choresync_core::types::{Document, Fields};

use crate::dispatch::{DispatchReport, Dispatcher, Recipients};
use crate::members::MembershipResolver;
use crate::trigger::{MESSAGE_TRIGGER, NOTIFICATION_TRIGGER, TriggerPattern};

/// Which household sub-collection the record was created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Message,
    Notification,
}

impl RecordKind {
    pub fn collection(&self) -> &'static str {
        match self {
            RecordKind::Message => MESSAGES,
            RecordKind::Notification => NOTIFICATIONS,
        }
    }

    /// Only notification records leave their sender out.
    pub fn excludes_sender(&self) -> bool {
        matches!(self, RecordKind::Notification)
    }
}

/// A document-created event.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCreated {
    pub kind: RecordKind,
    pub household_id: String,
    pub record_id: String,
    /// Record fields; `None` when the event carried no snapshot.
    pub data: Option<Fields>,
}

impl DocumentCreated {
    pub fn new(
        kind: RecordKind,
        household_id: impl Into<String>,
        record_id: impl Into<String>,
        data: Option<Fields>,
    ) -> Self {
        Self {
            kind,
            household_id: household_id.into(),
            record_id: record_id.into(),
            data,
        }
    }

    /// Build an event from a concrete document path such as
    /// `households/h1/messages/m1`. `None` when no trigger matches.
    pub fn from_path(path: &str, data: Option<Fields>) -> Option<Self> {
        [
            (RecordKind::Message, MESSAGE_TRIGGER, "messageId"),
            (RecordKind::Notification, NOTIFICATION_TRIGGER, "notificationId"),
        ]
        .into_iter()
        .find_map(|(kind, pattern, id_param)| {
            let pattern = TriggerPattern::parse(pattern).ok()?;
            let mut params = pattern.matches(path)?;
            Some(Self {
                kind,
                household_id: params.remove("householdId")?,
                record_id: params.remove(id_param)?,
                data: data.clone(),
            })
        })
    }

    fn document(&self) -> Option<Document> {
        let fields = self.data.as_ref().filter(|f| !f.is_empty())?;
        Some(Document {
            id: self.record_id.clone(),
            fields: fields.clone(),
        })
    }
}

/// What to send and to whom, decided from the event alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationPlan {
    pub household_id: String,
    pub notification: PushNotification,
    pub exclude_user: Option<String>,
}

/// `None` for malformed events: empty household id, no payload, or a
/// payload missing the fields its kind needs.
pub fn plan_notification(event: &DocumentCreated) -> Option<NotificationPlan> {
    if event.household_id.is_empty() {
        return None;
    }
    let doc = event.document()?;
    match event.kind {
        RecordKind::Message => {
            let msg = MessageRecord::from_document(&doc)?;
            Some(NotificationPlan {
                household_id: event.household_id.clone(),
                notification: PushNotification::new(
                    format!("New Message from {}", msg.sender_name),
                    msg.content,
                ),
                exclude_user: None,
            })
        }
        RecordKind::Notification => {
            let rec = NotificationRecord::from_document(&doc)?;
            Some(NotificationPlan {
                household_id: event.household_id.clone(),
                notification: PushNotification::new(rec.title, rec.body),
                exclude_user: rec.sender_id.filter(|_| event.kind.excludes_sender()),
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EventOutcome {
    /// Malformed event; nothing done.
    Ignored,
    /// Nobody in the household is reachable.
    NoRecipients,
    Dispatched(DispatchReport),
}

#[derive(Clone)]
pub struct EventNotifier {
    resolver: MembershipResolver,
    dispatcher: Dispatcher,
}

impl EventNotifier {
    pub fn new(resolver: MembershipResolver, dispatcher: Dispatcher) -> Self {
        Self {
            resolver,
            dispatcher,
        }
    }

    /// Handle one created record. Store errors propagate; the caller logs
    /// them and the event counts as unprocessed.
    pub async fn handle(&self, event: &DocumentCreated) -> Result<EventOutcome> {
        let Some(plan) = plan_notification(event) else {
            tracing::debug!(
                "⏭️ Ignoring malformed {:?} event {}/{}",
                event.kind,
                event.household_id,
                event.record_id
            );
            return Ok(EventOutcome::Ignored);
        };

        let tokens = self
            .resolver
            .resolve_tokens(&plan.household_id, plan.exclude_user.as_deref())
            .await?;

        let Some(recipients) = Recipients::new(tokens) else {
            tracing::debug!(
                "📭 No reachable members in household {} for {}",
                plan.household_id,
                event.record_id
            );
            return Ok(EventOutcome::NoRecipients);
        };

        tracing::info!(
            "🔔 {} {} in household {} → {} device(s)",
            event.kind.collection(),
            event.record_id,
            plan.household_id,
            recipients.len()
        );
        let report = self.dispatcher.multicast(&recipients, &plan.notification).await;
        Ok(EventOutcome::Dispatched(report))
    }
}
