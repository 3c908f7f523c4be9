//! Household entity views over raw documents.
//!
//! These are read-only projections; the store owns the documents.

use chrono::{DateTime, Utc};

use crate::types::{CollectionPath, Document};

pub const HOUSEHOLDS: &str = "households";
pub const USERS: &str = "users";
pub const CHORES: &str = "chores";
pub const MESSAGES: &str = "messages";
pub const NOTIFICATIONS: &str = "notifications";

pub fn households_path() -> CollectionPath {
    CollectionPath::root(HOUSEHOLDS)
}

pub fn users_path() -> CollectionPath {
    CollectionPath::root(USERS)
}

pub fn chores_path(household_id: &str) -> CollectionPath {
    households_path().child(household_id, CHORES)
}

pub fn messages_path(household_id: &str) -> CollectionPath {
    households_path().child(household_id, MESSAGES)
}

pub fn notifications_path(household_id: &str) -> CollectionPath {
    households_path().child(household_id, NOTIFICATIONS)
}

/// A household member.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub household_id: Option<String>,
    /// Push address. Empty strings are normalized to `None`.
    pub fcm_token: Option<String>,
    pub name: Option<String>,
}

impl User {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            household_id: doc.get_str("householdId").map(str::to_string),
            fcm_token: doc.get_non_empty_str("fcmToken").map(str::to_string),
            name: doc.get_non_empty_str("name").map(str::to_string),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

/// A chore inside `households/{id}/chores`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chore {
    pub id: String,
    pub task: String,
    pub due_date: Option<DateTime<Utc>>,
    pub completed: bool,
    pub assigned_to: Option<String>,
}

impl Chore {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            id: doc.id.clone(),
            task: doc.get_str("task").unwrap_or_default().to_string(),
            due_date: doc.get_timestamp("dueDate"),
            completed: doc.get_bool("completed").unwrap_or(false),
            assigned_to: doc.get_non_empty_str("assignedTo").map(str::to_string),
        }
    }
}

/// A chat message inside `households/{id}/messages`.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub sender_id: Option<String>,
    pub sender_name: String,
    pub content: String,
}

impl MessageRecord {
    /// `None` when `senderName` or `content` is missing.
    pub fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            sender_id: doc.get_non_empty_str("senderId").map(str::to_string),
            sender_name: doc.get_str("senderName")?.to_string(),
            content: doc.get_str("content")?.to_string(),
        })
    }
}

/// A generic notification inside `households/{id}/notifications`.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRecord {
    pub title: String,
    pub body: String,
    pub sender_id: Option<String>,
}

impl NotificationRecord {
    /// `None` when `title` or `body` is missing.
    pub fn from_document(doc: &Document) -> Option<Self> {
        Some(Self {
            title: doc.get_str("title")?.to_string(),
            body: doc.get_str("body")?.to_string(),
            sender_id: doc.get_non_empty_str("senderId").map(str::to_string),
        })
    }
}
