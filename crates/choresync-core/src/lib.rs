//! # ChoreSync Core
//!
//! Shared building blocks for the ChoreSync notification services:
//! configuration, the error type, the document model, household entity
//! views, and the two collaborator traits every component is wired with.
//!
//! ```text
//! DocumentStore (households, users, chores, messages, notifications)
//!   └── read by → MembershipResolver / ReminderScanner / EventNotifier
//! PushSender (send, send_each_for_multicast)
//!   └── driven by → Dispatcher
//! ```

pub mod config;
pub mod entities;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{ChoreSyncError, Result};
pub use traits::{DocumentStore, PushSender};
