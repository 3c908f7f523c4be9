//! # ChoreSync Scheduler
//!
//! Household push notification logic: who gets notified, what they see,
//! and when the reminder sweep runs.
//!
//! ## Architecture
//! ```text
//! EventNotifier (document created)
//!   ├── households/{h}/messages/{m}       → every member, sender included
//!   └── households/{h}/notifications/{n}  → every member except the sender
//!         └── MembershipResolver → Dispatcher::multicast
//!
//! ReminderScanner (Schedule: "every 1 hours" | cron)
//!   └── households → open chores due within 24h
//!         ├── due within 1h  → "⏳ 1 Hour Reminder"
//!         └── otherwise      → "📅 1 Day Reminder"
//!               └── assignee token → Dispatcher::unicast
//! ```
//!
//! Store and push access go through the `DocumentStore` and `PushSender`
//! traits from `choresync-core`, so everything here runs against in-memory
//! doubles in tests.

pub mod dispatch;
pub mod engine;
pub mod members;
pub mod notifier;
pub mod reminder;
pub mod schedule;
pub mod trigger;

#[cfg(test)]
mod testing;

pub use dispatch::{DispatchOutcome, DispatchReport, Dispatcher, Recipients};
pub use engine::{ReminderScanner, ScanReport, spawn_reminder_loop};
pub use members::MembershipResolver;
pub use notifier::{DocumentCreated, EventNotifier, EventOutcome, RecordKind, plan_notification};
pub use reminder::{ReminderKind, ReminderWindow, classify};
pub use schedule::Schedule;
pub use trigger::TriggerPattern;
