//! Chore reminder classification.
//!
//! A scan cycle fixes one reference instant `now` and two horizons:
//! `now + 1h` and `now + 24h`. An open chore due inside `[now, now + 24h]`
//! gets a 1-hour reminder when due within the first hour, a 1-day reminder
//! otherwise. Nothing records that a reminder went out, so the same chore is
//! reminded again on every cycle while it stays in the window.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use choresync_core::entities::{Chore, chores_path};
use choresync_core::traits::push::PushNotification;
use choresync_core::types::Query;

/// Reference instant plus the two reminder horizons for one scan cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    pub now: DateTime<Utc>,
    pub one_hour_later: DateTime<Utc>,
    pub one_day_later: DateTime<Utc>,
}

impl ReminderWindow {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            one_hour_later: now + Duration::hours(1),
            one_day_later: now + Duration::hours(24),
        }
    }

    /// `due` within `[now, one_day_later]`, both ends inclusive.
    pub fn contains(&self, due: DateTime<Utc>) -> bool {
        due >= self.now && due <= self.one_day_later
    }

    /// Store query for the open chores of a household due inside the window.
    pub fn chore_query(&self, household_id: &str) -> Query {
        Query::new(chores_path(household_id))
            .where_eq("completed", false)
            .where_gte("dueDate", self.now)
            .where_lte("dueDate", self.one_day_later)
    }
}

/// Reminder urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    OneHour,
    OneDay,
}

impl ReminderKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReminderKind::OneHour => "⏳ 1 Hour Reminder",
            ReminderKind::OneDay => "📅 1 Day Reminder",
        }
    }

    /// Push payload for a chore reminder of this kind.
    pub fn notification(&self, task: &str) -> PushNotification {
        PushNotification::new(
            format!("{} - Chore Due", self.label()),
            format!("Reminder: Your chore '{task}' is due soon."),
        )
    }
}

/// Which reminder, if any, `chore` gets in this cycle. First match wins.
pub fn classify(chore: &Chore, window: &ReminderWindow) -> Option<ReminderKind> {
    if chore.completed {
        return None;
    }
    let due = chore.due_date?;
    if due < window.now {
        return None;
    }
    if due <= window.one_hour_later {
        Some(ReminderKind::OneHour)
    } else if due <= window.one_day_later {
        Some(ReminderKind::OneDay)
    } else {
        None
    }
}
