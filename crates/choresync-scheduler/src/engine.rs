//! Reminder scanner: the scheduled sweep over every household's chores.
//!
//! One cycle:
//! ```text
//! households (list)
//!   └── per household, up to `concurrency` at once, failures isolated
//!         chores where completed == false && now <= dueDate <= now + 24h
//!           └── classify → users/{assignedTo} → single-target push
//! ```
//! A cycle never returns an error. Failures are logged and counted in the
//! [`ScanReport`], and the next cycle starts from scratch.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;

use choresync_core::entities::{Chore, User, households_path, users_path};
use choresync_core::error::Result;
use choresync_core::traits::{DocumentStore, PushSender};

use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::reminder::{ReminderWindow, classify};
use crate::schedule::Schedule;

/// Summary of one scan cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub started_at: Option<DateTime<Utc>>,
    pub households_scanned: usize,
    pub households_failed: usize,
    pub chores_considered: usize,
    pub reminders_sent: usize,
    pub reminders_failed: usize,
    /// Chores skipped because the assignee has no device token.
    pub skipped_unreachable: usize,
    /// Chores whose assignee lookup failed.
    pub chore_errors: usize,
    /// Set when the cycle could not list households at all.
    pub error: Option<String>,
}

impl ScanReport {
    fn absorb(&mut self, stats: HouseholdStats) {
        self.chores_considered += stats.chores_considered;
        self.reminders_sent += stats.reminders_sent;
        self.reminders_failed += stats.reminders_failed;
        self.skipped_unreachable += stats.skipped_unreachable;
        self.chore_errors += stats.chore_errors;
    }
}

#[derive(Debug, Default)]
struct HouseholdStats {
    chores_considered: usize,
    reminders_sent: usize,
    reminders_failed: usize,
    skipped_unreachable: usize,
    chore_errors: usize,
}

enum ChoreOutcome {
    NotDue,
    Unreachable,
    Sent,
    Failed,
}

pub struct ReminderScanner {
    store: Arc<dyn DocumentStore>,
    dispatcher: Dispatcher,
    concurrency: usize,
}

impl ReminderScanner {
    pub fn new(store: Arc<dyn DocumentStore>, sender: Arc<dyn PushSender>) -> Self {
        Self {
            store,
            dispatcher: Dispatcher::new(sender),
            concurrency: 4,
        }
    }

    /// Households processed at the same time (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Run one cycle against the current time.
    pub async fn run_cycle(&self) -> ScanReport {
        self.run_cycle_at(Utc::now()).await
    }

    /// Run one cycle with a fixed reference instant.
    pub async fn run_cycle_at(&self, now: DateTime<Utc>) -> ScanReport {
        tracing::info!("⏰ Running scheduled task to check for chore reminders...");
        let window = ReminderWindow::starting_at(now);
        let mut report = ScanReport {
            started_at: Some(now),
            ..ScanReport::default()
        };

        match self.scan(&window, &mut report).await {
            Ok(()) => tracing::info!(
                "✅ Chore reminder check completed: {} household(s), {} sent, {} failed, {} unreachable",
                report.households_scanned,
                report.reminders_sent,
                report.reminders_failed,
                report.skipped_unreachable
            ),
            Err(e) => {
                tracing::error!("❌ Error sending chore reminders: {e}");
                report.error = Some(e.to_string());
            }
        }
        report
    }

    async fn scan(&self, window: &ReminderWindow, report: &mut ScanReport) -> Result<()> {
        let households = self.store.list(&households_path()).await?;

        let results: Vec<(String, Result<HouseholdStats>)> = stream::iter(households)
            .map(|household| async move {
                let result = self.process_household(&household.id, window).await;
                (household.id, result)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (household_id, result) in results {
            report.households_scanned += 1;
            match result {
                Ok(stats) => report.absorb(stats),
                Err(e) => {
                    tracing::warn!("⚠️ Skipping household {household_id}: {e}");
                    report.households_failed += 1;
                }
            }
        }
        Ok(())
    }

    async fn process_household(
        &self,
        household_id: &str,
        window: &ReminderWindow,
    ) -> Result<HouseholdStats> {
        let chores = self.store.query(&window.chore_query(household_id)).await?;
        let mut stats = HouseholdStats::default();

        for doc in &chores {
            let chore = Chore::from_document(doc);
            stats.chores_considered += 1;
            match self.process_chore(household_id, &chore, window).await {
                Ok(ChoreOutcome::NotDue) => {}
                Ok(ChoreOutcome::Unreachable) => stats.skipped_unreachable += 1,
                Ok(ChoreOutcome::Sent) => stats.reminders_sent += 1,
                Ok(ChoreOutcome::Failed) => stats.reminders_failed += 1,
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Chore {}/{}: assignee lookup failed: {e}",
                        household_id,
                        chore.id
                    );
                    stats.chore_errors += 1;
                }
            }
        }
        Ok(stats)
    }

    async fn process_chore(
        &self,
        household_id: &str,
        chore: &Chore,
        window: &ReminderWindow,
    ) -> Result<ChoreOutcome> {
        let Some(kind) = classify(chore, window) else {
            return Ok(ChoreOutcome::NotDue);
        };
        let Some(assignee_id) = chore.assigned_to.as_deref() else {
            return Ok(ChoreOutcome::Unreachable);
        };
        let Some(assignee) = self
            .store
            .get(&users_path(), assignee_id)
            .await?
            .map(|doc| User::from_document(&doc))
        else {
            return Ok(ChoreOutcome::Unreachable);
        };
        let Some(token) = assignee.fcm_token.as_deref() else {
            return Ok(ChoreOutcome::Unreachable);
        };

        tracing::info!(
            "🔔 Sending {} to {} for chore: {} ({})",
            kind.label(),
            assignee.display_name(),
            chore.task,
            household_id
        );
        match self.dispatcher.unicast(token, &kind.notification(&chore.task)).await {
            DispatchOutcome::Sent(_) => Ok(ChoreOutcome::Sent),
            DispatchOutcome::Failed(_) => Ok(ChoreOutcome::Failed),
        }
    }
}

/// Run reminder cycles on `schedule` until the task is aborted.
pub async fn spawn_reminder_loop(scanner: Arc<ReminderScanner>, schedule: Schedule) {
    tracing::info!("⏰ Reminder scheduler started ({schedule})");

    loop {
        let now = Utc::now();
        let Some(next) = schedule.next_after(now) else {
            tracing::warn!("⚠️ Schedule {schedule} has no next run, stopping reminders");
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::debug!("💤 Next reminder scan at {}", next.format("%Y-%m-%d %H:%M:%S UTC"));
        tokio::time::sleep(wait).await;

        scanner.run_cycle().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FlakyStore, RecordingSender};
    use chrono::{Duration, TimeZone};
    use choresync_core::entities::chores_path;
    use choresync_core::types::Document;
    use choresync_store::MemoryStore;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn add_user(store: &MemoryStore, id: &str, token: Option<&str>) {
        let mut doc = Document::new(id).with("householdId", "h1").with("name", id);
        if let Some(token) = token {
            doc = doc.with("fcmToken", token);
        }
        store.insert(&users_path(), doc).unwrap();
    }

    fn add_chore(store: &MemoryStore, household: &str, id: &str, due_in: Duration, completed: bool, assignee: &str) {
        store.insert(&households_path(), Document::new(household)).unwrap();
        store
            .insert(
                &chores_path(household),
                Document::new(id)
                    .with("task", id)
                    .with("dueDate", now() + due_in)
                    .with("completed", completed)
                    .with("assignedTo", assignee),
            )
            .unwrap();
    }

    fn scanner(store: Arc<dyn DocumentStore>, sender: Arc<RecordingSender>) -> ReminderScanner {
        ReminderScanner::new(store, sender)
    }

    #[tokio::test]
    async fn test_thirty_minute_chore_gets_one_hour_reminder() {
        let store = MemoryStore::new();
        add_user(&store, "ua", Some("TA"));
        add_chore(&store, "h1", "Dishes", Duration::minutes(30), false, "ua");
        let sender = Arc::new(RecordingSender::default());

        let report = scanner(Arc::new(store), sender.clone()).run_cycle_at(now()).await;
        assert_eq!(report.reminders_sent, 1);
        assert!(report.error.is_none());

        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].token, "TA");
        assert!(sent[0].notification.title.contains("1 Hour Reminder"));
        assert!(sent[0].notification.title.ends_with("- Chore Due"));
        assert_eq!(sent[0].notification.body, "Reminder: Your chore 'Dishes' is due soon.");
    }

    #[tokio::test]
    async fn test_one_day_reminder_and_exclusions() {
        let store = MemoryStore::new();
        add_user(&store, "ua", Some("TA"));
        add_chore(&store, "h1", "Laundry", Duration::hours(20), false, "ua");
        add_chore(&store, "h1", "Done already", Duration::minutes(30), true, "ua");
        add_chore(&store, "h1", "Next week", Duration::hours(24 * 7), false, "ua");
        add_chore(&store, "h1", "Overdue", Duration::hours(-2), false, "ua");
        let sender = Arc::new(RecordingSender::default());

        let report = scanner(Arc::new(store), sender.clone()).run_cycle_at(now()).await;
        assert_eq!(report.chores_considered, 1);
        let sent = sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].notification.title, "📅 1 Day Reminder - Chore Due");
    }

    #[tokio::test]
    async fn test_unreachable_assignees_skipped_silently() {
        let store = MemoryStore::new();
        add_user(&store, "no-token", None);
        add_chore(&store, "h1", "A", Duration::minutes(10), false, "no-token");
        add_chore(&store, "h1", "B", Duration::minutes(10), false, "ghost");
        let sender = Arc::new(RecordingSender::default());

        let report = scanner(Arc::new(store), sender.clone()).run_cycle_at(now()).await;
        assert_eq!(report.skipped_unreachable, 2);
        assert_eq!(report.reminders_sent, 0);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_households_query_failure_ends_cycle_quietly() {
        let store = FlakyStore::default().fail_collection("households");
        add_user(&store.inner, "ua", Some("TA"));
        add_chore(&store.inner, "h1", "Dishes", Duration::minutes(30), false, "ua");
        let sender = Arc::new(RecordingSender::default());

        let report = scanner(Arc::new(store), sender.clone()).run_cycle_at(now()).await;
        assert!(report.error.as_deref().unwrap().contains("households"));
        assert_eq!(report.households_scanned, 0);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_household_failure_does_not_stop_others() {
        let store = FlakyStore::default().fail_collection("households/h1/chores");
        add_user(&store.inner, "ua", Some("TA"));
        add_chore(&store.inner, "h1", "Broken", Duration::minutes(30), false, "ua");
        add_chore(&store.inner, "h2", "Fine", Duration::minutes(30), false, "ua");
        let sender = Arc::new(RecordingSender::default());

        let report = scanner(Arc::new(store), sender.clone())
            .with_concurrency(1)
            .run_cycle_at(now())
            .await;
        assert_eq!(report.households_scanned, 2);
        assert_eq!(report.households_failed, 1);
        assert_eq!(report.reminders_sent, 1);
        assert_eq!(sender.sent()[0].notification.body, "Reminder: Your chore 'Fine' is due soon.");
    }

    #[tokio::test]
    async fn test_assignee_lookup_failure_is_per_chore() {
        let store = FlakyStore::default().fail_doc("flaky-user");
        add_user(&store.inner, "ua", Some("TA"));
        add_chore(&store.inner, "h1", "A", Duration::minutes(30), false, "flaky-user");
        add_chore(&store.inner, "h1", "B", Duration::minutes(30), false, "ua");
        let sender = Arc::new(RecordingSender::default());

        let report = scanner(Arc::new(store), sender.clone()).run_cycle_at(now()).await;
        assert_eq!(report.chore_errors, 1);
        assert_eq!(report.reminders_sent, 1);
        assert_eq!(report.households_failed, 0);
    }

    #[tokio::test]
    async fn test_failed_dispatch_does_not_abort_scan() {
        let store = MemoryStore::new();
        add_user(&store, "stale", Some("STALE"));
        add_user(&store, "ua", Some("TA"));
        add_chore(&store, "h1", "A", Duration::minutes(30), false, "stale");
        add_chore(&store, "h2", "B", Duration::hours(3), false, "ua");
        let sender = Arc::new(RecordingSender::rejecting(&["STALE"]));

        let report = scanner(Arc::new(store), sender.clone()).run_cycle_at(now()).await;
        assert_eq!(report.reminders_failed, 1);
        assert_eq!(report.reminders_sent, 1);
        assert_eq!(sender.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_reminders_repeat_every_cycle() {
        let store = MemoryStore::new();
        add_user(&store, "ua", Some("TA"));
        add_chore(&store, "h1", "Laundry", Duration::hours(20), false, "ua");
        let sender = Arc::new(RecordingSender::default());
        let scanner = scanner(Arc::new(store), sender.clone());

        for hour in 0..19 {
            scanner.run_cycle_at(now() + Duration::hours(hour)).await;
        }
        let sent = sender.sent();
        assert_eq!(sent.len(), 19);
        assert!(sent.iter().all(|m| m.notification.title.starts_with("📅 1 Day Reminder")));

        scanner.run_cycle_at(now() + Duration::hours(19)).await;
        assert!(sender.sent()[19].notification.title.starts_with("⏳ 1 Hour Reminder"));
    }

    #[tokio::test]
    async fn test_empty_store() {
        let sender = Arc::new(RecordingSender::default());
        let report = scanner(Arc::new(MemoryStore::new()), sender).run_cycle_at(now()).await;
        assert_eq!(report, ScanReport { started_at: Some(now()), ..ScanReport::default() });
    }

    #[test]
    fn test_concurrency_floor() {
        let s = ReminderScanner::new(Arc::new(MemoryStore::new()), Arc::new(RecordingSender::default()))
            .with_concurrency(0);
        assert_eq!(s.concurrency, 1);
    }
}
