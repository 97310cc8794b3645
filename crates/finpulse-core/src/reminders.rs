//! Reminder sweep
//!
//! Fires reminders that came due within the grace window as INFO alerts and
//! marks them completed. Reminders that are already older than the window
//! when the sweep runs are left as they are.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::alerts::{Alert, EmitOutcome, NotificationSink};
use crate::db::Database;
use crate::error::Result;
use crate::models::{Reminder, Severity};

/// Default grace window and sweep period
pub const DEFAULT_REMINDER_GRACE_MINUTES: i64 = 5;

/// Counts from one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub fired: usize,
    pub duplicates: usize,
}

pub fn reminder_message(reminder: &Reminder) -> String {
    format!("Reminder: {} - {}", reminder.title, reminder.message)
}

pub struct ReminderSweep<'a, S: NotificationSink + ?Sized> {
    db: &'a Database,
    sink: &'a S,
    grace: Duration,
}

impl<'a, S: NotificationSink + ?Sized> ReminderSweep<'a, S> {
    pub fn new(db: &'a Database, sink: &'a S) -> Self {
        Self {
            db,
            sink,
            grace: Duration::minutes(DEFAULT_REMINDER_GRACE_MINUTES),
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Fire every open reminder with `remind_at` in `(now - grace, now]`
    pub fn run(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let due = self.db.due_reminders(now, self.grace)?;
        let mut report = SweepReport::default();

        for reminder in due {
            let alert = Alert::new(
                reminder.owner_id,
                Severity::Info,
                reminder_message(&reminder),
                now,
            );

            match self.sink.emit(&alert)? {
                EmitOutcome::Delivered(_) => report.fired += 1,
                EmitOutcome::Duplicate => {
                    debug!(reminder_id = reminder.id, "Reminder alert already delivered");
                    report.duplicates += 1;
                }
            }
            self.db.complete_reminder(reminder.id)?;
        }

        if report.fired > 0 {
            info!(fired = report.fired, "Reminder sweep delivered alerts");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::MemorySink;
    use crate::models::NewReminder;
    use chrono::TimeZone;

    fn setup() -> (Database, i64) {
        let db = Database::in_memory().unwrap();
        let owner = db.upsert_owner("Alex", "alex@example.com").unwrap();
        (db, owner)
    }

    fn reminder(title: &str, remind_at: DateTime<Utc>) -> NewReminder {
        NewReminder {
            title: title.to_string(),
            message: "Pay the electricity bill".to_string(),
            remind_at,
        }
    }

    #[test]
    fn test_due_reminder_fires_once() {
        let (db, owner) = setup();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let id = db
            .create_reminder(owner, &reminder("Bills", now - Duration::minutes(2)))
            .unwrap();
        let sink = MemorySink::new();
        let sweep = ReminderSweep::new(&db, &sink);

        let report = sweep.run(now).unwrap();
        assert_eq!(report.fired, 1);
        assert_eq!(
            sink.notifications()[0].message,
            "Reminder: Bills - Pay the electricity bill"
        );
        assert!(db.get_reminder(owner, id).unwrap().completed);

        let again = sweep.run(now + Duration::minutes(1)).unwrap();
        assert_eq!(again, SweepReport::default());
        assert_eq!(sink.notifications().len(), 1);
    }

    #[test]
    fn test_stale_and_future_reminders_untouched() {
        let (db, owner) = setup();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let stale = db
            .create_reminder(owner, &reminder("Old", now - Duration::minutes(30)))
            .unwrap();
        let future = db
            .create_reminder(owner, &reminder("Later", now + Duration::minutes(30)))
            .unwrap();
        let sink = MemorySink::new();

        let report = ReminderSweep::new(&db, &sink).run(now).unwrap();
        assert_eq!(report.fired, 0);
        assert!(!db.get_reminder(owner, stale).unwrap().completed);
        assert!(!db.get_reminder(owner, future).unwrap().completed);
    }

    #[test]
    fn test_sweep_window_bounds() {
        let (db, owner) = setup();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap() + Duration::milliseconds(250);
        let at_now = db.create_reminder(owner, &reminder("Now", now)).unwrap();
        let at_edge = db
            .create_reminder(owner, &reminder("Edge", now - Duration::minutes(5)))
            .unwrap();
        let inside = db
            .create_reminder(
                owner,
                &reminder("Inside", now - Duration::minutes(5) + Duration::milliseconds(1)),
            )
            .unwrap();
        let sink = MemorySink::new();

        let report = ReminderSweep::new(&db, &sink).run(now).unwrap();
        assert_eq!(report.fired, 2);
        assert!(db.get_reminder(owner, at_now).unwrap().completed);
        assert!(db.get_reminder(owner, inside).unwrap().completed);
        assert!(!db.get_reminder(owner, at_edge).unwrap().completed);
    }
}
