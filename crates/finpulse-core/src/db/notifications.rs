//! Notification storage and the database-backed alert sink

use chrono::Duration;
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};
use tracing::{debug, info};

use super::{format_datetime, parse_datetime, Database};
use crate::alerts::{Alert, EmitOutcome, NotificationSink, DEFAULT_DEDUP_WINDOW_MINUTES};
use crate::error::{Error, Result};
use crate::models::{Notification, OwnerId, Severity};

fn row_to_notification(row: &Row<'_>) -> rusqlite::Result<Notification> {
    let severity_str: String = row.get(3)?;
    let created_at_str: String = row.get(5)?;

    let severity = severity_str.parse::<Severity>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(Notification {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        message: row.get(2)?,
        severity,
        is_read: row.get(4)?,
        created_at: parse_datetime(&created_at_str),
    })
}

const NOTIFICATION_COLUMNS: &str = "id, owner_id, message, severity, is_read, created_at";

/// Alert sink that stores each delivered alert as a notification row
///
/// An alert whose message matches one stored for the same owner inside the
/// trailing window is reported as `Duplicate` and not stored. The lookup and
/// the insert share one `BEGIN IMMEDIATE` transaction, so concurrent emitters
/// for the same owner serialize on the write lock.
pub struct DbNotificationSink<'a> {
    db: &'a Database,
    window: Duration,
}

impl<'a> DbNotificationSink<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            window: Duration::minutes(DEFAULT_DEDUP_WINDOW_MINUTES),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl NotificationSink for DbNotificationSink<'_> {
    fn emit(&self, alert: &Alert) -> Result<EmitOutcome> {
        let mut conn = self.db.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let since = alert
            .timestamp
            .checked_sub_signed(self.window)
            .ok_or_else(|| {
                Error::InvalidData(format!("Dedup window out of range: {}", self.window))
            })?;
        let threshold = format_datetime(since);
        let existing: Option<i64> = tx
            .query_row(
                r#"
                SELECT id FROM notifications
                WHERE owner_id = ? AND message = ? AND created_at > ?
                ORDER BY created_at DESC
                LIMIT 1
                "#,
                params![alert.owner_id, alert.message, threshold],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            debug!(
                owner_id = alert.owner_id,
                notification_id = id,
                message = %alert.message,
                "Suppressed duplicate alert"
            );
            return Ok(EmitOutcome::Duplicate);
        }

        tx.execute(
            "INSERT INTO notifications (owner_id, message, severity, created_at) VALUES (?, ?, ?, ?)",
            params![
                alert.owner_id,
                alert.message,
                alert.severity.as_str(),
                format_datetime(alert.timestamp),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        info!(
            owner_id = alert.owner_id,
            severity = %alert.severity,
            message = %alert.message,
            "Alert delivered"
        );
        Ok(EmitOutcome::Delivered(id))
    }
}

impl Database {
    /// List an owner's notifications, newest first
    pub fn list_notifications(&self, owner_id: OwnerId) -> Result<Vec<Notification>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notifications WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
            NOTIFICATION_COLUMNS
        ))?;

        let notifications = stmt
            .query_map(params![owner_id], row_to_notification)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    /// List an owner's unread notifications, newest first
    pub fn list_unread_notifications(&self, owner_id: OwnerId) -> Result<Vec<Notification>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notifications WHERE owner_id = ? AND is_read = FALSE ORDER BY created_at DESC, id DESC",
            NOTIFICATION_COLUMNS
        ))?;

        let notifications = stmt
            .query_map(params![owner_id], row_to_notification)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(notifications)
    }

    pub fn unread_notification_count(&self, owner_id: OwnerId) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notifications WHERE owner_id = ? AND is_read = FALSE",
            params![owner_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Mark one notification read
    pub fn mark_notification_read(&self, owner_id: OwnerId, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE notifications SET is_read = TRUE WHERE id = ? AND owner_id = ?",
            params![id, owner_id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Notification {}", id)));
        }
        Ok(())
    }

    /// Mark every notification of an owner read, returning how many changed
    pub fn mark_all_notifications_read(&self, owner_id: OwnerId) -> Result<usize> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE notifications SET is_read = TRUE WHERE owner_id = ? AND is_read = FALSE",
            params![owner_id],
        )?;
        Ok(updated)
    }
}
