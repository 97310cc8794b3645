//! Reminder operations

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{format_datetime, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{NewReminder, OwnerId, Reminder};

const REMINDER_COLUMNS: &str = "id, owner_id, title, message, remind_at, completed, created_at";

fn row_to_reminder(row: &Row<'_>) -> rusqlite::Result<Reminder> {
    let remind_at_str: String = row.get(4)?;
    let created_at_str: String = row.get(6)?;

    Ok(Reminder {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        title: row.get(2)?,
        message: row.get(3)?,
        remind_at: parse_datetime(&remind_at_str),
        completed: row.get(5)?,
        created_at: parse_datetime(&created_at_str),
    })
}

fn validate_reminder(reminder: &NewReminder) -> Result<()> {
    if reminder.title.trim().is_empty() {
        return Err(Error::InvalidData(
            "Reminder title must not be empty".to_string(),
        ));
    }
    Ok(())
}

impl Database {
    /// Create a reminder for an owner
    pub fn create_reminder(&self, owner_id: OwnerId, reminder: &NewReminder) -> Result<i64> {
        validate_reminder(reminder)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO reminders (owner_id, title, message, remind_at) VALUES (?, ?, ?, ?)",
            params![
                owner_id,
                reminder.title.trim(),
                reminder.message,
                format_datetime(reminder.remind_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_reminder(&self, owner_id: OwnerId, id: i64) -> Result<Reminder> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM reminders WHERE id = ? AND owner_id = ?",
                REMINDER_COLUMNS
            ),
            params![id, owner_id],
            row_to_reminder,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Reminder {}", id)))
    }

    /// Replace a reminder's fields; rescheduling also re-arms it
    pub fn update_reminder(
        &self,
        owner_id: OwnerId,
        id: i64,
        reminder: &NewReminder,
    ) -> Result<Reminder> {
        validate_reminder(reminder)?;
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE reminders
            SET title = ?, message = ?, remind_at = ?, completed = FALSE
            WHERE id = ? AND owner_id = ?
            "#,
            params![
                reminder.title.trim(),
                reminder.message,
                format_datetime(reminder.remind_at),
                id,
                owner_id,
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Reminder {}", id)));
        }
        drop(conn);

        self.get_reminder(owner_id, id)
    }

    pub fn delete_reminder(&self, owner_id: OwnerId, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM reminders WHERE id = ? AND owner_id = ?",
            params![id, owner_id],
        )?;

        if deleted == 0 {
            return Err(Error::NotFound(format!("Reminder {}", id)));
        }
        Ok(())
    }

    /// List an owner's reminders by due time
    pub fn list_reminders(&self, owner_id: OwnerId) -> Result<Vec<Reminder>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM reminders WHERE owner_id = ? ORDER BY remind_at, id",
            REMINDER_COLUMNS
        ))?;

        let reminders = stmt
            .query_map(params![owner_id], row_to_reminder)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reminders)
    }

    /// Open reminders with `remind_at` in `(now - grace, now]`, across all owners
    pub fn due_reminders(&self, now: DateTime<Utc>, grace: Duration) -> Result<Vec<Reminder>> {
        let since = now
            .checked_sub_signed(grace)
            .ok_or_else(|| Error::InvalidData(format!("Reminder grace out of range: {}", grace)))?;
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT {} FROM reminders
            WHERE completed = FALSE AND remind_at > ? AND remind_at <= ?
            ORDER BY remind_at, id
            "#,
            REMINDER_COLUMNS
        ))?;

        let reminders = stmt
            .query_map(
                params![format_datetime(since), format_datetime(now)],
                row_to_reminder,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(reminders)
    }

    pub fn complete_reminder(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE reminders SET completed = TRUE WHERE id = ?",
            params![id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Reminder {}", id)));
        }
        Ok(())
    }
}
