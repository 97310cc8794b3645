//! Reminder command implementations

use anyhow::{Context, Result};
use chrono::Utc;
use finpulse_core::models::{NewReminder, OwnerId};
use finpulse_core::{Database, DbNotificationSink, FinpulseConfig, ReminderSweep, SweepReport};

use super::{parse_timestamp, truncate, Output};

fn build_reminder(title: &str, message: &str, at: &str) -> Result<NewReminder> {
    Ok(NewReminder {
        title: title.to_string(),
        message: message.to_string(),
        remind_at: parse_timestamp(at)?,
    })
}

/// Fire due reminders through the database sink
pub fn run_reminder_sweep(db: &Database, config: &FinpulseConfig) -> Result<SweepReport> {
    let sink = DbNotificationSink::new(db).with_window(config.alerts.dedup_window);
    let report = ReminderSweep::new(db, &sink)
        .with_grace(config.schedule.reminder_grace)
        .run(Utc::now())?;
    Ok(report)
}

pub fn cmd_reminders_list(db: &Database, owner: OwnerId, out: Output) -> Result<()> {
    let reminders = db.list_reminders(owner)?;
    if out.emit_json(&reminders)? {
        return Ok(());
    }

    if reminders.is_empty() {
        println!("No reminders. Add one with:");
        println!(
            "  finpulse --owner {} reminders add \"Pay rent\" \"Transfer to landlord\" --at \"2026-11-01 09:00\"",
            owner
        );
        return Ok(());
    }

    println!();
    println!("⏰ Reminders");
    println!("   ─────────────────────────────────────────────────────────────");

    for r in reminders {
        let status = if r.completed { "✅" } else { "⏳" };
        println!(
            "   [{}] {} {} UTC │ {:<20} │ {}",
            r.id,
            status,
            r.remind_at.format("%Y-%m-%d %H:%M"),
            truncate(&r.title, 20),
            truncate(&r.message, 40)
        );
    }

    Ok(())
}

pub fn cmd_reminders_add(
    db: &Database,
    owner: OwnerId,
    title: &str,
    message: &str,
    at: &str,
) -> Result<()> {
    let reminder = build_reminder(title, message, at)?;
    let id = db.create_reminder(owner, &reminder)?;
    println!(
        "✅ Reminder #{} scheduled for {} UTC",
        id,
        reminder.remind_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

pub fn cmd_reminders_update(
    db: &Database,
    owner: OwnerId,
    id: i64,
    title: &str,
    message: &str,
    at: &str,
) -> Result<()> {
    let reminder = build_reminder(title, message, at)?;
    let updated = db
        .update_reminder(owner, id, &reminder)
        .with_context(|| format!("Failed to update reminder {}", id))?;
    println!(
        "✅ Reminder #{} rescheduled for {} UTC",
        updated.id,
        updated.remind_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

pub fn cmd_reminders_delete(db: &Database, owner: OwnerId, id: i64) -> Result<()> {
    db.delete_reminder(owner, id)
        .with_context(|| format!("Failed to delete reminder {}", id))?;
    println!("🗑️  Deleted reminder #{}", id);
    Ok(())
}

pub fn cmd_reminders_sweep(db: &Database, config: &FinpulseConfig) -> Result<()> {
    let report = run_reminder_sweep(db, config)?;
    println!(
        "⏰ Reminder sweep: {} fired, {} already notified",
        report.fired, report.duplicates
    );
    Ok(())
}
