//! Notification command implementations

use anyhow::{Context, Result};
use finpulse_core::models::{OwnerId, Severity};
use finpulse_core::Database;

use super::Output;

pub fn cmd_notifications_list(
    db: &Database,
    owner: OwnerId,
    unread_only: bool,
    out: Output,
) -> Result<()> {
    let notifications = if unread_only {
        db.list_unread_notifications(owner)?
    } else {
        db.list_notifications(owner)?
    };
    if out.emit_json(&notifications)? {
        return Ok(());
    }

    if notifications.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    let unread = db.unread_notification_count(owner)?;

    println!();
    println!("🔔 Notifications ({} unread)", unread);
    println!("   ─────────────────────────────────────────────────────────────");

    for n in notifications {
        let icon = match n.severity {
            Severity::Critical => "🚨",
            Severity::Warning => "⚠️ ",
            Severity::Info => "ℹ️ ",
        };
        let marker = if n.is_read { " " } else { "•" };
        println!(
            "   {} [{}] {} {} │ {}",
            marker,
            n.id,
            icon,
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.message
        );
    }

    Ok(())
}

pub fn cmd_notifications_read(db: &Database, owner: OwnerId, id: i64) -> Result<()> {
    db.mark_notification_read(owner, id)
        .with_context(|| format!("Failed to mark notification {} as read", id))?;
    println!("✅ Notification #{} marked as read", id);
    Ok(())
}

pub fn cmd_notifications_read_all(db: &Database, owner: OwnerId) -> Result<()> {
    let count = db.mark_all_notifications_read(owner)?;
    println!("✅ Marked {} notification(s) as read", count);
    Ok(())
}
