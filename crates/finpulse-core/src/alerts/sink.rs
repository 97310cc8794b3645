//! Notification sink contract

use std::sync::Mutex;

use chrono::Duration;

use crate::error::{Error, Result};
use crate::models::{Notification, OwnerId};

use super::{Alert, DEFAULT_DEDUP_WINDOW_MINUTES};

/// What happened to an emitted alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// Stored, with the new notification id
    Delivered(i64),
    /// Same owner and message already stored inside the dedup window
    Duplicate,
}

impl EmitOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered(_))
    }
}

/// Destination for alerts
///
/// Implementations must make the duplicate lookup and the insert atomic per
/// owner: two concurrent emits of the same message store at most one row.
pub trait NotificationSink {
    fn emit(&self, alert: &Alert) -> Result<EmitOutcome>;
}

/// Sink that keeps notifications in memory
#[derive(Debug)]
pub struct MemorySink {
    window: Duration,
    stored: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            window: Duration::minutes(DEFAULT_DEDUP_WINDOW_MINUTES),
            stored: Mutex::new(Vec::new()),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Snapshot of everything delivered so far, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.stored
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn notifications_for(&self, owner_id: OwnerId) -> Vec<Notification> {
        self.notifications()
            .into_iter()
            .filter(|n| n.owner_id == owner_id)
            .collect()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for MemorySink {
    fn emit(&self, alert: &Alert) -> Result<EmitOutcome> {
        let mut stored = self
            .stored
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let threshold = alert
            .timestamp
            .checked_sub_signed(self.window)
            .ok_or_else(|| {
                Error::InvalidData(format!("Dedup window out of range: {}", self.window))
            })?;
        let duplicate = stored.iter().any(|n| {
            n.owner_id == alert.owner_id && n.message == alert.message && n.created_at > threshold
        });
        if duplicate {
            return Ok(EmitOutcome::Duplicate);
        }

        let id = stored.len() as i64 + 1;
        stored.push(Notification {
            id,
            owner_id: alert.owner_id,
            message: alert.message.clone(),
            severity: alert.severity,
            is_read: false,
            created_at: alert.timestamp,
        });
        Ok(EmitOutcome::Delivered(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn at(hour: u32, minute: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_duplicate_within_window_is_suppressed() {
        let sink = MemorySink::new();
        let alert = Alert::new(1, Severity::Critical, "Budget exceeded", at(9, 0));

        assert!(sink.emit(&alert).unwrap().is_delivered());
        let again = Alert::new(1, Severity::Critical, "Budget exceeded", at(9, 59));
        assert_eq!(sink.emit(&again).unwrap(), EmitOutcome::Duplicate);
        assert_eq!(sink.notifications().len(), 1);
    }

    #[test]
    fn test_window_expiry_and_scoping() {
        let sink = MemorySink::new();
        sink.emit(&Alert::new(1, Severity::Info, "msg", at(9, 0)))
            .unwrap();

        // Exactly one hour later is outside the trailing window
        assert!(sink
            .emit(&Alert::new(1, Severity::Info, "msg", at(10, 0)))
            .unwrap()
            .is_delivered());
        // Other owners and other messages are independent
        assert!(sink
            .emit(&Alert::new(2, Severity::Info, "msg", at(10, 0)))
            .unwrap()
            .is_delivered());
        assert!(sink
            .emit(&Alert::new(1, Severity::Info, "other", at(10, 0)))
            .unwrap()
            .is_delivered());

        assert_eq!(sink.notifications_for(1).len(), 3);
    }

    #[test]
    fn test_concurrent_emits_store_once() {
        let sink = Arc::new(MemorySink::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    sink.emit(&Alert::new(1, Severity::Warning, "same", at(12, 0)))
                        .unwrap()
                })
            })
            .collect();

        let delivered = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| o.is_delivered())
            .count();
        assert_eq!(delivered, 1);
        assert_eq!(sink.notifications().len(), 1);
    }
}
