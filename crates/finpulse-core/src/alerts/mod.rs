//! Threshold alerts and the sinks that deliver them
//!
//! - `evaluator` - Monthly budget and daily limit checks
//! - `sink` - The [`NotificationSink`] contract and an in-memory sink
//!
//! The database-backed sink is [`crate::db::DbNotificationSink`].

pub mod evaluator;
pub mod sink;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{OwnerId, Severity};

pub use evaluator::{
    evaluate_daily, evaluate_monthly, AlertDecision, AlertEvaluator, CheckOutcome,
    DailyLimitPolicy, OwnerCheckReport,
};
pub use sink::{EmitOutcome, MemorySink, NotificationSink};

/// Trailing window within which an identical message is not delivered twice
pub const DEFAULT_DEDUP_WINDOW_MINUTES: i64 = 60;

/// Daily limit used by [`DailyLimitPolicy::Fixed`] when none is configured
pub const DEFAULT_DAILY_LIMIT: f64 = 1000.0;

/// An alert ready to hand to a sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub owner_id: OwnerId,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(
        owner_id: OwnerId,
        severity: Severity,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id,
            message: message.into(),
            severity,
            timestamp,
        }
    }
}
