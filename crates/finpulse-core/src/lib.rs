//! Finpulse Core Library
//!
//! Shared functionality for the finpulse financial analytics engine:
//! - Database access and migrations (encrypted SQLite)
//! - Ledger aggregation over an owner's transactions
//! - Financial health score and next-month expense forecast
//! - Budget threshold alerts with windowed deduplication
//! - Reminder sweep
//! - CSV import/export and monthly reports
//! - TOML configuration with embedded defaults

pub mod alerts;
pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod reminders;

pub use alerts::{
    Alert, AlertEvaluator, CheckOutcome, DailyLimitPolicy, EmitOutcome, MemorySink,
    NotificationSink, OwnerCheckReport,
};
pub use analytics::{
    Aggregate, BudgetStatus, Confidence, Forecast, ForecastEngine, HealthScore,
    HealthScoreEngine, HealthStatus, Ledger, LedgerAggregator, MemoryLedger, MonthlySummary,
    RecentProjection, SpendingPattern,
};
pub use config::{AlertConfig, FinpulseConfig, ScheduleConfig};
pub use db::{Database, DbNotificationSink, TransactionInsertResult};
pub use error::{Error, Result};
pub use import::ImportResult;
pub use reminders::{ReminderSweep, SweepReport};
