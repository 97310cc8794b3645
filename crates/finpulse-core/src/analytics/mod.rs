//! Financial analytics over an owner's ledger
//!
//! Everything here reads through the [`Ledger`] trait, so the same engines run
//! against the SQLite [`Database`](crate::db::Database) or an in-memory
//! [`MemoryLedger`].
//!
//! ## Components
//!
//! - **Ledger Aggregator** - Sums and category group-bys over a date range
//! - **Health Score Engine** - Weighted 0-100 score with status and recommendations
//! - **Forecast Engine** - Three-month moving average with a confidence label
//!
//! Threshold alerts live in [`crate::alerts`] and consume the same aggregator.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use finpulse_core::analytics::{ForecastEngine, HealthScoreEngine};
//!
//! let health = HealthScoreEngine::new(&db).calculate(owner_id, period)?;
//! let forecast = ForecastEngine::new(&db).predict_next_month(owner_id, period)?;
//! ```

pub mod forecast;
pub mod health;
pub mod ledger;
pub mod stats;

pub use forecast::{Confidence, Forecast, ForecastEngine};
pub use health::{HealthComponents, HealthScore, HealthScoreEngine, HealthStatus};
pub use ledger::{
    Aggregate, BudgetStatus, Ledger, LedgerAggregator, MemoryLedger, MonthlySummary,
    RecentProjection, SpendingPattern,
};
