//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `alerts` - Threshold checks (monthly budget, daily limit)
//! - `analytics` - Health score, forecast, spending pattern, projection, report
//! - `budgets` - Monthly budget limits
//! - `core` - Init, owners and shared utilities (open_db, load_config, parsing)
//! - `import` - CSV import/export
//! - `notifications` - Delivered alerts and read state
//! - `reminders` - Reminder management and manual sweep
//! - `transactions` - Transaction commands (add, list, update, delete)
//! - `watch` - Long-running scheduler

pub mod alerts;
pub mod analytics;
pub mod budgets;
pub mod core;
pub mod import;
pub mod notifications;
pub mod reminders;
pub mod transactions;
pub mod watch;

// Re-export command functions for main.rs
pub use alerts::*;
pub use analytics::*;
pub use budgets::*;
pub use core::*;
pub use import::*;
pub use notifications::*;
pub use reminders::*;
pub use transactions::*;
pub use watch::*;

use anyhow::Result;
use serde::Serialize;

/// Output mode shared by every command
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
}

impl Output {
    /// Print `value` as JSON when `--json` is set; returns whether it did
    pub fn emit_json<T: Serialize>(&self, value: &T) -> Result<bool> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        Ok(self.json)
    }
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
