//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Finpulse - Health score, forecasts and budget alerts for your ledger
#[derive(Parser)]
#[command(name = "finpulse")]
#[command(about = "Local financial analytics: health score, forecast and budget alerts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "finpulse.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set FINPULSE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Owner id every command runs as (see `finpulse owners`)
    #[arg(short, long, global = true)]
    pub owner: Option<i64>,

    /// Config file (defaults to the data-dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage owners
    Owners {
        #[command(subcommand)]
        action: Option<OwnersAction>,
    },

    /// Record, list, update and delete transactions
    Tx {
        #[command(subcommand)]
        action: TxAction,
    },

    /// Monthly budget limits
    Budget {
        #[command(subcommand)]
        action: BudgetAction,
    },

    /// Import transactions from CSV (Date,Type,Category,Amount,Description)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Export transactions to CSV
    Export {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Monthly income/expense report
    Report {
        /// Month (YYYY-MM, defaults to current)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Financial health score
    Health {
        /// Month to score (YYYY-MM, defaults to current)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Forecast next month's expenses
    Forecast {
        /// Current month (YYYY-MM, defaults to current); the three months before it are sampled
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Lifetime spending breakdown by category
    Pattern,

    /// Monthly spend projected from the last 30 days
    Projection,

    /// Run the monthly budget and daily limit checks now
    Check {
        /// Day to check (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Check every owner instead of --owner
        #[arg(long)]
        all: bool,
    },

    /// Delivered alerts
    Notifications {
        #[command(subcommand)]
        action: Option<NotificationsAction>,
    },

    /// Scheduled reminders
    Reminders {
        #[command(subcommand)]
        action: Option<RemindersAction>,
    },

    /// Run the scheduler: daily alert check and reminder sweep
    Watch,
}

#[derive(Subcommand)]
pub enum OwnersAction {
    /// List owners (default)
    List,

    /// Add an owner (returns the existing id if the email is known)
    Add {
        /// Display name
        name: String,

        /// Unique email
        email: String,
    },
}

#[derive(Subcommand)]
pub enum TxAction {
    /// Record a transaction
    Add {
        /// INCOME or EXPENSE
        kind: String,

        /// Category (e.g. Food, Rent, Salary)
        category: String,

        /// Positive amount
        amount: f64,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Free-text description
        #[arg(long)]
        description: Option<String>,
    },

    /// List transactions
    List {
        /// Month (YYYY-MM)
        #[arg(short, long, conflicts_with_all = ["from", "to"])]
        period: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Replace a transaction's fields
    Update {
        /// Transaction ID
        id: i64,

        /// INCOME or EXPENSE
        kind: String,

        /// Category
        category: String,

        /// Positive amount
        amount: f64,

        /// Date (YYYY-MM-DD)
        date: String,

        /// Free-text description
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Set the limit for a month (replaces an existing one)
    Set {
        /// Positive limit
        limit: f64,

        /// Month (YYYY-MM, defaults to current)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// List all budgets
    List,

    /// Spend against the limit for a month
    Status {
        /// Month (YYYY-MM, defaults to current)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Remove the limit for a month
    Delete {
        /// Month (YYYY-MM)
        period: String,
    },
}

#[derive(Subcommand)]
pub enum NotificationsAction {
    /// List notifications (default)
    List {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
    },

    /// Mark a notification as read
    Read {
        /// Notification ID
        id: i64,
    },

    /// Mark all notifications as read
    ReadAll,
}

#[derive(Subcommand)]
pub enum RemindersAction {
    /// List reminders (default)
    List,

    /// Schedule a reminder
    Add {
        /// Short title
        title: String,

        /// Message body
        message: String,

        /// When to fire (YYYY-MM-DD HH:MM, UTC)
        #[arg(long)]
        at: String,
    },

    /// Replace a reminder's fields (re-arms a completed reminder)
    Update {
        /// Reminder ID
        id: i64,

        /// Short title
        title: String,

        /// Message body
        message: String,

        /// When to fire (YYYY-MM-DD HH:MM, UTC)
        #[arg(long)]
        at: String,
    },

    /// Delete a reminder
    Delete {
        /// Reminder ID
        id: i64,
    },

    /// Fire due reminders now
    Sweep,
}
