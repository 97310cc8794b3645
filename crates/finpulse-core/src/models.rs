//! Domain models for finpulse

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Owner identity. Every ledger query and alert is scoped to one owner.
pub type OwnerId = i64;

/// A person whose transactions are tracked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INCOME" => Ok(Self::Income),
            "EXPENSE" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored income or expense record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub owner_id: OwnerId,
    pub kind: TransactionKind,
    pub category: String,
    /// Always positive; direction comes from `kind`
    pub amount: f64,
    pub description: Option<String>,
    pub date: NaiveDate,
    /// Set for rows that came from a CSV import
    pub import_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A transaction to be inserted or used to replace an existing one
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub category: String,
    pub amount: f64,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub import_hash: Option<String>,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            category: category.into(),
            amount,
            description: None,
            date,
            import_hash: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Reject non-positive or non-finite amounts and blank categories
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Transaction amount must be positive, got {}",
                self.amount
            )));
        }
        if self.category.trim().is_empty() {
            return Err(Error::InvalidData(
                "Transaction category must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A calendar month, written `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    // Always the first day of the month
    first: NaiveDate,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| Error::InvalidData(format!("Invalid period: {}-{:02}", year, month)))
    }

    /// The month that contains `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - Days::new(u64::from(date.day0())),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first + Months::new(1) - Days::new(1)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn minus_months(&self, months: u32) -> Self {
        Self {
            first: self.first - Months::new(months),
        }
    }

    pub fn plus_months(&self, months: u32) -> Self {
        Self {
            first: self.first + Months::new(months),
        }
    }

    /// Closed date range covering the whole month
    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != 7 {
            return Err(Error::InvalidData(format!(
                "Invalid period '{}' (expected YYYY-MM)",
                s
            )));
        }
        let first = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").map_err(|_| {
            Error::InvalidData(format!("Invalid period '{}' (expected YYYY-MM)", s))
        })?;
        Ok(Self { first })
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Closed date interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidData(format!(
                "Date range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Monthly spending limit for one owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLimit {
    pub id: i64,
    pub owner_id: OwnerId,
    pub period: Period,
    pub limit_amount: f64,
}

/// Alert severity, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Self::Info => 1,
            Self::Warning => 2,
            Self::Critical => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// A delivered alert as stored by the notification sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub owner_id: OwnerId,
    pub message: String,
    pub severity: Severity,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A user-scheduled reminder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub owner_id: OwnerId,
    pub title: String,
    pub message: String,
    pub remind_at: DateTime<Utc>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReminder {
    pub title: String,
    pub message: String,
    pub remind_at: DateTime<Utc>,
}
