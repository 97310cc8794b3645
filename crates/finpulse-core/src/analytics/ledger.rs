//! Ledger query contract and the aggregator built on it

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{
    BudgetLimit, DateRange, NewTransaction, OwnerId, Period, Transaction, TransactionKind,
};

use super::stats;

/// Read-only view of an owner's transactions and budgets
///
/// Sums over an empty selection are `0.0` and category maps are empty; an
/// implementation never reports "no data" as an error.
pub trait Ledger {
    /// Total amount of `kind` transactions within `range` (inclusive)
    fn sum(&self, owner_id: OwnerId, kind: TransactionKind, range: DateRange) -> Result<f64>;

    /// Totals of `kind` transactions within `range`, keyed by category
    fn sum_by_category(
        &self,
        owner_id: OwnerId,
        kind: TransactionKind,
        range: DateRange,
    ) -> Result<BTreeMap<String, f64>>;

    /// Raw transactions, newest first; `None` means all of them
    fn transactions(&self, owner_id: OwnerId, range: Option<DateRange>)
        -> Result<Vec<Transaction>>;

    /// The monthly limit for `period`, if one was set
    fn budget(&self, owner_id: OwnerId, period: Period) -> Result<Option<BudgetLimit>>;
}

/// Ledger held entirely in memory, filtered on each query
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    transactions: Vec<Transaction>,
    budgets: Vec<BudgetLimit>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a transaction, returning its id
    pub fn add_transaction(&mut self, owner_id: OwnerId, tx: NewTransaction) -> Result<i64> {
        tx.validate()?;
        let id = self.transactions.len() as i64 + 1;
        self.transactions.push(Transaction {
            id,
            owner_id,
            kind: tx.kind,
            category: tx.category.trim().to_string(),
            amount: tx.amount,
            description: tx.description,
            date: tx.date,
            import_hash: tx.import_hash,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    pub fn with_transaction(
        mut self,
        owner_id: OwnerId,
        kind: TransactionKind,
        category: &str,
        amount: f64,
        date: NaiveDate,
    ) -> Result<Self> {
        self.add_transaction(owner_id, NewTransaction::new(kind, category, amount, date))?;
        Ok(self)
    }

    /// Set the limit for a period, replacing any earlier one
    pub fn set_budget(&mut self, owner_id: OwnerId, period: Period, limit_amount: f64) {
        if let Some(existing) = self
            .budgets
            .iter_mut()
            .find(|b| b.owner_id == owner_id && b.period == period)
        {
            existing.limit_amount = limit_amount;
            return;
        }

        let id = self.budgets.len() as i64 + 1;
        self.budgets.push(BudgetLimit {
            id,
            owner_id,
            period,
            limit_amount,
        });
    }

    fn matching(
        &self,
        owner_id: OwnerId,
        kind: TransactionKind,
        range: DateRange,
    ) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |t| t.owner_id == owner_id && t.kind == kind && range.contains(t.date))
    }
}

impl Ledger for MemoryLedger {
    fn sum(&self, owner_id: OwnerId, kind: TransactionKind, range: DateRange) -> Result<f64> {
        Ok(self.matching(owner_id, kind, range).map(|t| t.amount).sum())
    }

    fn sum_by_category(
        &self,
        owner_id: OwnerId,
        kind: TransactionKind,
        range: DateRange,
    ) -> Result<BTreeMap<String, f64>> {
        let mut totals = BTreeMap::new();
        for t in self.matching(owner_id, kind, range) {
            *totals.entry(t.category.clone()).or_insert(0.0) += t.amount;
        }
        Ok(totals)
    }

    fn transactions(
        &self,
        owner_id: OwnerId,
        range: Option<DateRange>,
    ) -> Result<Vec<Transaction>> {
        let mut rows: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|t| t.owner_id == owner_id && range.map_or(true, |r| r.contains(t.date)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn budget(&self, owner_id: OwnerId, period: Period) -> Result<Option<BudgetLimit>> {
        Ok(self
            .budgets
            .iter()
            .find(|b| b.owner_id == owner_id && b.period == period)
            .cloned())
    }
}

/// Income and expense totals for one owner over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub range: DateRange,
    pub total_income: f64,
    pub total_expense: f64,
    /// Expense totals by category
    pub category_totals: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub period: Period,
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

/// Lifetime expense breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingPattern {
    pub category_spending: BTreeMap<String, f64>,
    /// Category with the highest spend, `"None"` without expenses
    pub top_category: String,
    /// Mean amount of a single expense transaction
    pub average_expense: f64,
    /// All transactions, income included
    pub total_transactions: usize,
}

/// Monthly spend extrapolated from the last 30 days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentProjection {
    pub projected_monthly_expense: f64,
    pub average_expense: f64,
    pub based_on_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub period: Period,
    pub limit: f64,
    pub spent: f64,
    pub exceeded: bool,
}

/// Window length used by [`LedgerAggregator::recent_projection`]
pub const PROJECTION_DAYS: u32 = 30;

/// Derived views over a [`Ledger`]
pub struct LedgerAggregator<'a, L: Ledger + ?Sized> {
    ledger: &'a L,
}

impl<'a, L: Ledger + ?Sized> LedgerAggregator<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &'a L {
        self.ledger
    }

    /// Income, expense and expense-by-category totals over `range`
    pub fn aggregate(&self, owner_id: OwnerId, range: DateRange) -> Result<Aggregate> {
        Ok(Aggregate {
            range,
            total_income: self.ledger.sum(owner_id, TransactionKind::Income, range)?,
            total_expense: self.ledger.sum(owner_id, TransactionKind::Expense, range)?,
            category_totals: self
                .ledger
                .sum_by_category(owner_id, TransactionKind::Expense, range)?,
        })
    }

    pub fn monthly_income(&self, owner_id: OwnerId, period: Period) -> Result<f64> {
        self.ledger
            .sum(owner_id, TransactionKind::Income, period.range())
    }

    pub fn monthly_expense(&self, owner_id: OwnerId, period: Period) -> Result<f64> {
        self.ledger
            .sum(owner_id, TransactionKind::Expense, period.range())
    }

    pub fn daily_expense(&self, owner_id: OwnerId, day: NaiveDate) -> Result<f64> {
        self.ledger
            .sum(owner_id, TransactionKind::Expense, DateRange::single_day(day))
    }

    /// Expense totals for `anchor` shifted back by each offset, in offset order
    ///
    /// Months without transactions contribute `0.0`, so the result always has
    /// three samples.
    pub fn expense_window(
        &self,
        owner_id: OwnerId,
        anchor: Period,
        offsets: [u32; 3],
    ) -> Result<[f64; 3]> {
        let mut samples = [0.0; 3];
        for (sample, offset) in samples.iter_mut().zip(offsets) {
            *sample = self.monthly_expense(owner_id, anchor.minus_months(offset))?;
        }
        Ok(samples)
    }

    pub fn monthly_summary(&self, owner_id: OwnerId, period: Period) -> Result<MonthlySummary> {
        let income = self.monthly_income(owner_id, period)?;
        let expense = self.monthly_expense(owner_id, period)?;
        Ok(MonthlySummary {
            period,
            income,
            expense,
            balance: income - expense,
        })
    }

    pub fn spending_pattern(&self, owner_id: OwnerId) -> Result<SpendingPattern> {
        let transactions = self.ledger.transactions(owner_id, None)?;

        let mut category_spending: BTreeMap<String, f64> = BTreeMap::new();
        let mut expense_amounts = Vec::new();
        for t in transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense)
        {
            *category_spending.entry(t.category.clone()).or_insert(0.0) += t.amount;
            expense_amounts.push(t.amount);
        }

        // Ties go to the alphabetically first category
        let mut top: Option<(&String, f64)> = None;
        for (category, total) in &category_spending {
            if top.map_or(true, |(_, best)| *total > best) {
                top = Some((category, *total));
            }
        }
        let top_category = top
            .map(|(c, _)| c.clone())
            .unwrap_or_else(|| "None".to_string());

        Ok(SpendingPattern {
            top_category,
            average_expense: stats::mean(&expense_amounts),
            total_transactions: transactions.len(),
            category_spending,
        })
    }

    /// Average expense over `[today - 30, today]`, scaled to 30 days
    pub fn recent_projection(&self, owner_id: OwnerId, today: NaiveDate) -> Result<RecentProjection> {
        let start = today - Days::new(u64::from(PROJECTION_DAYS));
        let range = DateRange::new(start, today)?;

        let amounts: Vec<f64> = self
            .ledger
            .transactions(owner_id, Some(range))?
            .into_iter()
            .filter(|t| t.kind == TransactionKind::Expense)
            .map(|t| t.amount)
            .collect();

        let average_expense = stats::mean(&amounts);
        Ok(RecentProjection {
            projected_monthly_expense: average_expense * f64::from(PROJECTION_DAYS),
            average_expense,
            based_on_days: PROJECTION_DAYS,
        })
    }

    pub fn budget_status(&self, owner_id: OwnerId, period: Period) -> Result<BudgetStatus> {
        let Some(budget) = self.ledger.budget(owner_id, period)? else {
            return Ok(BudgetStatus {
                period,
                limit: 0.0,
                spent: 0.0,
                exceeded: false,
            });
        };

        let spent = self.monthly_expense(owner_id, period)?;
        Ok(BudgetStatus {
            period,
            limit: budget.limit_amount,
            spent,
            exceeded: spent > budget.limit_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TransactionKind::{Expense, Income};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(s: &str) -> Period {
        s.parse().unwrap()
    }

    fn sample_ledger() -> MemoryLedger {
        MemoryLedger::new()
            .with_transaction(1, Income, "Salary", 5000.0, date(2026, 10, 1))
            .unwrap()
            .with_transaction(1, Expense, "Rent", 1500.0, date(2026, 10, 2))
            .unwrap()
            .with_transaction(1, Expense, "Food", 200.0, date(2026, 10, 18))
            .unwrap()
            .with_transaction(1, Expense, "Food", 100.0, date(2026, 10, 31))
            .unwrap()
            .with_transaction(1, Expense, "Food", 999.0, date(2026, 11, 1))
            .unwrap()
            .with_transaction(2, Expense, "Rent", 800.0, date(2026, 10, 2))
            .unwrap()
    }

    #[test]
    fn test_empty_ledger_is_zero() {
        let ledger = MemoryLedger::new();
        let agg = LedgerAggregator::new(&ledger);
        let range = period("2026-10").range();

        assert_eq!(ledger.sum(1, Expense, range).unwrap(), 0.0);
        assert!(ledger.sum_by_category(1, Expense, range).unwrap().is_empty());

        let aggregate = agg.aggregate(1, range).unwrap();
        assert_eq!(aggregate.total_income, 0.0);
        assert_eq!(aggregate.total_expense, 0.0);
        assert!(aggregate.category_totals.is_empty());
    }

    #[test]
    fn test_aggregate_is_scoped_to_owner_and_range() {
        let ledger = sample_ledger();
        let agg = LedgerAggregator::new(&ledger);

        let aggregate = agg.aggregate(1, period("2026-10").range()).unwrap();
        assert_eq!(aggregate.total_income, 5000.0);
        assert_eq!(aggregate.total_expense, 1800.0);
        assert_eq!(aggregate.category_totals.get("Food"), Some(&300.0));
        assert_eq!(aggregate.category_totals.get("Rent"), Some(&1500.0));
    }

    #[test]
    fn test_range_endpoints_inclusive() {
        let ledger = sample_ledger();
        let day = DateRange::single_day(date(2026, 10, 31));
        assert_eq!(ledger.sum(1, Expense, day).unwrap(), 100.0);

        let span = DateRange::new(date(2026, 10, 18), date(2026, 10, 31)).unwrap();
        assert_eq!(ledger.sum(1, Expense, span).unwrap(), 300.0);
    }

    #[test]
    fn test_expense_window_zero_fills() {
        let ledger = sample_ledger();
        let agg = LedgerAggregator::new(&ledger);

        let samples = agg.expense_window(1, period("2026-11"), [0, 1, 2]).unwrap();
        assert_eq!(samples, [999.0, 1800.0, 0.0]);
    }

    #[test]
    fn test_monthly_summary_balance() {
        let ledger = sample_ledger();
        let summary = LedgerAggregator::new(&ledger)
            .monthly_summary(1, period("2026-10"))
            .unwrap();
        assert_eq!(summary.balance, 3200.0);
    }

    #[test]
    fn test_spending_pattern() {
        let ledger = sample_ledger();
        let pattern = LedgerAggregator::new(&ledger).spending_pattern(1).unwrap();

        assert_eq!(pattern.top_category, "Rent");
        assert_eq!(pattern.total_transactions, 5);
        assert!((pattern.average_expense - 699.75).abs() < 1e-9);

        let empty = LedgerAggregator::new(&ledger).spending_pattern(42).unwrap();
        assert_eq!(empty.top_category, "None");
        assert_eq!(empty.average_expense, 0.0);
    }

    #[test]
    fn test_recent_projection() {
        let ledger = sample_ledger();
        let projection = LedgerAggregator::new(&ledger)
            .recent_projection(1, date(2026, 10, 31))
            .unwrap();

        // Expenses on 10-02, 10-18 and 10-31 fall in [10-01, 10-31]
        assert!((projection.average_expense - 600.0).abs() < 1e-9);
        assert!((projection.projected_monthly_expense - 18000.0).abs() < 1e-6);
        assert_eq!(projection.based_on_days, 30);
    }

    #[test]
    fn test_budget_status() {
        let mut ledger = sample_ledger();
        let oct = period("2026-10");

        let none = LedgerAggregator::new(&ledger).budget_status(1, oct).unwrap();
        assert!(!none.exceeded);
        assert_eq!(none.limit, 0.0);

        ledger.set_budget(1, oct, 1000.0);
        ledger.set_budget(1, oct, 1700.0);
        let status = LedgerAggregator::new(&ledger).budget_status(1, oct).unwrap();
        assert_eq!(status.limit, 1700.0);
        assert_eq!(status.spent, 1800.0);
        assert!(status.exceeded);
    }
}
