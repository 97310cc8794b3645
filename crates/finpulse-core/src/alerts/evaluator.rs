//! Budget threshold checks
//!
//! Two independent checks, each producing at most one alert:
//! - **Monthly budget** - CRITICAL over the limit, WARNING from 90%, INFO from 75%
//! - **Daily limit** - WARNING over the limit, INFO above 80% of it
//!
//! The `evaluate_*` functions decide; [`AlertEvaluator`] reads the ledger and
//! hands the decision to a sink.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::analytics::{Ledger, LedgerAggregator};
use crate::error::Result;
use crate::models::{BudgetLimit, OwnerId, Period, Severity};

use super::sink::{EmitOutcome, NotificationSink};
use super::{Alert, DEFAULT_DAILY_LIMIT};

const MONTHLY_WARNING_PCT: f64 = 90.0;
const MONTHLY_INFO_PCT: f64 = 75.0;
const DAILY_APPROACHING_RATIO: f64 = 0.8;

/// How the daily spending limit is derived
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DailyLimitPolicy {
    /// The same limit every day
    Fixed { amount: f64 },
    /// The month's budget spread evenly over its days; no budget means no check
    BudgetDerived,
}

impl Default for DailyLimitPolicy {
    fn default() -> Self {
        Self::Fixed {
            amount: DEFAULT_DAILY_LIMIT,
        }
    }
}

impl DailyLimitPolicy {
    /// Limit for `day`, or `None` when the check should be skipped
    pub fn daily_limit(&self, day: NaiveDate, budget: Option<&BudgetLimit>) -> Option<f64> {
        let limit = match self {
            Self::Fixed { amount } => *amount,
            Self::BudgetDerived => {
                let budget = budget?;
                budget.limit_amount / f64::from(Period::containing(day).days_in_month())
            }
        };
        (limit > 0.0).then_some(limit)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fixed { .. } => "fixed",
            Self::BudgetDerived => "budget_derived",
        }
    }
}

/// Severity and text of an alert that should fire
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDecision {
    pub severity: Severity,
    pub message: String,
}

impl AlertDecision {
    fn new(severity: Severity, message: String) -> Self {
        Self { severity, message }
    }
}

/// Decide the monthly budget alert, highest tier first
pub fn evaluate_monthly(period: Period, expense: f64, limit: f64) -> Option<AlertDecision> {
    if limit <= 0.0 {
        return None;
    }
    let pct = expense / limit * 100.0;

    if expense > limit {
        Some(AlertDecision::new(
            Severity::Critical,
            format!(
                "Budget exceeded for {}! Spent: {:.2}, Limit: {:.2}",
                period, expense, limit
            ),
        ))
    } else if pct >= MONTHLY_WARNING_PCT {
        Some(AlertDecision::new(
            Severity::Warning,
            format!(
                "You have used {:.0}% of your {} budget ({:.2} of {:.2})",
                pct, period, expense, limit
            ),
        ))
    } else if pct >= MONTHLY_INFO_PCT {
        Some(AlertDecision::new(
            Severity::Info,
            format!(
                "You have used {:.0}% of your {} budget ({:.2} of {:.2})",
                pct, period, expense, limit
            ),
        ))
    } else {
        None
    }
}

/// Decide the daily limit alert
pub fn evaluate_daily(day: NaiveDate, expense: f64, limit: f64) -> Option<AlertDecision> {
    if limit <= 0.0 {
        return None;
    }

    if expense > limit {
        Some(AlertDecision::new(
            Severity::Warning,
            format!(
                "Daily spending limit exceeded! You spent {:.2} on {} (Limit: {:.2})",
                expense, day, limit
            ),
        ))
    } else if expense > limit * DAILY_APPROACHING_RATIO {
        Some(AlertDecision::new(
            Severity::Info,
            format!(
                "You're approaching your daily limit! Spent {:.2} of {:.2} on {}",
                expense, limit, day
            ),
        ))
    } else {
        None
    }
}

/// Result of one check
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// Nothing to compare against (no budget, or a non-positive limit)
    Skipped,
    /// Spending is below every threshold
    Clear,
    /// An alert fired and was handed to the sink
    Alerted { alert: Alert, outcome: EmitOutcome },
}

impl CheckOutcome {
    pub fn delivered(&self) -> bool {
        matches!(
            self,
            Self::Alerted {
                outcome: EmitOutcome::Delivered(_),
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OwnerCheckReport {
    pub owner_id: OwnerId,
    pub monthly: CheckOutcome,
    pub daily: CheckOutcome,
}

/// Runs threshold checks against a ledger and delivers alerts to a sink
pub struct AlertEvaluator<'a, L: Ledger + ?Sized, S: NotificationSink + ?Sized> {
    aggregator: LedgerAggregator<'a, L>,
    sink: &'a S,
    policy: DailyLimitPolicy,
}

impl<'a, L: Ledger + ?Sized, S: NotificationSink + ?Sized> AlertEvaluator<'a, L, S> {
    pub fn new(ledger: &'a L, sink: &'a S) -> Self {
        Self {
            aggregator: LedgerAggregator::new(ledger),
            sink,
            policy: DailyLimitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: DailyLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> DailyLimitPolicy {
        self.policy
    }

    fn deliver(
        &self,
        owner_id: OwnerId,
        decision: Option<AlertDecision>,
        now: DateTime<Utc>,
    ) -> Result<CheckOutcome> {
        let Some(decision) = decision else {
            return Ok(CheckOutcome::Clear);
        };

        let alert = Alert::new(owner_id, decision.severity, decision.message, now);
        let outcome = self.sink.emit(&alert)?;
        if outcome == EmitOutcome::Duplicate {
            debug!(owner_id, message = %alert.message, "Alert already delivered recently");
        }
        Ok(CheckOutcome::Alerted { alert, outcome })
    }

    /// Compare the month's spend with its budget
    pub fn check_monthly_budget(
        &self,
        owner_id: OwnerId,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<CheckOutcome> {
        let limit = match self.aggregator.ledger().budget(owner_id, period)? {
            Some(budget) if budget.limit_amount > 0.0 => budget.limit_amount,
            _ => {
                debug!(owner_id, period = %period, "No budget, skipping monthly check");
                return Ok(CheckOutcome::Skipped);
            }
        };

        let expense = self.aggregator.monthly_expense(owner_id, period)?;
        self.deliver(owner_id, evaluate_monthly(period, expense, limit), now)
    }

    /// Compare `today`'s spend with the daily limit from the policy
    pub fn check_daily_limit(
        &self,
        owner_id: OwnerId,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<CheckOutcome> {
        let budget = match self.policy {
            DailyLimitPolicy::BudgetDerived => self
                .aggregator
                .ledger()
                .budget(owner_id, Period::containing(today))?,
            DailyLimitPolicy::Fixed { .. } => None,
        };

        let Some(limit) = self.policy.daily_limit(today, budget.as_ref()) else {
            debug!(owner_id, policy = self.policy.name(), "No daily limit, skipping daily check");
            return Ok(CheckOutcome::Skipped);
        };

        let expense = self.aggregator.daily_expense(owner_id, today)?;
        self.deliver(owner_id, evaluate_daily(today, expense, limit), now)
    }

    /// Run both checks for the month containing `today`
    pub fn check_owner(
        &self,
        owner_id: OwnerId,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<OwnerCheckReport> {
        let monthly = self.check_monthly_budget(owner_id, Period::containing(today), now)?;
        let daily = self.check_daily_limit(owner_id, today, now)?;

        let delivered = [&monthly, &daily].iter().filter(|o| o.delivered()).count();
        if delivered > 0 {
            info!(owner_id, delivered, "Threshold alerts delivered");
        }

        Ok(OwnerCheckReport {
            owner_id,
            monthly,
            daily,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::MemorySink;
    use crate::analytics::MemoryLedger;
    use crate::models::TransactionKind::Expense;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 20, 0, 0).unwrap()
    }

    fn oct() -> Period {
        Period::new(2026, 10).unwrap()
    }

    #[test]
    fn test_monthly_tiers() {
        let p = oct();
        assert_eq!(
            evaluate_monthly(p, 1100.0, 1000.0).unwrap().severity,
            Severity::Critical
        );
        assert_eq!(
            evaluate_monthly(p, 1000.0, 1000.0).unwrap().severity,
            Severity::Warning
        );
        assert_eq!(
            evaluate_monthly(p, 900.0, 1000.0).unwrap().severity,
            Severity::Warning
        );
        assert_eq!(
            evaluate_monthly(p, 750.0, 1000.0).unwrap().severity,
            Severity::Info
        );
        assert!(evaluate_monthly(p, 749.0, 1000.0).is_none());
        assert!(evaluate_monthly(p, 500.0, 0.0).is_none());
    }

    #[test]
    fn test_daily_tiers() {
        let d = date(2026, 10, 18);
        assert_eq!(
            evaluate_daily(d, 1000.01, 1000.0).unwrap().severity,
            Severity::Warning
        );
        assert_eq!(
            evaluate_daily(d, 1000.0, 1000.0).unwrap().severity,
            Severity::Info
        );
        assert!(evaluate_daily(d, 800.0, 1000.0).is_none());
        assert!(evaluate_daily(d, 0.0, 1000.0).is_none());
        assert!(evaluate_daily(d, 50.0, 0.0).is_none());
    }

    #[test]
    fn test_daily_limit_policies() {
        let budget = BudgetLimit {
            id: 1,
            owner_id: 1,
            period: oct(),
            limit_amount: 3100.0,
        };
        let day = date(2026, 10, 5);

        assert_eq!(
            DailyLimitPolicy::BudgetDerived.daily_limit(day, Some(&budget)),
            Some(100.0)
        );
        assert_eq!(DailyLimitPolicy::BudgetDerived.daily_limit(day, None), None);
        assert_eq!(
            DailyLimitPolicy::Fixed { amount: 1000.0 }.daily_limit(day, Some(&budget)),
            Some(1000.0)
        );
        assert_eq!(DailyLimitPolicy::Fixed { amount: 0.0 }.daily_limit(day, None), None);
    }

    #[test]
    fn test_over_budget_alert_is_critical_and_deduplicated() {
        let mut ledger = MemoryLedger::new()
            .with_transaction(1, Expense, "Rent", 1100.0, date(2026, 10, 2))
            .unwrap();
        ledger.set_budget(1, oct(), 1000.0);
        let sink = MemorySink::new();
        let evaluator = AlertEvaluator::new(&ledger, &sink);

        let first = evaluator.check_monthly_budget(1, oct(), now()).unwrap();
        match &first {
            CheckOutcome::Alerted { alert, outcome } => {
                assert_eq!(alert.severity, Severity::Critical);
                assert!(outcome.is_delivered());
            }
            other => panic!("expected alert, got {:?}", other),
        }

        let later = now() + chrono::Duration::minutes(30);
        let second = evaluator.check_monthly_budget(1, oct(), later).unwrap();
        assert!(!second.delivered());
        assert_eq!(sink.notifications().len(), 1);
    }

    #[test]
    fn test_monthly_check_skips_without_budget() {
        let ledger = MemoryLedger::new()
            .with_transaction(1, Expense, "Rent", 5000.0, date(2026, 10, 2))
            .unwrap();
        let sink = MemorySink::new();

        let outcome = AlertEvaluator::new(&ledger, &sink)
            .check_monthly_budget(1, oct(), now())
            .unwrap();
        assert_eq!(outcome, CheckOutcome::Skipped);
        assert!(sink.notifications().is_empty());
    }

    #[test]
    fn test_check_owner_budget_derived() {
        let mut ledger = MemoryLedger::new()
            .with_transaction(1, Expense, "Food", 90.0, date(2026, 10, 18))
            .unwrap()
            .with_transaction(1, Expense, "Food", 40.0, date(2026, 10, 18))
            .unwrap()
            .with_transaction(1, Expense, "Food", 500.0, date(2026, 10, 17))
            .unwrap();
        ledger.set_budget(1, oct(), 3100.0);
        let sink = MemorySink::new();

        let report = AlertEvaluator::new(&ledger, &sink)
            .with_policy(DailyLimitPolicy::BudgetDerived)
            .check_owner(1, date(2026, 10, 18), now())
            .unwrap();

        // 630 of 3100 is ~20%, below every monthly tier
        assert_eq!(report.monthly, CheckOutcome::Clear);
        // 130 spent today against a 100 daily limit
        match report.daily {
            CheckOutcome::Alerted { alert, .. } => assert_eq!(alert.severity, Severity::Warning),
            other => panic!("expected daily alert, got {:?}", other),
        }
    }

    #[test]
    fn test_fixed_policy_approaching() {
        let ledger = MemoryLedger::new()
            .with_transaction(1, Expense, "Gadgets", 850.0, date(2026, 10, 18))
            .unwrap();
        let sink = MemorySink::new();

        let outcome = AlertEvaluator::new(&ledger, &sink)
            .check_daily_limit(1, date(2026, 10, 18), now())
            .unwrap();
        assert!(outcome.delivered());
        assert_eq!(sink.notifications()[0].severity, Severity::Info);
    }
}
