//! Financial health score
//!
//! Three sub-scores, each in `[0, 1]`, weighted 40/30/30:
//! - **Savings rate** - share of the month's income not spent
//! - **Budget discipline** - how far the month's spend is under or over its limit
//! - **Expense stability** - 1 minus the coefficient of variation of the last
//!   three months of expenses

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{OwnerId, Period};

use super::ledger::{Ledger, LedgerAggregator};
use super::stats;

const SAVINGS_WEIGHT: f64 = 40.0;
const DISCIPLINE_WEIGHT: f64 = 30.0;
const STABILITY_WEIGHT: f64 = 30.0;

/// Discipline score when the month has no usable budget
const NEUTRAL_DISCIPLINE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthStatus {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The raw sub-scores behind a [`HealthScore`], each in `[0, 1]`
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HealthComponents {
    pub savings_rate: f64,
    pub budget_discipline: f64,
    pub expense_stability: f64,
    /// Whether the month had a budget with a positive limit
    pub has_budget: bool,
}

impl HealthComponents {
    /// Weighted composite, rounded and clamped to `0..=100`
    pub fn score(&self) -> u8 {
        let raw = self.savings_rate * SAVINGS_WEIGHT
            + self.budget_discipline * DISCIPLINE_WEIGHT
            + self.expense_stability * STABILITY_WEIGHT;
        raw.round().clamp(0.0, 100.0) as u8
    }
}

/// Health score as reported to callers
///
/// Sub-scores are percentages here; the unit ratios are kept in `components`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthScore {
    pub score: u8,
    pub status: HealthStatus,
    pub savings_rate: f64,
    pub budget_discipline: f64,
    pub expense_stability: f64,
    pub recommendations: Vec<String>,
    #[serde(skip)]
    pub components: HealthComponents,
}

impl HealthScore {
    pub fn from_components(components: HealthComponents) -> Self {
        let score = components.score();
        Self {
            score,
            status: HealthStatus::from_score(score),
            savings_rate: as_percent(components.savings_rate),
            budget_discipline: as_percent(components.budget_discipline),
            expense_stability: as_percent(components.expense_stability),
            recommendations: recommendations(&components, score),
            components,
        }
    }
}

fn as_percent(ratio: f64) -> f64 {
    (ratio * 10_000.0).round() / 100.0
}

/// Savings rate from one month's totals; 0 without income
pub fn savings_rate(income: f64, expense: f64) -> f64 {
    if income <= 0.0 {
        return 0.0;
    }
    stats::clamp_unit((income - expense) / income)
}

/// Budget discipline; `None` or a non-positive limit is neutral
pub fn budget_discipline(expense: f64, limit: Option<f64>) -> f64 {
    match limit {
        Some(limit) if limit > 0.0 => {
            if expense <= limit {
                1.0
            } else {
                (1.0 - (expense - limit) / limit).max(0.0)
            }
        }
        _ => NEUTRAL_DISCIPLINE,
    }
}

/// Stability of three monthly expense samples; no spending counts as stable
pub fn expense_stability(samples: &[f64; 3]) -> f64 {
    match stats::coefficient_of_variation(samples) {
        Some(cv) => stats::clamp_unit(1.0 - cv),
        None => 1.0,
    }
}

/// Deterministic advice, one line per sub-score and one for the composite
pub fn recommendations(components: &HealthComponents, score: u8) -> Vec<String> {
    let mut out = Vec::with_capacity(4);

    let savings = components.savings_rate;
    out.push(
        if savings < 0.2 {
            "Your savings rate is below 20%. Try to set aside at least a fifth of your income each month."
        } else if savings < 0.3 {
            "You are saving over 20% of your income. Pushing past 30% would build a stronger cushion."
        } else {
            "Excellent savings rate. You are keeping more than 30% of your income."
        }
        .to_string(),
    );

    let discipline = components.budget_discipline;
    out.push(
        if !components.has_budget {
            "No budget is set for this month. Setting a monthly limit makes overspending visible."
        } else if discipline < 0.5 {
            "Spending is far over this month's budget. Review your largest categories and cut back."
        } else if discipline < 0.8 {
            "Spending is over this month's budget. Trim discretionary expenses to get back on track."
        } else {
            "You are staying within your budget. Keep it up."
        }
        .to_string(),
    );

    let stability = components.expense_stability;
    out.push(
        if stability < 0.5 {
            "Monthly expenses swing widely. Plan for large purchases ahead of time to smooth them out."
        } else if stability < 0.8 {
            "Monthly expenses vary somewhat. Watch for irregular spikes."
        } else {
            "Your monthly expenses are consistent."
        }
        .to_string(),
    );

    out.push(
        match score {
            0..=39 => "Overall financial health needs attention. Start with the weakest area above.",
            40..=59 => "Overall financial health is fair. Small improvements in saving will move the score quickly.",
            60..=79 => "Overall financial health is good. You are close to an excellent rating.",
            _ => "Overall financial health is excellent.",
        }
        .to_string(),
    );

    out
}

/// Computes [`HealthScore`] values from a ledger
pub struct HealthScoreEngine<'a, L: Ledger + ?Sized> {
    aggregator: LedgerAggregator<'a, L>,
}

impl<'a, L: Ledger + ?Sized> HealthScoreEngine<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            aggregator: LedgerAggregator::new(ledger),
        }
    }

    /// Sub-scores for `as_of`, without recommendations
    pub fn components(&self, owner_id: OwnerId, as_of: Period) -> Result<HealthComponents> {
        let income = self.aggregator.monthly_income(owner_id, as_of)?;
        let expense = self.aggregator.monthly_expense(owner_id, as_of)?;
        let limit = self
            .aggregator
            .ledger()
            .budget(owner_id, as_of)?
            .map(|b| b.limit_amount);
        let samples = self.aggregator.expense_window(owner_id, as_of, [0, 1, 2])?;

        let components = HealthComponents {
            savings_rate: savings_rate(income, expense),
            budget_discipline: budget_discipline(expense, limit),
            expense_stability: expense_stability(&samples),
            has_budget: limit.is_some_and(|l| l > 0.0),
        };

        debug!(
            owner_id,
            period = %as_of,
            income,
            expense,
            ?limit,
            ?samples,
            ?components,
            "Health components"
        );
        Ok(components)
    }

    pub fn calculate(&self, owner_id: OwnerId, as_of: Period) -> Result<HealthScore> {
        Ok(HealthScore::from_components(
            self.components(owner_id, as_of)?,
        ))
    }
}
