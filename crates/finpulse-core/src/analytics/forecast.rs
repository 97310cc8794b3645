//! Next-month expense forecast
//!
//! Simple moving average over the three completed months before the current
//! one. Confidence comes from how much those three months disagree.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::{OwnerId, Period};

use super::ledger::{Ledger, LedgerAggregator};
use super::stats;

/// CV below this is `High` confidence
const HIGH_CONFIDENCE_CV: f64 = 0.15;
/// CV below this is `Medium` confidence
const MEDIUM_CONFIDENCE_CV: f64 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn from_cv(cv: f64) -> Self {
        if cv < HIGH_CONFIDENCE_CV {
            Self::High
        } else if cv < MEDIUM_CONFIDENCE_CV {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forecast {
    pub predicted_amount: f64,
    pub confidence: Confidence,
}

impl Forecast {
    /// Forecast from three monthly expense totals
    pub fn from_samples(samples: &[f64; 3]) -> Self {
        if samples.iter().all(|s| *s == 0.0) {
            return Self {
                predicted_amount: 0.0,
                confidence: Confidence::Low,
            };
        }

        let predicted_amount = stats::mean(samples);
        let confidence = stats::coefficient_of_variation(samples)
            .map(Confidence::from_cv)
            .unwrap_or(Confidence::Low);

        Self {
            predicted_amount,
            confidence,
        }
    }
}

pub struct ForecastEngine<'a, L: Ledger + ?Sized> {
    aggregator: LedgerAggregator<'a, L>,
}

impl<'a, L: Ledger + ?Sized> ForecastEngine<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self {
            aggregator: LedgerAggregator::new(ledger),
        }
    }

    /// Predict expenses for the month after `current`
    ///
    /// `current` itself is incomplete and is not sampled.
    pub fn predict_next_month(&self, owner_id: OwnerId, current: Period) -> Result<Forecast> {
        let samples = self
            .aggregator
            .expense_window(owner_id, current, [1, 2, 3])?;
        let forecast = Forecast::from_samples(&samples);

        debug!(
            owner_id,
            period = %current,
            ?samples,
            predicted = forecast.predicted_amount,
            confidence = %forecast.confidence,
            "Expense forecast"
        );
        Ok(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::MemoryLedger;
    use crate::models::TransactionKind::Expense;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_flat_history_is_high_confidence() {
        let forecast = Forecast::from_samples(&[1000.0, 1000.0, 1000.0]);
        assert_eq!(forecast.predicted_amount, 1000.0);
        assert_eq!(forecast.confidence, Confidence::High);
    }

    #[test]
    fn test_single_spike_is_low_confidence() {
        let forecast = Forecast::from_samples(&[1000.0, 0.0, 0.0]);
        assert!((forecast.predicted_amount - 333.333_333).abs() < 1e-3);
        assert_eq!(forecast.confidence, Confidence::Low);
    }

    #[test]
    fn test_no_history() {
        let forecast = Forecast::from_samples(&[0.0, 0.0, 0.0]);
        assert_eq!(forecast.predicted_amount, 0.0);
        assert_eq!(forecast.confidence, Confidence::Low);
    }

    #[test]
    fn test_confidence_cutoffs_are_left_inclusive() {
        assert_eq!(Confidence::from_cv(0.0), Confidence::High);
        assert_eq!(Confidence::from_cv(0.1499), Confidence::High);
        assert_eq!(Confidence::from_cv(0.15), Confidence::Medium);
        assert_eq!(Confidence::from_cv(0.2999), Confidence::Medium);
        assert_eq!(Confidence::from_cv(0.30), Confidence::Low);
    }

    #[test]
    fn test_medium_confidence_samples() {
        // mean 1000, SD 200 -> CV 0.2
        let forecast = Forecast::from_samples(&[1200.0, 1000.0, 800.0]);
        assert_eq!(forecast.confidence, Confidence::Medium);
    }

    #[test]
    fn test_predict_skips_current_month() {
        let ledger = MemoryLedger::new()
            .with_transaction(1, Expense, "Rent", 1000.0, date(2026, 7, 1))
            .unwrap()
            .with_transaction(1, Expense, "Rent", 1000.0, date(2026, 8, 1))
            .unwrap()
            .with_transaction(1, Expense, "Rent", 1000.0, date(2026, 9, 1))
            .unwrap()
            .with_transaction(1, Expense, "Splurge", 9000.0, date(2026, 10, 2))
            .unwrap();

        let forecast = ForecastEngine::new(&ledger)
            .predict_next_month(1, "2026-10".parse().unwrap())
            .unwrap();
        assert_eq!(forecast.predicted_amount, 1000.0);
        assert_eq!(forecast.confidence, Confidence::High);
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(Forecast::from_samples(&[1.0, 1.0, 1.0])).unwrap();
        assert_eq!(json["predictedAmount"], 1.0);
        assert_eq!(json["confidence"], "High");
    }
}
