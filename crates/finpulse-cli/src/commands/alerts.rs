//! Threshold check command implementations

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use finpulse_core::models::OwnerId;
use finpulse_core::{
    AlertEvaluator, CheckOutcome, Database, DbNotificationSink, FinpulseConfig, OwnerCheckReport,
};
use serde::Serialize;
use tracing::warn;

use super::{date_or_today, Output};

/// Run the monthly budget and daily limit checks for one owner,
/// delivering alerts through the database sink
pub fn run_owner_checks(
    db: &Database,
    config: &FinpulseConfig,
    owner: OwnerId,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<OwnerCheckReport> {
    let sink = DbNotificationSink::new(db).with_window(config.alerts.dedup_window);
    let evaluator =
        AlertEvaluator::new(db, &sink).with_policy(config.alerts.daily_limit_policy);
    Ok(evaluator.check_owner(owner, today, now)?)
}

/// Check every owner in `owners`; a failing owner is logged and skipped
pub fn run_checks_for_owners(
    db: &Database,
    config: &FinpulseConfig,
    owners: &[OwnerId],
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Vec<OwnerCheckReport> {
    owners
        .iter()
        .filter_map(|&owner| match run_owner_checks(db, config, owner, today, now) {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(owner_id = owner, "Threshold check failed: {:#}", e);
                None
            }
        })
        .collect()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckJson {
    owner_id: OwnerId,
    check: &'static str,
    status: &'static str,
    severity: Option<String>,
    message: Option<String>,
}

fn outcome_json(owner_id: OwnerId, check: &'static str, outcome: &CheckOutcome) -> CheckJson {
    let (status, severity, message) = match outcome {
        CheckOutcome::Skipped => ("skipped", None, None),
        CheckOutcome::Clear => ("clear", None, None),
        CheckOutcome::Alerted { alert, outcome } => (
            if outcome.is_delivered() {
                "delivered"
            } else {
                "duplicate"
            },
            Some(alert.severity.to_string()),
            Some(alert.message.clone()),
        ),
    };
    CheckJson {
        owner_id,
        check,
        status,
        severity,
        message,
    }
}

fn print_outcome(label: &str, outcome: &CheckOutcome) {
    match outcome {
        CheckOutcome::Skipped => println!("   {:8} ⏭️  skipped (no limit)", label),
        CheckOutcome::Clear => println!("   {:8} ✅ within limits", label),
        CheckOutcome::Alerted { alert, outcome } => {
            let note = if outcome.is_delivered() {
                ""
            } else {
                " (already notified)"
            };
            println!("   {:8} 🔔 [{}] {}{}", label, alert.severity, alert.message, note);
        }
    }
}

pub fn cmd_check(
    db: &Database,
    config: &FinpulseConfig,
    owners: &[OwnerId],
    date: Option<&str>,
    out: Output,
) -> Result<()> {
    let today = date_or_today(date)?;
    let reports = run_checks_for_owners(db, config, owners, today, Utc::now());

    if out.json {
        let rows: Vec<CheckJson> = reports
            .iter()
            .flat_map(|r| {
                [
                    outcome_json(r.owner_id, "monthly", &r.monthly),
                    outcome_json(r.owner_id, "daily", &r.daily),
                ]
            })
            .collect();
        out.emit_json(&rows)?;
        return Ok(());
    }

    println!();
    println!("🚦 Threshold Check ({})", today);
    println!("   Daily limit: {}", config.alerts.daily_limit_policy.name());
    println!("   ─────────────────────────────────────────────────────────────");

    if reports.is_empty() {
        println!("   No owners checked.");
        return Ok(());
    }

    for report in &reports {
        println!("   Owner {}", report.owner_id);
        print_outcome("Monthly", &report.monthly);
        print_outcome("Daily", &report.daily);
    }

    if reports.len() < owners.len() {
        println!();
        println!(
            "   ⚠️  {} owner(s) failed; see the log for details",
            owners.len() - reports.len()
        );
    }

    Ok(())
}
