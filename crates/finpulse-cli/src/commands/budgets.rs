//! Budget command implementations

use anyhow::{Context, Result};
use finpulse_core::models::{OwnerId, Period};
use finpulse_core::{Database, LedgerAggregator};

use super::{period_or_current, Output};

pub fn cmd_budget_set(
    db: &Database,
    owner: OwnerId,
    limit: f64,
    period: Option<&str>,
) -> Result<()> {
    let period = period_or_current(period)?;
    let budget = db.upsert_budget(owner, period, limit)?;
    println!("✅ Budget for {} set to {:.2}", budget.period, budget.limit_amount);
    Ok(())
}

pub fn cmd_budget_list(db: &Database, owner: OwnerId, out: Output) -> Result<()> {
    let budgets = db.list_budgets(owner)?;
    if out.emit_json(&budgets)? {
        return Ok(());
    }

    if budgets.is_empty() {
        println!("No budgets set. Add one with:");
        println!("  finpulse --owner {} budget set 2000", owner);
        return Ok(());
    }

    println!();
    println!("💼 Budgets");
    println!("   ─────────────────────────");
    println!("   {:8} │ {:>12}", "Period", "Limit");
    println!("   ─────────┼─────────────");
    for budget in budgets {
        println!("   {:8} │ {:>12.2}", budget.period, budget.limit_amount);
    }

    Ok(())
}

pub fn cmd_budget_status(
    db: &Database,
    owner: OwnerId,
    period: Option<&str>,
    out: Output,
) -> Result<()> {
    let period = period_or_current(period)?;
    let status = LedgerAggregator::new(db).budget_status(owner, period)?;
    if out.emit_json(&status)? {
        return Ok(());
    }

    println!();
    println!("💼 Budget Status ({})", status.period);
    println!("   ─────────────────────────────────────────────");

    if status.limit <= 0.0 {
        println!("   No budget set for {}.", period);
        println!("   Set one with: finpulse --owner {} budget set <LIMIT> --period {}", owner, period);
        return Ok(());
    }

    let pct = status.spent / status.limit * 100.0;
    println!("   Limit:     {:>12.2}", status.limit);
    println!("   Spent:     {:>12.2} ({:.1}%)", status.spent, pct);
    println!("   Remaining: {:>12.2}", status.limit - status.spent);
    if status.exceeded {
        println!();
        println!("   🚨 Budget exceeded");
    }

    Ok(())
}

pub fn cmd_budget_delete(db: &Database, owner: OwnerId, period: &str) -> Result<()> {
    let period: Period = period
        .parse()
        .with_context(|| format!("Invalid period '{}'", period))?;
    db.delete_budget(owner, period)
        .with_context(|| format!("Failed to delete budget for {}", period))?;
    println!("🗑️  Deleted budget for {}", period);
    Ok(())
}
