//! Transaction command implementations

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use finpulse_core::models::{NewTransaction, OwnerId, TransactionKind};
use finpulse_core::{CheckOutcome, Database, FinpulseConfig, TransactionInsertResult};

use super::{
    date_or_today, parse_date, parse_range, period_or_current, run_owner_checks, truncate, Output,
};

fn build_transaction(
    kind: &str,
    category: &str,
    amount: f64,
    date: chrono::NaiveDate,
    description: Option<&str>,
) -> Result<NewTransaction> {
    let kind: TransactionKind = kind
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
        .context("Type must be INCOME or EXPENSE")?;
    let mut tx = NewTransaction::new(kind, category, amount, date);
    tx.description = description.map(|d| d.to_string());
    Ok(tx)
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_tx_add(
    db: &Database,
    config: &FinpulseConfig,
    owner: OwnerId,
    kind: &str,
    category: &str,
    amount: f64,
    date: Option<&str>,
    description: Option<&str>,
) -> Result<()> {
    let tx = build_transaction(kind, category, amount, date_or_today(date)?, description)?;
    let id = match db.insert_transaction(owner, &tx)? {
        TransactionInsertResult::Inserted(id) | TransactionInsertResult::Duplicate(id) => id,
    };
    println!("✅ Recorded {} {:.2} ({}) as #{}", tx.kind, tx.amount, tx.category, id);

    if tx.kind == TransactionKind::Expense && config.alerts.check_on_insert {
        let report = run_owner_checks(db, config, owner, Local::now().date_naive(), Utc::now())?;
        for check in [&report.monthly, &report.daily] {
            if let CheckOutcome::Alerted { alert, .. } = check {
                if check.delivered() {
                    println!("   🔔 [{}] {}", alert.severity, alert.message);
                }
            }
        }
    }

    Ok(())
}

pub fn cmd_tx_list(
    db: &Database,
    owner: OwnerId,
    period: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    out: Output,
) -> Result<()> {
    let range = match period {
        Some(p) => Some(period_or_current(Some(p))?.range()),
        None => parse_range(from, to)?,
    };
    let transactions = db.list_transactions(owner, range)?;
    if out.emit_json(&transactions)? {
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions found. Add one with:");
        println!("  finpulse --owner {} tx add EXPENSE Food 12.50", owner);
        return Ok(());
    }

    println!();
    println!("📝 Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = match tx.kind {
            TransactionKind::Expense => format!("\x1b[31m-{:.2}\x1b[0m", tx.amount), // Red for expenses
            TransactionKind::Income => format!("\x1b[32m+{:.2}\x1b[0m", tx.amount), // Green for income
        };

        println!(
            "   [{}] {} │ {:>12} │ {:<12} │ {}",
            tx.id,
            tx.date,
            amount_str,
            truncate(&tx.category, 12),
            truncate(tx.description.as_deref().unwrap_or(""), 30)
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_tx_update(
    db: &Database,
    owner: OwnerId,
    id: i64,
    kind: &str,
    category: &str,
    amount: f64,
    date: &str,
    description: Option<&str>,
) -> Result<()> {
    let tx = build_transaction(kind, category, amount, parse_date(date)?, description)?;
    let updated = db
        .update_transaction(owner, id, &tx)
        .with_context(|| format!("Failed to update transaction {}", id))?;
    println!(
        "✅ Updated #{}: {} {} {:.2} ({})",
        updated.id, updated.date, updated.kind, updated.amount, updated.category
    );
    Ok(())
}

pub fn cmd_tx_delete(db: &Database, owner: OwnerId, id: i64) -> Result<()> {
    db.delete_transaction(owner, id)
        .with_context(|| format!("Failed to delete transaction {}", id))?;
    println!("🗑️  Deleted transaction #{}", id);
    Ok(())
}
