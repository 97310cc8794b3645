//! Analytics command implementations (health, forecast, pattern, projection, report)

use anyhow::Result;
use chrono::Local;
use finpulse_core::export::monthly_report;
use finpulse_core::models::OwnerId;
use finpulse_core::{Database, ForecastEngine, HealthScoreEngine, HealthStatus, LedgerAggregator};

use super::{period_or_current, Output};

pub fn cmd_health(db: &Database, owner: OwnerId, period: Option<&str>, out: Output) -> Result<()> {
    let period = period_or_current(period)?;
    let health = HealthScoreEngine::new(db).calculate(owner, period)?;
    if out.emit_json(&health)? {
        return Ok(());
    }

    let icon = match health.status {
        HealthStatus::Excellent => "🟢",
        HealthStatus::Good => "🔵",
        HealthStatus::Fair => "🟡",
        HealthStatus::Poor => "🔴",
    };

    println!();
    println!("🩺 Financial Health ({})", period);
    println!("   ─────────────────────────────────────────────");
    println!("   Score: {} {}/100 ({})", icon, health.score, health.status);
    println!();
    println!("   Savings rate:       {:>6.2}%", health.savings_rate);
    println!("   Budget discipline:  {:>6.2}%", health.budget_discipline);
    println!("   Expense stability:  {:>6.2}%", health.expense_stability);

    if !health.recommendations.is_empty() {
        println!();
        println!("   💡 Recommendations:");
        for rec in &health.recommendations {
            println!("      • {}", rec);
        }
    }

    Ok(())
}

pub fn cmd_forecast(
    db: &Database,
    owner: OwnerId,
    period: Option<&str>,
    out: Output,
) -> Result<()> {
    let period = period_or_current(period)?;
    let forecast = ForecastEngine::new(db).predict_next_month(owner, period)?;
    if out.emit_json(&forecast)? {
        return Ok(());
    }

    println!();
    println!("🔮 Expense Forecast for {}", period.plus_months(1));
    println!("   ─────────────────────────────────────────────");
    println!("   Predicted:  {:.2}", forecast.predicted_amount);
    println!("   Confidence: {}", forecast.confidence.as_str());
    println!(
        "   Based on {} to {}",
        period.minus_months(3),
        period.minus_months(1)
    );

    Ok(())
}

pub fn cmd_pattern(db: &Database, owner: OwnerId, out: Output) -> Result<()> {
    let pattern = LedgerAggregator::new(db).spending_pattern(owner)?;
    if out.emit_json(&pattern)? {
        return Ok(());
    }

    println!();
    println!("📊 Spending Pattern");
    println!("   ─────────────────────────────────────────────");

    if pattern.category_spending.is_empty() {
        println!("   No expenses recorded.");
        return Ok(());
    }

    let total: f64 = pattern.category_spending.values().sum();
    let mut categories: Vec<_> = pattern.category_spending.iter().collect();
    categories.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!("   {:20} │ {:>12} │ {:>6}", "Category", "Amount", "%");
    println!("   ─────────────────────┼──────────────┼───────");
    for (category, amount) in categories {
        println!(
            "   {:20} │ {:>12.2} │ {:>5.1}%",
            super::truncate(category, 20),
            amount,
            amount / total * 100.0
        );
    }
    println!();
    println!("   Top category:    {}", pattern.top_category);
    println!("   Average expense: {:.2}", pattern.average_expense);
    println!("   Transactions:    {}", pattern.total_transactions);

    Ok(())
}

pub fn cmd_projection(db: &Database, owner: OwnerId, out: Output) -> Result<()> {
    let today = Local::now().date_naive();
    let projection = LedgerAggregator::new(db).recent_projection(owner, today)?;
    if out.emit_json(&projection)? {
        return Ok(());
    }

    println!();
    println!("📈 Spending Projection");
    println!("   ─────────────────────────────────────────────");
    println!("   Average expense:       {:.2}", projection.average_expense);
    println!(
        "   Projected monthly:     {:.2} (last {} days)",
        projection.projected_monthly_expense, projection.based_on_days
    );

    Ok(())
}

pub fn cmd_report(db: &Database, owner: OwnerId, period: Option<&str>, out: Output) -> Result<()> {
    let period = period_or_current(period)?;
    if out.json {
        let summary = LedgerAggregator::new(db).monthly_summary(owner, period)?;
        out.emit_json(&summary)?;
        return Ok(());
    }

    println!("{}", monthly_report(db, owner, period)?);
    Ok(())
}
