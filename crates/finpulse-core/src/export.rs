//! Transaction CSV export and the monthly text report
//!
//! CSV layout: `Date,Type,Category,Amount,Description`, oldest row first,
//! amounts with two decimals. The same layout is read back by
//! [`crate::import`].

use std::io::Write;

use crate::analytics::{Ledger, LedgerAggregator};
use crate::error::Result;
use crate::models::{DateRange, OwnerId, Period};

/// Header shared by export and import
pub const CSV_HEADER: [&str; 5] = ["Date", "Type", "Category", "Amount", "Description"];

/// Write an owner's transactions as CSV, returning the number of rows
pub fn export_transactions_csv<L, W>(
    ledger: &L,
    owner_id: OwnerId,
    range: Option<DateRange>,
    writer: W,
) -> Result<usize>
where
    L: Ledger + ?Sized,
    W: Write,
{
    let mut transactions = ledger.transactions(owner_id, range)?;
    transactions.reverse();

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for t in &transactions {
        wtr.write_record([
            t.date.to_string(),
            t.kind.as_str().to_string(),
            t.category.clone(),
            format!("{:.2}", t.amount),
            t.description.clone().unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;

    Ok(transactions.len())
}

/// CSV export into a string
pub fn export_transactions_csv_string<L: Ledger + ?Sized>(
    ledger: &L,
    owner_id: OwnerId,
    range: Option<DateRange>,
) -> Result<String> {
    let mut buf = Vec::new();
    export_transactions_csv(ledger, owner_id, range, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Plain-text income, expense and balance for one month
pub fn monthly_report<L: Ledger + ?Sized>(
    ledger: &L,
    owner_id: OwnerId,
    period: Period,
) -> Result<String> {
    let summary = LedgerAggregator::new(ledger).monthly_summary(owner_id, period)?;
    Ok(format!(
        "Monthly Report for {}\nIncome: {:.2}\nExpense: {:.2}\nBalance: {:.2}",
        summary.period, summary.income, summary.expense, summary.balance
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::MemoryLedger;
    use crate::models::NewTransaction;
    use crate::models::TransactionKind::{Expense, Income};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_export_layout() {
        let mut ledger = MemoryLedger::new();
        ledger
            .add_transaction(
                1,
                NewTransaction::new(Expense, "Food", 12.5, date(2026, 10, 3))
                    .with_description("Lunch, with team"),
            )
            .unwrap();
        ledger
            .add_transaction(1, NewTransaction::new(Income, "Salary", 5000.0, date(2026, 10, 1)))
            .unwrap();

        let csv = export_transactions_csv_string(&ledger, 1, None).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Date,Type,Category,Amount,Description");
        assert_eq!(lines[1], "2026-10-01,INCOME,Salary,5000.00,");
        assert_eq!(lines[2], "2026-10-03,EXPENSE,Food,12.50,\"Lunch, with team\"");
    }

    #[test]
    fn test_export_empty_has_header_only() {
        let ledger = MemoryLedger::new();
        let csv = export_transactions_csv_string(&ledger, 1, None).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_monthly_report() {
        let ledger = MemoryLedger::new()
            .with_transaction(1, Income, "Salary", 3000.0, date(2026, 10, 1))
            .unwrap()
            .with_transaction(1, Expense, "Rent", 1200.0, date(2026, 10, 2))
            .unwrap()
            .with_transaction(1, Expense, "Rent", 1200.0, date(2026, 9, 2))
            .unwrap();

        let report = monthly_report(&ledger, 1, "2026-10".parse().unwrap()).unwrap();
        assert_eq!(
            report,
            "Monthly Report for 2026-10\nIncome: 3000.00\nExpense: 1200.00\nBalance: 1800.00"
        );
    }
}
