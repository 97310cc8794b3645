//! Storage-side aggregation backing the `Ledger` trait

use std::collections::BTreeMap;

use rusqlite::params;
use tracing::debug;

use super::Database;
use crate::analytics::Ledger;
use crate::error::Result;
use crate::models::{BudgetLimit, DateRange, OwnerId, Period, Transaction, TransactionKind};

impl Ledger for Database {
    fn sum(&self, owner_id: OwnerId, kind: TransactionKind, range: DateRange) -> Result<f64> {
        let conn = self.conn()?;
        let total: f64 = conn.query_row(
            r#"
            SELECT COALESCE(SUM(amount), 0.0)
            FROM transactions
            WHERE owner_id = ? AND kind = ? AND date BETWEEN ? AND ?
            "#,
            params![
                owner_id,
                kind.as_str(),
                range.start.to_string(),
                range.end.to_string()
            ],
            |row| row.get(0),
        )?;

        debug!(owner_id, kind = %kind, start = %range.start, end = %range.end, total, "Ledger sum");
        Ok(total)
    }

    fn sum_by_category(
        &self,
        owner_id: OwnerId,
        kind: TransactionKind,
        range: DateRange,
    ) -> Result<BTreeMap<String, f64>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category, SUM(amount)
            FROM transactions
            WHERE owner_id = ? AND kind = ? AND date BETWEEN ? AND ?
            GROUP BY category
            "#,
        )?;

        let totals = stmt
            .query_map(
                params![
                    owner_id,
                    kind.as_str(),
                    range.start.to_string(),
                    range.end.to_string()
                ],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
            )?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;

        Ok(totals)
    }

    fn transactions(
        &self,
        owner_id: OwnerId,
        range: Option<DateRange>,
    ) -> Result<Vec<Transaction>> {
        self.list_transactions(owner_id, range)
    }

    fn budget(&self, owner_id: OwnerId, period: Period) -> Result<Option<BudgetLimit>> {
        self.get_budget(owner_id, period)
    }
}
