//! Budget limit operations

use rusqlite::{params, OptionalExtension, Row};

use super::Database;
use crate::error::{Error, Result};
use crate::models::{BudgetLimit, OwnerId, Period};

fn row_to_budget(row: &Row<'_>) -> rusqlite::Result<BudgetLimit> {
    let period_str: String = row.get(2)?;
    let period = period_str.parse::<Period>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(BudgetLimit {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        period,
        limit_amount: row.get(3)?,
    })
}

impl Database {
    /// Set the monthly limit for an owner, replacing any existing one for the period
    pub fn upsert_budget(
        &self,
        owner_id: OwnerId,
        period: Period,
        limit_amount: f64,
    ) -> Result<BudgetLimit> {
        if !limit_amount.is_finite() || limit_amount <= 0.0 {
            return Err(Error::InvalidData(format!(
                "Budget limit must be positive, got {}",
                limit_amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO budgets (owner_id, period, limit_amount)
            VALUES (?, ?, ?)
            ON CONFLICT(owner_id, period) DO UPDATE SET limit_amount = excluded.limit_amount
            "#,
            params![owner_id, period.to_string(), limit_amount],
        )?;
        drop(conn);

        self.get_budget(owner_id, period)?
            .ok_or_else(|| Error::NotFound(format!("Budget {} for owner {}", period, owner_id)))
    }

    /// Get the limit for one period, if any
    pub fn get_budget(&self, owner_id: OwnerId, period: Period) -> Result<Option<BudgetLimit>> {
        let conn = self.conn()?;
        let budget = conn
            .query_row(
                "SELECT id, owner_id, period, limit_amount FROM budgets WHERE owner_id = ? AND period = ?",
                params![owner_id, period.to_string()],
                row_to_budget,
            )
            .optional()?;
        Ok(budget)
    }

    /// List all of an owner's budgets, most recent period first
    pub fn list_budgets(&self, owner_id: OwnerId) -> Result<Vec<BudgetLimit>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, period, limit_amount FROM budgets WHERE owner_id = ? ORDER BY period DESC",
        )?;

        let budgets = stmt
            .query_map(params![owner_id], row_to_budget)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }

    /// Remove the limit for one period
    pub fn delete_budget(&self, owner_id: OwnerId, period: Period) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM budgets WHERE owner_id = ? AND period = ?",
            params![owner_id, period.to_string()],
        )?;

        if deleted == 0 {
            return Err(Error::NotFound(format!(
                "Budget {} for owner {}",
                period, owner_id
            )));
        }
        Ok(())
    }
}
