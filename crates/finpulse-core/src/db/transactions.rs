//! Transaction operations

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{DateRange, NewTransaction, OwnerId, Transaction, TransactionKind};

/// Result of inserting a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionInsertResult {
    /// Transaction was inserted successfully, contains new transaction ID
    Inserted(i64),
    /// Transaction was a duplicate import, contains existing transaction ID
    Duplicate(i64),
}

impl TransactionInsertResult {
    pub fn id(&self) -> i64 {
        match self {
            Self::Inserted(id) | Self::Duplicate(id) => *id,
        }
    }
}

const TRANSACTION_COLUMNS: &str =
    "id, owner_id, kind, category, amount, description, date, import_hash, created_at";

pub(crate) fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let kind_str: String = row.get(2)?;
    let date_str: String = row.get(6)?;
    let created_at_str: String = row.get(8)?;

    let kind = kind_str
        .parse::<TransactionKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    Ok(Transaction {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        kind,
        category: row.get(3)?,
        amount: row.get(4)?,
        description: row.get(5)?,
        date,
        import_hash: row.get(7)?,
        created_at: parse_datetime(&created_at_str),
    })
}

impl Database {
    /// Insert a transaction for an owner
    ///
    /// Imported rows carry an `import_hash`; a second insert with the same hash
    /// returns the existing id instead of creating a duplicate.
    pub fn insert_transaction(
        &self,
        owner_id: OwnerId,
        tx: &NewTransaction,
    ) -> Result<TransactionInsertResult> {
        tx.validate()?;
        let conn = self.conn()?;

        if let Some(ref hash) = tx.import_hash {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM transactions WHERE import_hash = ?",
                    params![hash],
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                return Ok(TransactionInsertResult::Duplicate(existing_id));
            }
        }

        conn.execute(
            r#"
            INSERT INTO transactions (owner_id, kind, category, amount, description, date, import_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                owner_id,
                tx.kind.as_str(),
                tx.category.trim(),
                tx.amount,
                tx.description,
                tx.date.to_string(),
                tx.import_hash,
            ],
        )?;

        Ok(TransactionInsertResult::Inserted(conn.last_insert_rowid()))
    }

    /// Get one of an owner's transactions
    pub fn get_transaction(&self, owner_id: OwnerId, id: i64) -> Result<Transaction> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM transactions WHERE id = ? AND owner_id = ?",
                TRANSACTION_COLUMNS
            ),
            params![id, owner_id],
            row_to_transaction,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Transaction {}", id)))
    }

    /// Replace the fields of an existing transaction
    pub fn update_transaction(
        &self,
        owner_id: OwnerId,
        id: i64,
        tx: &NewTransaction,
    ) -> Result<Transaction> {
        tx.validate()?;
        let conn = self.conn()?;

        let updated = conn.execute(
            r#"
            UPDATE transactions
            SET kind = ?, category = ?, amount = ?, description = ?, date = ?
            WHERE id = ? AND owner_id = ?
            "#,
            params![
                tx.kind.as_str(),
                tx.category.trim(),
                tx.amount,
                tx.description,
                tx.date.to_string(),
                id,
                owner_id,
            ],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }

        self.get_transaction(owner_id, id)
    }

    /// Delete one of an owner's transactions
    pub fn delete_transaction(&self, owner_id: OwnerId, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM transactions WHERE id = ? AND owner_id = ?",
            params![id, owner_id],
        )?;

        if deleted == 0 {
            return Err(Error::NotFound(format!("Transaction {}", id)));
        }
        Ok(())
    }

    /// List an owner's transactions, newest first, optionally within a range
    pub fn list_transactions(
        &self,
        owner_id: OwnerId,
        range: Option<DateRange>,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let transactions = match range {
            Some(range) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM transactions WHERE owner_id = ? AND date BETWEEN ? AND ? ORDER BY date DESC, id DESC",
                    TRANSACTION_COLUMNS
                ))?;
                let rows = stmt.query_map(
                    params![owner_id, range.start.to_string(), range.end.to_string()],
                    row_to_transaction,
                )?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM transactions WHERE owner_id = ? ORDER BY date DESC, id DESC",
                    TRANSACTION_COLUMNS
                ))?;
                let rows = stmt.query_map(params![owner_id], row_to_transaction)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        Ok(transactions)
    }

    /// Count an owner's transactions
    pub fn count_transactions(&self, owner_id: OwnerId) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE owner_id = ?",
            params![owner_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
