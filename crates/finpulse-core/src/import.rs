//! CSV import in the export layout
//!
//! Each row gets an `import_hash` derived from the owner, the row's fields and
//! how many identical rows came before it in the same file. Importing the same
//! file twice therefore inserts nothing the second time, while two genuinely
//! identical purchases in one file are both kept.

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::db::{Database, TransactionInsertResult};
use crate::error::{Error, Result};
use crate::export::CSV_HEADER;
use crate::models::{NewTransaction, OwnerId, TransactionKind};

/// Counts from one import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
}

fn generate_hash(owner_id: OwnerId, tx: &NewTransaction, occurrence: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(owner_id.to_be_bytes());
    hasher.update(tx.date.to_string().as_bytes());
    hasher.update(tx.kind.as_str().as_bytes());
    hasher.update(tx.category.as_bytes());
    hasher.update(tx.amount.to_be_bytes());
    hasher.update(tx.description.as_deref().unwrap_or("").as_bytes());
    hasher.update(occurrence.to_be_bytes());
    hex::encode(hasher.finalize())
}

fn parse_amount(s: &str, line: usize) -> Result<f64> {
    let cleaned = s.trim().replace(',', "");
    let amount: f64 = cleaned
        .parse()
        .map_err(|_| Error::Import(format!("Line {}: invalid amount '{}'", line, s)))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::Import(format!(
            "Line {}: amount must be positive, got '{}'",
            line, s
        )));
    }
    Ok(amount)
}

/// Parse CSV rows for `owner_id`, attaching import hashes
pub fn parse_transactions_csv<R: Read>(reader: R, owner_id: OwnerId) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let matches_layout = headers.len() >= 4
        && headers
            .iter()
            .zip(CSV_HEADER)
            .all(|(got, want)| got.eq_ignore_ascii_case(want));
    if !matches_layout {
        return Err(Error::Import(format!(
            "Unexpected header '{}' (expected '{}')",
            headers.iter().collect::<Vec<_>>().join(","),
            CSV_HEADER.join(",")
        )));
    }

    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut transactions = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        // Line 1 is the header
        let line = idx + 2;

        let date_str = record
            .get(0)
            .ok_or_else(|| Error::Import(format!("Line {}: missing date", line)))?;
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .map_err(|_| Error::Import(format!("Line {}: invalid date '{}'", line, date_str)))?;

        let kind = record
            .get(1)
            .ok_or_else(|| Error::Import(format!("Line {}: missing type", line)))?
            .parse::<TransactionKind>()
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        let category = record
            .get(2)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Import(format!("Line {}: missing category", line)))?;

        let amount_str = record
            .get(3)
            .ok_or_else(|| Error::Import(format!("Line {}: missing amount", line)))?;
        let amount = parse_amount(amount_str, line)?;

        let mut tx = NewTransaction::new(kind, category, amount, date);
        tx.description = record
            .get(4)
            .map(|s| s.to_string())
            .filter(|s| !s.is_empty());

        let key = format!(
            "{}|{}|{}|{}|{}",
            tx.date,
            tx.kind,
            tx.category,
            tx.amount,
            tx.description.as_deref().unwrap_or("")
        );
        let occurrence = seen.entry(key).or_insert(0);
        tx.import_hash = Some(generate_hash(owner_id, &tx, *occurrence));
        *occurrence += 1;

        transactions.push(tx);
    }

    debug!("Parsed {} CSV transactions", transactions.len());
    Ok(transactions)
}

impl Database {
    /// Import a CSV file for an owner, skipping rows imported before
    pub fn import_transactions_csv<R: Read>(
        &self,
        owner_id: OwnerId,
        reader: R,
    ) -> Result<ImportResult> {
        self.require_owner(owner_id)?;
        let transactions = parse_transactions_csv(reader, owner_id)?;

        let mut result = ImportResult::default();
        for tx in &transactions {
            match self.insert_transaction(owner_id, tx)? {
                TransactionInsertResult::Inserted(_) => result.imported += 1,
                TransactionInsertResult::Duplicate(_) => result.skipped += 1,
            }
        }

        info!(
            owner_id,
            imported = result.imported,
            skipped = result.skipped,
            "CSV import finished"
        );
        Ok(result)
    }
}
