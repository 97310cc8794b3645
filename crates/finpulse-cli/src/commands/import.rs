//! CSV import and export command implementations

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use finpulse_core::export::export_transactions_csv;
use finpulse_core::models::OwnerId;
use finpulse_core::Database;

use super::parse_range;

pub fn cmd_import(db: &Database, owner: OwnerId, file: &Path) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let f = File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let result = db
        .import_transactions_csv(owner, BufReader::new(f))
        .with_context(|| format!("Failed to import {}", file.display()))?;

    println!();
    println!("✅ Import complete!");
    println!("   Imported: {}", result.imported);
    println!("   Skipped (duplicates): {}", result.skipped);

    Ok(())
}

pub fn cmd_export(
    db: &Database,
    owner: OwnerId,
    output: Option<&Path>,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<()> {
    let range = parse_range(from, to)?;

    match output {
        Some(path) => {
            let f = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let count = export_transactions_csv(db, owner, range, BufWriter::new(f))?;
            eprintln!("✅ Exported {} transactions to {}", count, path.display());
        }
        None => {
            let stdout = io::stdout();
            export_transactions_csv(db, owner, range, stdout.lock())?;
        }
    }

    Ok(())
}
