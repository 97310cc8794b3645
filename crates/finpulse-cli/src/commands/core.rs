//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Shared utility to load the TOML config
//! - `require_owner` - Resolve `--owner` to an existing owner
//! - Date, period and timestamp parsing for arguments
//! - `cmd_init` - Initialize the database
//! - `cmd_owners_*` - Owner management

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use finpulse_core::models::{DateRange, OwnerId, Period};
use finpulse_core::{Database, FinpulseConfig};

use super::Output;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FinpulseConfig> {
    FinpulseConfig::load(path).context("Failed to load config")
}

/// Resolve `--owner`, failing when it is missing or unknown
pub fn require_owner(db: &Database, owner: Option<OwnerId>) -> Result<OwnerId> {
    let id = owner.context("No owner selected. Pass --owner <ID> (see `finpulse owners`)")?;
    db.require_owner(id)
        .with_context(|| format!("Owner {} does not exist", id))?;
    Ok(id)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", s))
}

/// Parse an optional date, defaulting to today
pub fn date_or_today(s: Option<&str>) -> Result<NaiveDate> {
    match s {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}

/// Parse an optional `YYYY-MM`, defaulting to the current month
pub fn period_or_current(s: Option<&str>) -> Result<Period> {
    match s {
        Some(s) => s
            .parse::<Period>()
            .with_context(|| format!("Invalid period '{}'", s)),
        None => Ok(Period::containing(Local::now().date_naive())),
    }
}

pub fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<Option<DateRange>> {
    match (from, to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) => {
            let range = DateRange::new(parse_date(from)?, parse_date(to)?)?;
            Ok(Some(range))
        }
        _ => anyhow::bail!("--from and --to must be given together"),
    }
}

/// Parse `YYYY-MM-DD HH:MM` (or with seconds) as UTC
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map(|dt| dt.and_utc())
        .with_context(|| format!("Invalid time '{}' (expected YYYY-MM-DD HH:MM)", s))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create an owner: finpulse owners add \"Your Name\" you@example.com");
    println!("  2. Import transactions: finpulse --owner 1 import --file ledger.csv");
    println!("  3. Check your score: finpulse --owner 1 health");

    Ok(())
}

pub fn cmd_owners_add(db: &Database, name: &str, email: &str) -> Result<()> {
    let id = db.upsert_owner(name, email)?;
    println!("✅ Owner {} ({})", id, email);
    Ok(())
}

pub fn cmd_owners_list(db: &Database, out: Output) -> Result<()> {
    let owners = db.list_owners()?;
    if out.emit_json(&owners)? {
        return Ok(());
    }

    if owners.is_empty() {
        println!("No owners yet. Add one with:");
        println!("  finpulse owners add \"Your Name\" you@example.com");
        return Ok(());
    }

    println!();
    println!("👤 Owners");
    println!("   ─────────────────────────────────────────────");
    for owner in owners {
        println!("   [{}] {} <{}>", owner.id, owner.name, owner.email);
    }

    Ok(())
}
