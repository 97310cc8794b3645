//! Long-running scheduler
//!
//! Two background tasks share the database:
//! - Reminder sweep every `reminder_sweep_minutes`
//! - Threshold check for every owner once a day, at or after `daily_check_hour` local time
//!
//! Runs until Ctrl-C.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Timelike, Utc};
use finpulse_core::{Database, FinpulseConfig};
use tokio::time::interval;
use tracing::{error, info};

use super::{run_checks_for_owners, run_reminder_sweep};

/// How often the daily-check task looks at the clock
const DAILY_CHECK_POLL: Duration = Duration::from_secs(60);

/// Whether the daily check should run now
pub fn daily_check_due(
    today: NaiveDate,
    hour: u32,
    check_hour: u32,
    last_run: Option<NaiveDate>,
) -> bool {
    hour >= check_hour && last_run.map_or(true, |last| last < today)
}

fn start_reminder_sweeper(db: Database, config: FinpulseConfig) -> Result<()> {
    let period = config
        .schedule
        .reminder_sweep_interval
        .to_std()
        .context("Reminder sweep interval out of range")?;

    info!("Starting reminder sweep: every {}s", period.as_secs());

    tokio::spawn(async move {
        let mut ticker = interval(period);

        // Skip the first immediate tick
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let db = db.clone();
            let config = config.clone();
            match tokio::task::spawn_blocking(move || run_reminder_sweep(&db, &config)).await {
                Ok(Ok(report)) if report.fired > 0 => {
                    info!(fired = report.fired, "Reminder sweep completed");
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) => error!("Reminder sweep failed: {:#}", e),
                Err(e) => error!("Reminder sweep task panicked: {}", e),
            }
        }
    });

    Ok(())
}

fn start_daily_checker(db: Database, config: FinpulseConfig) {
    info!(
        "Starting daily threshold check at {:02}:00 local time",
        config.schedule.daily_check_hour
    );

    tokio::spawn(async move {
        let mut ticker = interval(DAILY_CHECK_POLL);
        let mut last_run: Option<NaiveDate> = None;

        loop {
            ticker.tick().await;

            let local = Local::now();
            let today = local.date_naive();
            if !daily_check_due(
                today,
                local.hour(),
                config.schedule.daily_check_hour,
                last_run,
            ) {
                continue;
            }
            last_run = Some(today);

            info!(%today, "Running daily threshold check...");

            let db = db.clone();
            let config = config.clone();
            let result = tokio::task::spawn_blocking(move || -> Result<usize> {
                let owners: Vec<_> = db.list_owners()?.into_iter().map(|o| o.id).collect();
                let reports = run_checks_for_owners(&db, &config, &owners, today, Utc::now());
                Ok(reports
                    .iter()
                    .map(|r| usize::from(r.monthly.delivered()) + usize::from(r.daily.delivered()))
                    .sum())
            })
            .await;

            match result {
                Ok(Ok(delivered)) => info!(delivered, "Daily threshold check completed"),
                Ok(Err(e)) => error!("Daily threshold check failed: {:#}", e),
                Err(e) => error!("Daily threshold check task panicked: {}", e),
            }
        }
    });
}

pub async fn cmd_watch(db: Database, config: FinpulseConfig) -> Result<()> {
    println!("👀 Watching {} (Ctrl-C to stop)", db.path());

    start_reminder_sweeper(db.clone(), config.clone())?;
    start_daily_checker(db, config);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutting down scheduler");
    Ok(())
}
