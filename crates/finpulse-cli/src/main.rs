//! Finpulse CLI - Financial analytics for a local ledger
//!
//! Usage:
//!   finpulse init                          Initialize database
//!   finpulse owners add NAME EMAIL         Create an owner
//!   finpulse -o 1 tx add EXPENSE Food 12   Record a transaction
//!   finpulse -o 1 health                   Financial health score
//!   finpulse -o 1 forecast                 Next month's expense forecast
//!   finpulse watch                         Run scheduled checks and reminders

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let out = commands::Output { json: cli.json };

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Owners { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(OwnersAction::List) => commands::cmd_owners_list(&db, out),
                Some(OwnersAction::Add { name, email }) => {
                    commands::cmd_owners_add(&db, &name, &email)
                }
            }
        }
        Commands::Tx { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = commands::require_owner(&db, cli.owner)?;
            match action {
                TxAction::Add {
                    kind,
                    category,
                    amount,
                    date,
                    description,
                } => {
                    let config = commands::load_config(cli.config.as_deref())?;
                    commands::cmd_tx_add(
                        &db,
                        &config,
                        owner,
                        &kind,
                        &category,
                        amount,
                        date.as_deref(),
                        description.as_deref(),
                    )
                }
                TxAction::List { period, from, to } => commands::cmd_tx_list(
                    &db,
                    owner,
                    period.as_deref(),
                    from.as_deref(),
                    to.as_deref(),
                    out,
                ),
                TxAction::Update {
                    id,
                    kind,
                    category,
                    amount,
                    date,
                    description,
                } => commands::cmd_tx_update(
                    &db,
                    owner,
                    id,
                    &kind,
                    &category,
                    amount,
                    &date,
                    description.as_deref(),
                ),
                TxAction::Delete { id } => commands::cmd_tx_delete(&db, owner, id),
            }
        }
        Commands::Budget { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = commands::require_owner(&db, cli.owner)?;
            match action {
                BudgetAction::Set { limit, period } => {
                    commands::cmd_budget_set(&db, owner, limit, period.as_deref())
                }
                BudgetAction::List => commands::cmd_budget_list(&db, owner, out),
                BudgetAction::Status { period } => {
                    commands::cmd_budget_status(&db, owner, period.as_deref(), out)
                }
                BudgetAction::Delete { period } => {
                    commands::cmd_budget_delete(&db, owner, &period)
                }
            }
        }
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = commands::require_owner(&db, cli.owner)?;
            commands::cmd_import(&db, owner, &file)
        }
        Commands::Export { output, from, to } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = commands::require_owner(&db, cli.owner)?;
            commands::cmd_export(&db, owner, output.as_deref(), from.as_deref(), to.as_deref())
        }
        Commands::Report { period } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = commands::require_owner(&db, cli.owner)?;
            commands::cmd_report(&db, owner, period.as_deref(), out)
        }
        Commands::Health { period } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = commands::require_owner(&db, cli.owner)?;
            commands::cmd_health(&db, owner, period.as_deref(), out)
        }
        Commands::Forecast { period } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = commands::require_owner(&db, cli.owner)?;
            commands::cmd_forecast(&db, owner, period.as_deref(), out)
        }
        Commands::Pattern => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = commands::require_owner(&db, cli.owner)?;
            commands::cmd_pattern(&db, owner, out)
        }
        Commands::Projection => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = commands::require_owner(&db, cli.owner)?;
            commands::cmd_projection(&db, owner, out)
        }
        Commands::Check { date, all } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            let owners = if all {
                db.list_owners()?.into_iter().map(|o| o.id).collect()
            } else {
                vec![commands::require_owner(&db, cli.owner)?]
            };
            commands::cmd_check(&db, &config, &owners, date.as_deref(), out)
        }
        Commands::Notifications { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let owner = commands::require_owner(&db, cli.owner)?;
            match action {
                None => commands::cmd_notifications_list(&db, owner, false, out),
                Some(NotificationsAction::List { unread }) => {
                    commands::cmd_notifications_list(&db, owner, unread, out)
                }
                Some(NotificationsAction::Read { id }) => {
                    commands::cmd_notifications_read(&db, owner, id)
                }
                Some(NotificationsAction::ReadAll) => {
                    commands::cmd_notifications_read_all(&db, owner)
                }
            }
        }
        Commands::Reminders { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                Some(RemindersAction::Sweep) => {
                    let config = commands::load_config(cli.config.as_deref())?;
                    commands::cmd_reminders_sweep(&db, &config)
                }
                None | Some(RemindersAction::List) => {
                    let owner = commands::require_owner(&db, cli.owner)?;
                    commands::cmd_reminders_list(&db, owner, out)
                }
                Some(RemindersAction::Add { title, message, at }) => {
                    let owner = commands::require_owner(&db, cli.owner)?;
                    commands::cmd_reminders_add(&db, owner, &title, &message, &at)
                }
                Some(RemindersAction::Update {
                    id,
                    title,
                    message,
                    at,
                }) => {
                    let owner = commands::require_owner(&db, cli.owner)?;
                    commands::cmd_reminders_update(&db, owner, id, &title, &message, &at)
                }
                Some(RemindersAction::Delete { id }) => {
                    let owner = commands::require_owner(&db, cli.owner)?;
                    commands::cmd_reminders_delete(&db, owner, id)
                }
            }
        }
        Commands::Watch => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_watch(db, config).await
        }
    }
}
