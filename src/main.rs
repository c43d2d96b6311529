use clap::Parser;
use color_eyre::Result;
use mockable::DefaultClock;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dayplan::config::ConfigOrigin;
use dayplan::{Config, Database, Profile, SqliteAlarms, TransactionKind, cli::{self, Cli, Commands}};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev {
        Profile::Dev
    } else {
        Profile::Prod
    };

    let (config, origin) = match &cli.config {
        Some(path) => Config::load_or_init(&dayplan::utils::expand_path(path))?,
        None => Config::load_with_profile(profile)?,
    };

    // RUST_LOG wins over the configured filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let ConfigOrigin::WroteDefaults(path) = &origin {
        tracing::info!(path = %path.display(), "wrote default config");
    }

    let db_path: PathBuf = config.get_database_path();
    let db = Database::new(
        db_path.to_str()
            .ok_or_else(|| color_eyre::eyre::eyre!("Database path contains invalid UTF-8"))?
    )?;

    let clock = Arc::new(DefaultClock);
    let scheduler = cli::build_scheduler(&db, &config, clock.clone());

    match cli.command {
        Commands::AddTask { title, date, start, end, description, alarm, task_type } => {
            cli::handle_add_task(title, date, start, end, description, alarm, task_type, &config, &scheduler)?;
        }
        Commands::EditTask { id, title, description, date, start, end, alarm, task_type } => {
            cli::handle_edit_task(id, title, description, date, start, end, alarm, task_type, &scheduler)?;
        }
        Commands::ToggleTask { id } => {
            cli::handle_toggle_task(id, &scheduler)?;
        }
        Commands::DeleteTask { id } => {
            cli::handle_delete_task(id, &scheduler)?;
        }
        Commands::Tasks { date, json } => {
            cli::handle_list_tasks(date, json, &scheduler)?;
        }
        Commands::Calendar { month } => {
            cli::handle_calendar(month, &db)?;
        }
        Commands::Alarms { fire } => {
            cli::handle_alarms(fire, &SqliteAlarms::new(&db, clock))?;
        }
        Commands::AddNote { content, title } => {
            cli::handle_add_note(content, title, &db)?;
        }
        Commands::Notes { json } => {
            cli::handle_list_notes(json, &db)?;
        }
        Commands::DeleteNote { id } => {
            cli::handle_delete_note(id, &db)?;
        }
        Commands::AddExpense { amount, category, description } => {
            cli::handle_add_transaction(TransactionKind::Expense, amount, category, description, &db)?;
        }
        Commands::AddIncome { amount, category, description } => {
            cli::handle_add_transaction(TransactionKind::Income, amount, category, description, &db)?;
        }
        Commands::Finance { json } => {
            cli::handle_finance(json, &db)?;
        }
    }

    Ok(())
}
