use clap::{Parser, Subcommand};
use roster_app::database::{self, Db};

mod db;
mod deposit;
mod slots;
mod tenant;

#[derive(Debug, Parser)]
#[command(name = "roster-app", about = "Roster CLI", long_about = None)]
pub(crate) struct Cli {
    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    pub(crate) log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Tenant(tenant::TenantCommand),
    Slots(slots::SlotsCommand),
    Deposit(deposit::DepositCommand),
    Db(db::DbCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Tenant(command) => tenant::run(command).await,
            Commands::Slots(command) => slots::run(command).await,
            Commands::Deposit(command) => deposit::run(command).await,
            Commands::Db(command) => db::run(command).await,
        }
    }
}

/// Connect for an administrative command.
pub(crate) async fn connect(database_url: &str) -> Result<Db, String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(Db::new(pool))
}
