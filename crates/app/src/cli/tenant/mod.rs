use clap::{Args, Subcommand};

mod config;
mod create;
mod status;

#[derive(Debug, Args)]
pub(crate) struct TenantCommand {
    #[command(subcommand)]
    command: TenantSubcommand,
}

#[derive(Debug, Subcommand)]
enum TenantSubcommand {
    Create(create::CreateTenantArgs),
    Status(status::SetStatusArgs),
    Config(config::ConfigCommand),
}

pub(crate) async fn run(command: TenantCommand) -> Result<(), String> {
    match command.command {
        TenantSubcommand::Create(args) => create::run(args).await,
        TenantSubcommand::Status(args) => status::run(args).await,
        TenantSubcommand::Config(command) => config::run(command).await,
    }
}
