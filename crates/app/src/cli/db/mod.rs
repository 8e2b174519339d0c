use clap::{Args, Subcommand};

mod check_rls;
mod ensure_app_role;

#[derive(Debug, Args)]
pub(crate) struct DbCommand {
    #[command(subcommand)]
    command: DbSubcommand,
}

#[derive(Debug, Subcommand)]
enum DbSubcommand {
    /// Create or update the runtime role with RLS-safe flags and grants
    EnsureAppRole(ensure_app_role::EnsureAppRoleArgs),

    /// Verify a connection string is subject to row-level security
    CheckRls(check_rls::CheckRlsArgs),
}

pub(crate) async fn run(command: DbCommand) -> Result<(), String> {
    match command.command {
        DbSubcommand::EnsureAppRole(args) => ensure_app_role::run(args).await,
        DbSubcommand::CheckRls(args) => check_rls::run(args).await,
    }
}
