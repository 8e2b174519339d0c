use clap::{Args, Subcommand};

mod reconcile;

#[derive(Debug, Args)]
pub(crate) struct DepositCommand {
    #[command(subcommand)]
    command: DepositSubcommand,
}

#[derive(Debug, Subcommand)]
enum DepositSubcommand {
    Reconcile(reconcile::ReconcileArgs),
}

pub(crate) async fn run(command: DepositCommand) -> Result<(), String> {
    match command.command {
        DepositSubcommand::Reconcile(args) => reconcile::run(args).await,
    }
}
