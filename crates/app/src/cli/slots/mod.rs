use clap::{Args, Subcommand};

mod list;

#[derive(Debug, Args)]
pub(crate) struct SlotsCommand {
    #[command(subcommand)]
    command: SlotsSubcommand,
}

#[derive(Debug, Subcommand)]
enum SlotsSubcommand {
    List(list::ListSlotsArgs),
}

pub(crate) async fn run(command: SlotsCommand) -> Result<(), String> {
    match command.command {
        SlotsSubcommand::List(args) => list::run(args).await,
    }
}
