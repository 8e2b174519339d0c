use clap::Args;
use roster_app::database;

#[derive(Debug, Args)]
pub(crate) struct CheckRlsArgs {
    /// Connection string the services will use
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CheckRlsArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let enforced = database::is_rls_enforced(&pool)
        .await
        .map_err(|error| format!("failed to inspect role: {error}"))?;

    if !enforced {
        return Err("connected role bypasses row-level security; tenants would not be isolated".to_string());
    }

    println!("row-level security enforced for this role");

    Ok(())
}
