use clap::Args;
use roster_app::domain::tenants::{
    PgTenantsService, TenantsService,
    records::{TenantStatus, TenantUuid},
};

#[derive(Debug, Args)]
pub(crate) struct SetStatusArgs {
    /// Tenant UUID
    #[arg(long)]
    tenant_uuid: TenantUuid,

    /// New status: active, inactive or deleted
    #[arg(long)]
    status: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: SetStatusArgs) -> Result<(), String> {
    let status: TenantStatus = args.status.parse().map_err(|error| format!("{error}"))?;

    let db = crate::cli::connect(&args.database_url).await?;
    let service = PgTenantsService::new(db);

    let tenant = service
        .set_status(args.tenant_uuid, status)
        .await
        .map_err(|error| format!("failed to update tenant status: {error}"))?;

    println!("tenant_slug: {}", tenant.slug);
    println!("status: {}", tenant.status);

    Ok(())
}
