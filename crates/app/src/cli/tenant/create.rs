use clap::Args;
use roster::limits::PlanLimits;
use roster_app::domain::tenants::{
    PgTenantsService, TenantsService, data::NewTenant, records::TenantUuid,
};

#[derive(Debug, Args)]
pub(crate) struct CreateTenantArgs {
    /// URL-safe business identifier
    #[arg(long)]
    slug: String,

    /// Business display name
    #[arg(long)]
    name: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Optional tenant UUID; generated when omitted
    #[arg(long)]
    tenant_uuid: Option<TenantUuid>,

    /// Cap on active instructors
    #[arg(long)]
    max_instructors: Option<u32>,

    /// Cap on registered students
    #[arg(long)]
    max_students: Option<u32>,

    /// Cap on lessons created per calendar month
    #[arg(long)]
    max_monthly_bookings: Option<u32>,
}

pub(crate) async fn run(args: CreateTenantArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database_url).await?;
    let service = PgTenantsService::new(db);

    let uuid = args.tenant_uuid.unwrap_or_default();

    let tenant = service
        .create_tenant(NewTenant {
            uuid,
            slug: args.slug,
            name: args.name,
            limits: PlanLimits {
                max_instructors: args.max_instructors,
                max_students: args.max_students,
                max_monthly_bookings: args.max_monthly_bookings,
            },
        })
        .await
        .map_err(|error| format!("failed to create tenant: {error}"))?;

    println!("tenant_uuid: {}", tenant.uuid);
    println!("tenant_slug: {}", tenant.slug);
    println!("tenant_name: {}", tenant.name);

    Ok(())
}
