use clap::Args;
use jiff::civil::Date;
use roster_app::domain::{
    availability::{AvailabilityService, PgAvailabilityService},
    instructors::records::InstructorUuid,
    tenants::{PgTenantsService, TenantsService},
};

#[derive(Debug, Args)]
pub(crate) struct ListSlotsArgs {
    /// Tenant slug
    #[arg(long)]
    tenant: String,

    /// Instructor UUID
    #[arg(long)]
    instructor_uuid: InstructorUuid,

    /// Local date, e.g. 2024-06-10
    #[arg(long)]
    date: Date,

    /// Lesson length in minutes
    #[arg(long, default_value_t = 60)]
    duration: i64,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ListSlotsArgs) -> Result<(), String> {
    let db = crate::cli::connect(&args.database_url).await?;

    let tenant = PgTenantsService::new(db.clone())
        .resolve_tenant(&args.tenant)
        .await
        .map_err(|error| format!("failed to resolve tenant '{}': {error}", args.tenant))?;

    let slots = PgAvailabilityService::new(db)
        .list_slots(
            &tenant,
            args.instructor_uuid,
            args.date,
            args.duration,
        )
        .await
        .map_err(|error| format!("failed to list slots: {error}"))?;

    let tz = &tenant.settings.timezone;

    for slot in slots {
        let start = slot.start.to_zoned(tz.clone());
        let end = slot.end.to_zoned(tz.clone());
        let state = if slot.available { "available" } else { "booked" };

        println!("{} - {}  {state}", start.time(), end.time());
    }

    Ok(())
}
