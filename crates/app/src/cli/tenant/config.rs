use clap::{Args, Subcommand};
use roster_app::domain::tenants::{PgTenantsService, TenantsService};

#[derive(Debug, Args)]
pub(crate) struct ConfigCommand {
    /// Tenant slug
    #[arg(long)]
    tenant: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
enum ConfigSubcommand {
    /// Print a configuration value
    Get {
        key: String,

        /// Printed when the key is unset
        #[arg(long, default_value = "")]
        default: String,
    },

    /// Store a configuration value
    Set { key: String, value: String },

    /// Print the effective typed settings
    Show,
}

pub(crate) async fn run(command: ConfigCommand) -> Result<(), String> {
    let db = crate::cli::connect(&command.database_url).await?;
    let service = PgTenantsService::new(db);

    let tenant = service
        .resolve_tenant(&command.tenant)
        .await
        .map_err(|error| format!("failed to resolve tenant '{}': {error}", command.tenant))?;

    match command.command {
        ConfigSubcommand::Get { key, default } => {
            let value = service
                .get_config(tenant.uuid(), &key, &default)
                .await
                .map_err(|error| format!("failed to read '{key}': {error}"))?;

            println!("{value}");
        }
        ConfigSubcommand::Set { key, value } => {
            service
                .set_config(tenant.uuid(), &key, &value)
                .await
                .map_err(|error| format!("failed to set '{key}': {error}"))?;

            println!("{key}: {value}");
        }
        ConfigSubcommand::Show => {
            let settings = &tenant.settings;

            println!(
                "business_hours: {}-{}",
                settings.business_hours.start,
                settings.business_hours.end
            );
            println!("cancellation_hours: {}", settings.cancellation_hours);
            println!("deposit_percentage: {}", settings.deposit_percentage);
            println!("currency: {}", settings.currency.iso_alpha_code);
            println!(
                "timezone: {}",
                settings.timezone.iana_name().unwrap_or("(fixed offset)")
            );
            println!("booking_buffer_minutes: {}", settings.booking_buffer_minutes);
            println!("online_payment_enabled: {}", settings.online_payment_enabled);
        }
    }

    Ok(())
}
