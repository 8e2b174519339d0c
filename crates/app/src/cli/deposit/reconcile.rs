use std::sync::Arc;

use clap::Args;
use jiff::Timestamp;
use roster::deposits::{DepositStatus, PaymentStatus, format_amount};
use roster_app::domain::{
    deposits::{DepositsService, PgDepositsService, records::DepositUuid},
    notifications::{Notifier, TracingSink},
    payments::ManualTransferGateway,
    tenants::{PgTenantsService, TenantsService},
};

/// Apply a status reported by a payment provider or bank statement to a deposit.
#[derive(Debug, Args)]
pub(crate) struct ReconcileArgs {
    /// Tenant slug
    #[arg(long)]
    tenant: String,

    /// Deposit UUID
    #[arg(long)]
    deposit_uuid: DepositUuid,

    /// Provider status code; anything other than confirmed or failed leaves the deposit pending
    #[arg(long)]
    provider_status: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ReconcileArgs) -> Result<(), String> {
    let status = DepositStatus::from(PaymentStatus::from_provider(&args.provider_status));

    if status == DepositStatus::Pending {
        println!("provider status '{}' is not final; nothing to do", args.provider_status);

        return Ok(());
    }

    let db = crate::cli::connect(&args.database_url).await?;

    let tenant = PgTenantsService::new(db.clone())
        .resolve_tenant(&args.tenant)
        .await
        .map_err(|error| format!("failed to resolve tenant '{}': {error}", args.tenant))?;

    let (notifier, delivery) = Notifier::spawn_with_handle(Arc::new(TracingSink));
    let service = PgDepositsService::new(db, notifier, Arc::new(ManualTransferGateway));

    let deposit = service
        .update_status(
            tenant.uuid(),
            args.deposit_uuid,
            status,
            Timestamp::now(),
        )
        .await
        .map_err(|error| format!("failed to reconcile deposit: {error}"))?;

    // Dropping the service closes the queue; wait for the event to go out before exiting.
    drop(service);
    delivery
        .await
        .map_err(|error| format!("notification delivery task failed: {error}"))?;

    println!("deposit_uuid: {}", deposit.uuid);
    println!("lesson_uuid: {}", deposit.lesson_uuid);
    println!(
        "amount: {}",
        format_amount(deposit.amount, tenant.settings.currency)
    );
    println!("status: {}", deposit.status);

    Ok(())
}
