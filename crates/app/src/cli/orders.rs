use clap::{Args, Subcommand};
use storefront::orders::{OrderId, PaymentStatus};
use storefront_app::{
    config::{DatabaseConfig, TenantConfig},
    database::{self, Db},
    domain::orders::{OrderStore, PgOrderStore},
};
use tracing::info;

#[derive(Debug, Args)]
pub(crate) struct OrdersCommand {
    #[command(subcommand)]
    command: OrdersSubcommand,
}

#[derive(Debug, Subcommand)]
enum OrdersSubcommand {
    /// Record a payment status reported by the payment provider
    Payment(PaymentArgs),
}

#[derive(Debug, Args)]
struct PaymentArgs {
    /// Order UUID
    #[arg(long)]
    order: OrderId,

    /// New payment status (pending, paid, completed, failed, refunded)
    #[arg(long)]
    status: PaymentStatus,

    #[command(flatten)]
    tenant: TenantConfig,

    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(command: OrdersCommand) -> Result<(), String> {
    match command.command {
        OrdersSubcommand::Payment(args) => record_payment(args).await,
    }
}

async fn record_payment(args: PaymentArgs) -> Result<(), String> {
    let PaymentArgs {
        order,
        status,
        tenant,
        database,
    } = args;

    let pool = database::connect(&database.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    PgOrderStore::new(Db::new(pool))
        .update_payment_status(tenant.tenant(), order, status)
        .await
        .map_err(|error| format!("failed to record payment: {error}"))?;

    info!(%order, %status, "payment recorded");

    Ok(())
}
