use std::path::PathBuf;

use clap::Args;
use serde_json::Value;
use storefront_app::config::{DatabaseConfig, PricingConfig, TenantConfig};
use tracing::info;

use crate::cli::{input, output};

#[derive(Debug, Args)]
pub(crate) struct ReconcileArgs {
    /// Cart JSON file holding an array of items, or `-` for stdin
    #[arg(long)]
    cart: PathBuf,

    #[command(flatten)]
    tenant: TenantConfig,

    #[command(flatten)]
    pricing: PricingConfig,

    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: ReconcileArgs) -> Result<(), String> {
    let ReconcileArgs {
        cart,
        tenant,
        pricing,
        database,
    } = args;

    let cart: Vec<Value> = input::read_json(&cart).await?;
    let context = input::connect(&database, input::load_policy(&pricing)?).await?;

    let reconciliation = context
        .checkout
        .reconcile_cart(tenant.tenant(), cart)
        .await
        .map_err(|error| format!("failed to reconcile cart: {error}"))?;

    if !reconciliation.is_clean() {
        info!(
            changes = reconciliation.changes.len(),
            invalid = reconciliation.invalid.len(),
            "cart needs attention"
        );
    }

    output::print_json(&reconciliation)
}
