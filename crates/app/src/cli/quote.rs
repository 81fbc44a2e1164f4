use std::path::PathBuf;

use clap::Args;
use storefront::pricing::QuoteRequest;
use storefront_app::config::{DatabaseConfig, PricingConfig, TenantConfig};

use crate::cli::{input, output};

#[derive(Debug, Args)]
pub(crate) struct QuoteArgs {
    /// Quote request JSON file, or `-` for stdin
    #[arg(long)]
    request: PathBuf,

    #[command(flatten)]
    tenant: TenantConfig,

    #[command(flatten)]
    pricing: PricingConfig,

    #[command(flatten)]
    database: DatabaseConfig,
}

pub(crate) async fn run(args: QuoteArgs) -> Result<(), String> {
    let QuoteArgs {
        request,
        tenant,
        pricing,
        database,
    } = args;

    let request: QuoteRequest = input::read_json(&request).await?;
    let context = input::connect(&database, input::load_policy(&pricing)?).await?;

    let quote = context
        .checkout
        .quote(tenant.tenant(), request)
        .await
        .map_err(|error| format!("failed to price order: {error}"))?;

    output::print_json(&quote)
}
