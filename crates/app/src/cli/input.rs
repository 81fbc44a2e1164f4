use std::path::Path;

use serde::de::DeserializeOwned;
use storefront::policy::PricingPolicy;
use storefront_app::{
    config::{DatabaseConfig, PricingConfig},
    context::AppContext,
};
use tokio::io::AsyncReadExt;

/// Reads a JSON document from a file, or from stdin when the path is `-`.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let contents = if path == Path::new("-") {
        let mut contents = String::new();
        tokio::io::stdin()
            .read_to_string(&mut contents)
            .await
            .map_err(|error| format!("failed to read stdin: {error}"))?;

        contents
    } else {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|error| format!("failed to read {}: {error}", path.display()))?
    };

    serde_json::from_str(&contents)
        .map_err(|error| format!("invalid JSON in {}: {error}", path.display()))
}

/// Loads the configured pricing policy.
pub(crate) fn load_policy(pricing: &PricingConfig) -> Result<PricingPolicy, String> {
    pricing.load().map_err(|error| {
        format!(
            "failed to load pricing policy {}: {error}",
            pricing.pricing_policy.display()
        )
    })
}

/// Connects the services.
pub(crate) async fn connect(
    database: &DatabaseConfig,
    policy: PricingPolicy,
) -> Result<AppContext, String> {
    AppContext::from_database_url(&database.database_url, policy)
        .await
        .map_err(|error| format!("{error}"))
}
