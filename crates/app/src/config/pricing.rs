//! Pricing Policy Config

use std::path::PathBuf;

use clap::Args;
use storefront::policy::{PolicyError, PricingPolicy};

/// Pricing policy settings.
#[derive(Debug, Clone, Args)]
pub struct PricingConfig {
    /// Path to the pricing policy YAML file
    #[arg(long, env = "PRICING_POLICY", default_value = "pricing.yml")]
    pub pricing_policy: PathBuf,
}

impl PricingConfig {
    /// Reads and validates the policy file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid policy.
    pub fn load(&self) -> Result<PricingPolicy, PolicyError> {
        PricingPolicy::from_path(&self.pricing_policy)
    }
}
