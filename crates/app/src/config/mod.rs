//! Configuration groups
//!
//! Each group is a `clap` argument set with environment fallbacks. Commands
//! flatten in only the groups they need.

mod db;
mod observability;
mod pricing;
mod tenant;

pub use db::DatabaseConfig;
pub use observability::{LogFormat, LoggingConfig};
pub use pricing::PricingConfig;
pub use tenant::TenantConfig;

/// Loads a `.env` file into the process environment, if one exists.
pub fn load_dotenv() {
    // A missing .env file is not an error
    _ = dotenvy::dotenv();
}
