//! App Context

use std::sync::Arc;

use storefront::policy::PricingPolicy;
use thiserror::Error;

use crate::{
    database::{self, Db},
    domain::{
        catalog::PgCatalogStore,
        checkout::{CheckoutService, StoreCheckoutService},
        orders::PgOrderStore,
        payouts::{PayoutsService, PgSalesStore, StorePayoutsService},
        promotions::PgPromoStore,
    },
};

/// Errors raised while building the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The database could not be reached.
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Services wired to a single connection pool.
#[derive(Clone)]
pub struct AppContext {
    /// Checkout operations
    pub checkout: Arc<dyn CheckoutService>,

    /// Payout reporting
    pub payouts: Arc<dyn PayoutsService>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        policy: PricingPolicy,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_db(&Db::new(pool), policy))
    }

    /// Build application context over an existing pool.
    #[must_use]
    pub fn from_db(db: &Db, policy: PricingPolicy) -> Self {
        let checkout = StoreCheckoutService::new(
            Arc::new(PgCatalogStore::new(db.clone())),
            Arc::new(PgPromoStore::new(db.clone())),
            Arc::new(PgOrderStore::new(db.clone())),
            Arc::new(policy),
        );

        let payouts = StorePayoutsService::new(Arc::new(PgSalesStore::new(db.clone())));

        Self {
            checkout: Arc::new(checkout),
            payouts: Arc::new(payouts),
        }
    }
}
