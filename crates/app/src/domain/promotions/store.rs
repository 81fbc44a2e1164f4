//! Promo code store.

use async_trait::async_trait;
use mockall::automock;
use storefront::promotions::{PromoCode, normalize_code};

use crate::{
    database::Db,
    domain::{
        errors::StoreError, promotions::repository::PgPromoCodesRepository, tenants::TenantUuid,
    },
};

/// Reads promo codes.
#[automock]
#[async_trait]
pub trait PromoStore: Send + Sync {
    /// Finds a code, ignoring case and surrounding whitespace.
    async fn find_promo_code(
        &self,
        tenant: TenantUuid,
        code: String,
    ) -> Result<Option<PromoCode>, StoreError>;
}

/// `PostgreSQL` promo code store.
#[derive(Debug, Clone)]
pub struct PgPromoStore {
    db: Db,
    repository: PgPromoCodesRepository,
}

impl PgPromoStore {
    /// Creates a store over the pool.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgPromoCodesRepository::new(),
        }
    }
}

#[async_trait]
impl PromoStore for PgPromoStore {
    async fn find_promo_code(
        &self,
        tenant: TenantUuid,
        code: String,
    ) -> Result<Option<PromoCode>, StoreError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let promo = self
            .repository
            .find_promo_code(&mut tx, &normalize_code(&code))
            .await?;

        tx.commit().await?;

        Ok(promo)
    }
}
