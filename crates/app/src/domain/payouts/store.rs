//! Sales store.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use storefront::{
    commissions::{ReportPeriod, SaleLine, VendorId},
    rates::Rate,
};

use crate::{
    database::Db,
    domain::{errors::StoreError, payouts::repository::PgSalesRepository, tenants::TenantUuid},
};

/// Reads settled sales and vendor commission settings.
#[automock]
#[async_trait]
pub trait SalesStore: Send + Sync {
    /// Order items of settled orders placed within the period.
    async fn sale_lines(
        &self,
        tenant: TenantUuid,
        period: ReportPeriod,
    ) -> Result<Vec<SaleLine>, StoreError>;

    /// Commission rates of every vendor that has one configured.
    async fn commission_rates(
        &self,
        tenant: TenantUuid,
    ) -> Result<FxHashMap<VendorId, Rate>, StoreError>;
}

/// `PostgreSQL` sales store.
#[derive(Debug, Clone)]
pub struct PgSalesStore {
    db: Db,
    repository: PgSalesRepository,
}

impl PgSalesStore {
    /// Creates a store over the pool.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgSalesRepository::new(),
        }
    }
}

#[async_trait]
impl SalesStore for PgSalesStore {
    async fn sale_lines(
        &self,
        tenant: TenantUuid,
        period: ReportPeriod,
    ) -> Result<Vec<SaleLine>, StoreError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let lines = self.repository.list_sale_lines(&mut tx, period).await?;

        tx.commit().await?;

        Ok(lines)
    }

    async fn commission_rates(
        &self,
        tenant: TenantUuid,
    ) -> Result<FxHashMap<VendorId, Rate>, StoreError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let rates = self.repository.list_commission_rates(&mut tx).await?;

        tx.commit().await?;

        Ok(rates)
    }
}
