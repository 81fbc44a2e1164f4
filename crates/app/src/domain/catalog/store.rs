//! Catalog store.

use async_trait::async_trait;
use mockall::automock;
use storefront::catalog::{Catalog, ProductId};
use tracing::debug;

use crate::{
    database::Db,
    domain::{catalog::repository::PgCatalogRepository, errors::StoreError, tenants::TenantUuid},
};

/// Reads catalog snapshots.
#[automock]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Loads the named products, with variants, as they are right now.
    ///
    /// Products that do not exist are simply absent from the snapshot.
    async fn catalog_for(
        &self,
        tenant: TenantUuid,
        products: Vec<ProductId>,
    ) -> Result<Catalog, StoreError>;
}

/// `PostgreSQL` catalog store.
#[derive(Debug, Clone)]
pub struct PgCatalogStore {
    db: Db,
    repository: PgCatalogRepository,
}

impl PgCatalogStore {
    /// Creates a store over the pool.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCatalogRepository::new(),
        }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn catalog_for(
        &self,
        tenant: TenantUuid,
        mut products: Vec<ProductId>,
    ) -> Result<Catalog, StoreError> {
        products.sort_unstable();
        products.dedup();

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let listed = self.repository.list_products(&mut tx, &products).await?;

        tx.commit().await?;

        debug!(requested = products.len(), found = listed.len(), "loaded catalog");

        Ok(listed.into_iter().collect())
    }
}
