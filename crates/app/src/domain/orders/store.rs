//! Order store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use storefront::{
    catalog::{ProductId, VariantId},
    orders::{Order, OrderDraft, OrderId, PaymentStatus},
};
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        catalog::repository::PgCatalogRepository, errors::StoreError,
        orders::repository::PgOrdersRepository, promotions::repository::PgPromoCodesRepository,
        tenants::TenantUuid,
    },
};

/// Persists orders.
#[automock]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Places an order in a single transaction.
    ///
    /// Stock for every line is taken with a conditional decrement, the order and
    /// its items are written, and the promo code, if any, is redeemed. If any
    /// step fails nothing is written.
    async fn place_order(
        &self,
        tenant: TenantUuid,
        draft: OrderDraft,
        placed_at: Timestamp,
    ) -> Result<Order, StoreError>;

    /// Records a new payment status for an order.
    async fn update_payment_status(
        &self,
        tenant: TenantUuid,
        order: OrderId,
        status: PaymentStatus,
    ) -> Result<(), StoreError>;
}

/// `PostgreSQL` order store.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    db: Db,
    catalog: PgCatalogRepository,
    orders: PgOrdersRepository,
    promo_codes: PgPromoCodesRepository,
}

impl PgOrderStore {
    /// Creates a store over the pool.
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            catalog: PgCatalogRepository::new(),
            orders: PgOrdersRepository::new(),
            promo_codes: PgPromoCodesRepository::new(),
        }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn place_order(
        &self,
        tenant: TenantUuid,
        draft: OrderDraft,
        placed_at: Timestamp,
    ) -> Result<Order, StoreError> {
        let order = draft.place(OrderId::new(), placed_at);

        // Reserve in a stable order so concurrent checkouts lock rows consistently
        let mut reservations: BTreeMap<(ProductId, Option<VariantId>), u32> = BTreeMap::new();
        for item in &order.items {
            let reserved = reservations
                .entry((item.product_id, item.variant_id))
                .or_default();
            *reserved = reserved.saturating_add(item.quantity);
        }

        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        for ((product, variant), quantity) in reservations {
            if !self
                .catalog
                .reserve_stock(&mut tx, product, variant, quantity)
                .await?
            {
                warn!(%product, ?variant, quantity, "stock ran out before the order committed");

                return Err(StoreError::OutOfStock {
                    product,
                    variant,
                    requested: quantity,
                });
            }
        }

        self.orders.create_order(&mut tx, &order).await?;

        if let Some(code) = &order.promo_code {
            if !self.promo_codes.redeem_promo_code(&mut tx, code).await? {
                return Err(StoreError::PromoExhausted(code.clone()));
            }
        }

        tx.commit().await?;

        info!(order = %order.id, total = order.totals.total, "order placed");

        Ok(order)
    }

    async fn update_payment_status(
        &self,
        tenant: TenantUuid,
        order: OrderId,
        status: PaymentStatus,
    ) -> Result<(), StoreError> {
        let mut tx = self.db.begin_tenant_transaction(tenant).await?;

        let rows_affected = self
            .orders
            .update_payment_status(&mut tx, order, status)
            .await?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}
