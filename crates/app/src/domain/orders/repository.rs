//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Transaction, query};
use storefront::{
    catalog::VariantId,
    commissions::VendorId,
    orders::{Order, OrderId, PaymentStatus},
};
use uuid::Uuid;

use crate::domain::errors::StoreError;

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const UPDATE_PAYMENT_STATUS_SQL: &str = include_str!("sql/update_payment_status.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
    ) -> Result<(), StoreError> {
        query(CREATE_ORDER_SQL)
            .bind(order.id.into_uuid())
            .bind(&order.currency)
            .bind(&order.shipping_option)
            .bind(order.promo_code.as_deref())
            .bind(order.totals.subtotal)
            .bind(order.totals.shipping_cost)
            .bind(order.totals.tax)
            .bind(order.totals.discount)
            .bind(order.totals.total)
            .bind(order.status.as_str())
            .bind(order.payment_status.as_str())
            .bind(SqlxTimestamp::from(order.placed_at))
            .execute(&mut **tx)
            .await?;

        for (position, item) in order.items.iter().enumerate() {
            query(CREATE_ORDER_ITEM_SQL)
                .bind(Uuid::now_v7())
                .bind(order.id.into_uuid())
                .bind(i32::try_from(position)?)
                .bind(item.product_id.into_uuid())
                .bind(item.variant_id.map(VariantId::into_uuid))
                .bind(item.vendor_id.map(VendorId::into_uuid))
                .bind(&item.name)
                .bind(item.unit_price)
                .bind(i32::try_from(item.quantity)?)
                .bind(item.line_total)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    pub(crate) async fn update_payment_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderId,
        status: PaymentStatus,
    ) -> Result<u64, StoreError> {
        let rows_affected = query(UPDATE_PAYMENT_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}
