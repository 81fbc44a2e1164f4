//! Sales Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query};
use storefront::{
    catalog::ProductId,
    commissions::{ReportPeriod, SaleLine, VendorId},
    orders::{OrderId, PaymentStatus},
    rates::Rate,
};
use uuid::Uuid;

use crate::domain::errors::StoreError;

const LIST_SALE_LINES_SQL: &str = include_str!("sql/list_sale_lines.sql");
const LIST_COMMISSION_RATES_SQL: &str = include_str!("sql/list_commission_rates.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgSalesRepository;

impl PgSalesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_sale_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        period: ReportPeriod,
    ) -> Result<Vec<SaleLine>, StoreError> {
        query(LIST_SALE_LINES_SQL)
            .bind(SqlxTimestamp::from(period.start()))
            .bind(SqlxTimestamp::from(period.end()))
            .fetch_all(&mut **tx)
            .await?
            .iter()
            .map(sale_line_from_row)
            .collect()
    }

    pub(crate) async fn list_commission_rates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<FxHashMap<VendorId, Rate>, StoreError> {
        query(LIST_COMMISSION_RATES_SQL)
            .fetch_all(&mut **tx)
            .await?
            .iter()
            .map(|row| -> Result<(VendorId, Rate), StoreError> {
                let vendor = VendorId::from_uuid(row.try_get("uuid")?);
                let points: Decimal = row.try_get("commission_rate")?;

                Ok((vendor, Rate::from_percent_points(points)?))
            })
            .collect()
    }
}

fn sale_line_from_row(row: &PgRow) -> Result<SaleLine, StoreError> {
    let payment_status: String = row.try_get("payment_status")?;

    Ok(SaleLine {
        order_id: OrderId::from_uuid(row.try_get("order_uuid")?),
        vendor_id: row
            .try_get::<Option<Uuid>, _>("vendor_uuid")?
            .map(VendorId::from_uuid),
        product_id: ProductId::from_uuid(row.try_get("product_uuid")?),
        unit_price: row.try_get("unit_price")?,
        quantity: u32::try_from(row.try_get::<i32, _>("quantity")?)?,
        payment_status: payment_status.parse::<PaymentStatus>()?,
        placed_at: row.try_get::<SqlxTimestamp, _>("placed_at")?.to_jiff(),
    })
}
