//! Promo Codes Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query};
use storefront::{
    promotions::{PromoCode, PromoKind},
    rates::Rate,
};

use crate::domain::errors::StoreError;

const FIND_PROMO_CODE_SQL: &str = include_str!("sql/find_promo_code.sql");
const REDEEM_PROMO_CODE_SQL: &str = include_str!("sql/redeem_promo_code.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPromoCodesRepository;

impl PgPromoCodesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_promo_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<Option<PromoCode>, StoreError> {
        query(FIND_PROMO_CODE_SQL)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await?
            .as_ref()
            .map(promo_code_from_row)
            .transpose()
    }

    /// Counts one use of the code, provided it is still active and under its limit.
    pub(crate) async fn redeem_promo_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<bool, StoreError> {
        let rows_affected = query(REDEEM_PROMO_CODE_SQL)
            .bind(code)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

fn promo_code_from_row(row: &PgRow) -> Result<PromoCode, StoreError> {
    let percent_off: Option<Decimal> = row.try_get("percent_off")?;
    let amount_off: Option<i64> = row.try_get("amount_off")?;

    let kind = match (percent_off, amount_off) {
        (Some(points), None) => PromoKind::Percent(Rate::from_percent_points(points)?),
        (None, Some(amount)) => PromoKind::Fixed(amount),
        _ => {
            return Err(StoreError::invalid_record(
                "percent_off",
                "exactly one of percent_off and amount_off must be set",
            ));
        }
    };

    Ok(PromoCode {
        code: row.try_get("code")?,
        kind,
        min_subtotal: row.try_get("min_subtotal")?,
        max_discount: row.try_get("max_discount")?,
        starts_at: row
            .try_get::<Option<SqlxTimestamp>, _>("starts_at")?
            .map(SqlxTimestamp::to_jiff),
        ends_at: row
            .try_get::<Option<SqlxTimestamp>, _>("ends_at")?
            .map(SqlxTimestamp::to_jiff),
        usage_limit: row
            .try_get::<Option<i32>, _>("usage_limit")?
            .map(u32::try_from)
            .transpose()?,
        used_count: u32::try_from(row.try_get::<i32, _>("used_count")?)?,
        active: row.try_get("active")?,
    })
}
