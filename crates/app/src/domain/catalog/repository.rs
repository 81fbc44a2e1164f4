//! Catalog Repository

use rustc_hash::FxHashMap;
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query};
use storefront::{
    catalog::{Product, ProductId, ProductStatus, Variant, VariantId},
    commissions::VendorId,
};
use uuid::Uuid;

use crate::domain::errors::StoreError;

const LIST_PRODUCTS_SQL: &str = include_str!("sql/list_products.sql");
const LIST_VARIANTS_SQL: &str = include_str!("sql/list_variants.sql");
const RESERVE_PRODUCT_STOCK_SQL: &str = include_str!("sql/reserve_product_stock.sql");
const RESERVE_VARIANT_STOCK_SQL: &str = include_str!("sql/reserve_variant_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCatalogRepository;

impl PgCatalogRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Loads the given products with their variants.
    pub(crate) async fn list_products(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        products: &[ProductId],
    ) -> Result<Vec<Product>, StoreError> {
        let uuids: Vec<Uuid> = products.iter().copied().map(ProductId::into_uuid).collect();

        let mut variants: FxHashMap<Uuid, Vec<Variant>> = FxHashMap::default();

        for row in query(LIST_VARIANTS_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?
        {
            let product: Uuid = row.try_get("product_uuid")?;

            variants
                .entry(product)
                .or_default()
                .push(variant_from_row(&row)?);
        }

        query(LIST_PRODUCTS_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?
            .iter()
            .map(|row| -> Result<Product, StoreError> {
                let mut product = product_from_row(row)?;
                product.variants = variants
                    .remove(&product.id.into_uuid())
                    .unwrap_or_default();

                Ok(product)
            })
            .collect()
    }

    /// Takes `quantity` units of stock if at least that many remain.
    ///
    /// Returns whether the stock was reserved.
    pub(crate) async fn reserve_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: ProductId,
        variant: Option<VariantId>,
        quantity: u32,
    ) -> Result<bool, StoreError> {
        let quantity = i32::try_from(quantity)?;

        let result = match variant {
            Some(variant) => {
                query(RESERVE_VARIANT_STOCK_SQL)
                    .bind(product.into_uuid())
                    .bind(variant.into_uuid())
                    .bind(quantity)
                    .execute(&mut **tx)
                    .await?
            }
            None => {
                query(RESERVE_PRODUCT_STOCK_SQL)
                    .bind(product.into_uuid())
                    .bind(quantity)
                    .execute(&mut **tx)
                    .await?
            }
        };

        Ok(result.rows_affected() == 1)
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let status: String = row.try_get("status")?;

    Ok(Product {
        id: ProductId::from_uuid(row.try_get("uuid")?),
        vendor_id: row
            .try_get::<Option<Uuid>, _>("vendor_uuid")?
            .map(VendorId::from_uuid),
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        stock: u32::try_from(row.try_get::<i32, _>("stock")?)?,
        status: status
            .parse::<ProductStatus>()
            .map_err(|error| StoreError::invalid_record("status", error))?,
        variants: Vec::new(),
    })
}

fn variant_from_row(row: &PgRow) -> Result<Variant, StoreError> {
    Ok(Variant {
        id: VariantId::from_uuid(row.try_get("uuid")?),
        name: row.try_get("name")?,
        price_modifier: row.try_get("price_modifier")?,
        stock: u32::try_from(row.try_get::<i32, _>("stock")?)?,
    })
}
