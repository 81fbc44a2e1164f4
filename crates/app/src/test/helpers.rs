//! Test Helpers
//!
//! Rows are seeded and inspected through the superuser pool, with the tenant set
//! explicitly, so setup never depends on the policies under test.

use jiff::Timestamp;
use rust_decimal::Decimal;
use sqlx::query;
use storefront::{
    catalog::{ProductId, VariantId},
    commissions::VendorId,
    orders::{OrderDraft, OrderId, OrderItem, OrderTotals},
};
use testresult::TestResult;
use uuid::Uuid;

use crate::{domain::tenants::TenantUuid, test::TestDb};

pub(crate) async fn create_tenant(db: &TestDb, name: &str) -> TestResult<TenantUuid> {
    let tenant = TenantUuid::new();

    query("INSERT INTO tenants (uuid, name) VALUES ($1, $2)")
        .bind(tenant.into_uuid())
        .bind(name)
        .execute(&db.admin)
        .await?;

    Ok(tenant)
}

pub(crate) async fn create_vendor(
    db: &TestDb,
    tenant: TenantUuid,
    commission_rate: Option<Decimal>,
) -> TestResult<VendorId> {
    let vendor = VendorId::new();

    query(
        "INSERT INTO vendors (uuid, tenant_uuid, name, commission_rate) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(vendor.into_uuid())
    .bind(tenant.into_uuid())
    .bind(format!("Vendor {vendor}"))
    .bind(commission_rate)
    .execute(&db.admin)
    .await?;

    Ok(vendor)
}

pub(crate) async fn create_product(
    db: &TestDb,
    tenant: TenantUuid,
    product: ProductId,
    vendor: Option<VendorId>,
    price: i64,
    stock: i32,
) -> TestResult {
    query(
        "INSERT INTO products (uuid, tenant_uuid, vendor_uuid, name, price, stock) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(product.into_uuid())
    .bind(tenant.into_uuid())
    .bind(vendor.map(VendorId::into_uuid))
    .bind(format!("Product {product}"))
    .bind(price)
    .bind(stock)
    .execute(&db.admin)
    .await?;

    Ok(())
}

pub(crate) async fn create_variant(
    db: &TestDb,
    tenant: TenantUuid,
    product: ProductId,
    price_modifier: i64,
    stock: i32,
) -> TestResult<VariantId> {
    let variant = VariantId::new();

    query(
        "INSERT INTO product_variants \
         (uuid, tenant_uuid, product_uuid, name, price_modifier, stock) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(variant.into_uuid())
    .bind(tenant.into_uuid())
    .bind(product.into_uuid())
    .bind(format!("Variant {variant}"))
    .bind(price_modifier)
    .bind(stock)
    .execute(&db.admin)
    .await?;

    Ok(variant)
}

pub(crate) async fn create_percent_promo(
    db: &TestDb,
    tenant: TenantUuid,
    code: &str,
    percent_off: Decimal,
    usage_limit: Option<i32>,
) -> TestResult {
    query(
        "INSERT INTO promo_codes (uuid, tenant_uuid, code, percent_off, usage_limit) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::now_v7())
    .bind(tenant.into_uuid())
    .bind(code)
    .bind(percent_off)
    .bind(usage_limit)
    .execute(&db.admin)
    .await?;

    Ok(())
}

pub(crate) async fn product_stock(db: &TestDb, product: ProductId) -> TestResult<i32> {
    Ok(sqlx::query_scalar("SELECT stock FROM products WHERE uuid = $1")
        .bind(product.into_uuid())
        .fetch_one(&db.admin)
        .await?)
}

pub(crate) async fn variant_stock(db: &TestDb, variant: VariantId) -> TestResult<i32> {
    Ok(sqlx::query_scalar("SELECT stock FROM product_variants WHERE uuid = $1")
        .bind(variant.into_uuid())
        .fetch_one(&db.admin)
        .await?)
}

pub(crate) async fn promo_used_count(
    db: &TestDb,
    tenant: TenantUuid,
    code: &str,
) -> TestResult<i32> {
    Ok(sqlx::query_scalar(
        "SELECT used_count FROM promo_codes WHERE tenant_uuid = $1 AND upper(code) = upper($2)",
    )
    .bind(tenant.into_uuid())
    .bind(code)
    .fetch_one(&db.admin)
    .await?)
}

pub(crate) async fn order_rows(db: &TestDb) -> TestResult<(i64, i64)> {
    let orders: i64 = sqlx::query_scalar("SELECT count(*) FROM orders")
        .fetch_one(&db.admin)
        .await?;
    let items: i64 = sqlx::query_scalar("SELECT count(*) FROM order_items")
        .fetch_one(&db.admin)
        .await?;

    Ok((orders, items))
}

pub(crate) async fn payment_status(db: &TestDb, order: OrderId) -> TestResult<String> {
    Ok(sqlx::query_scalar("SELECT payment_status FROM orders WHERE uuid = $1")
        .bind(order.into_uuid())
        .fetch_one(&db.admin)
        .await?)
}

pub(crate) fn order_item(
    product: ProductId,
    variant: Option<VariantId>,
    vendor: Option<VendorId>,
    unit_price: i64,
    quantity: u32,
) -> OrderItem {
    OrderItem {
        product_id: product,
        variant_id: variant,
        vendor_id: vendor,
        name: format!("Product {product}"),
        unit_price,
        quantity,
        line_total: unit_price * i64::from(quantity),
    }
}

/// A draft with no shipping, tax or discount, so the total is the subtotal.
pub(crate) fn draft(items: Vec<OrderItem>, promo_code: Option<&str>) -> OrderDraft {
    let subtotal = items.iter().map(|item| item.line_total).sum();

    OrderDraft {
        currency: "USD",
        items,
        shipping_option: "standard".to_string(),
        promo_code: promo_code.map(str::to_string),
        totals: OrderTotals {
            subtotal,
            total: subtotal,
            ..OrderTotals::default()
        },
    }
}

pub(crate) fn at(timestamp: &str) -> TestResult<Timestamp> {
    Ok(timestamp.parse()?)
}
