//! Checkout service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use jiff::Timestamp;
use serde_json::Value;
use storefront::{
    carts::{self, Reconciliation, items::parse_items},
    orders::{Order, OrderDraft, OrderId, PaymentStatus},
    policy::PricingPolicy,
    pricing::{self, Quote, QuoteError, QuoteRequest},
    promotions::PromoBook,
};
use tracing::{debug, instrument};

use crate::domain::{
    catalog::CatalogStore, checkout::errors::CheckoutServiceError, errors::StoreError,
    orders::OrderStore, promotions::PromoStore, tenants::TenantUuid,
};

/// Checkout operations for one storefront policy.
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Prices an order without writing anything.
    async fn quote(
        &self,
        tenant: TenantUuid,
        request: QuoteRequest,
    ) -> Result<Quote, CheckoutServiceError>;

    /// Compares a client cart with the live catalog.
    async fn reconcile_cart(
        &self,
        tenant: TenantUuid,
        cart: Vec<Value>,
    ) -> Result<Reconciliation, CheckoutServiceError>;

    /// Re-prices the order and persists it.
    async fn place_order(
        &self,
        tenant: TenantUuid,
        request: QuoteRequest,
    ) -> Result<Order, CheckoutServiceError>;

    /// Records a payment status change reported for an order.
    async fn record_payment(
        &self,
        tenant: TenantUuid,
        order: OrderId,
        status: PaymentStatus,
    ) -> Result<(), CheckoutServiceError>;
}

/// Checkout service over the catalog, promo code and order stores.
#[derive(Clone)]
pub struct StoreCheckoutService {
    catalog: Arc<dyn CatalogStore>,
    promo_codes: Arc<dyn PromoStore>,
    orders: Arc<dyn OrderStore>,
    policy: Arc<PricingPolicy>,
}

impl fmt::Debug for StoreCheckoutService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCheckoutService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl StoreCheckoutService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        promo_codes: Arc<dyn PromoStore>,
        orders: Arc<dyn OrderStore>,
        policy: Arc<PricingPolicy>,
    ) -> Self {
        Self {
            catalog,
            promo_codes,
            orders,
            policy,
        }
    }

    async fn price(
        &self,
        tenant: TenantUuid,
        request: &QuoteRequest,
        now: Timestamp,
    ) -> Result<Quote, CheckoutServiceError> {
        if request.lines.is_empty() {
            return Err(QuoteError::EmptyOrder.into());
        }

        let products = request.lines.iter().map(|line| line.product_id).collect();
        let catalog = self.catalog.catalog_for(tenant, products).await?;

        let promotions = self
            .promo_book(tenant, request.promo_code.as_deref(), now)
            .await?;

        Ok(pricing::quote(&catalog, &self.policy, &promotions, request)?)
    }

    async fn promo_book(
        &self,
        tenant: TenantUuid,
        code: Option<&str>,
        now: Timestamp,
    ) -> Result<PromoBook, StoreError> {
        let found = match code {
            Some(code) => {
                self.promo_codes
                    .find_promo_code(tenant, code.to_string())
                    .await?
            }
            None => None,
        };

        Ok(PromoBook::new(found, now))
    }
}

#[async_trait]
impl CheckoutService for StoreCheckoutService {
    #[instrument(skip(self, request), fields(lines = request.lines.len()))]
    async fn quote(
        &self,
        tenant: TenantUuid,
        request: QuoteRequest,
    ) -> Result<Quote, CheckoutServiceError> {
        self.price(tenant, &request, Timestamp::now()).await
    }

    #[instrument(skip(self, cart), fields(items = cart.len()))]
    async fn reconcile_cart(
        &self,
        tenant: TenantUuid,
        cart: Vec<Value>,
    ) -> Result<Reconciliation, CheckoutServiceError> {
        let (items, invalid) = parse_items(&cart);

        let products = items.iter().map(|item| item.product_id).collect();
        let catalog = self.catalog.catalog_for(tenant, products).await?;

        let reconciliation = Reconciliation {
            invalid,
            ..carts::reconcile_items(&catalog, items)
        };

        debug!(
            changes = reconciliation.changes.len(),
            invalid = reconciliation.invalid.len(),
            "cart reconciled"
        );

        Ok(reconciliation)
    }

    #[instrument(skip(self, request), fields(lines = request.lines.len()))]
    async fn place_order(
        &self,
        tenant: TenantUuid,
        request: QuoteRequest,
    ) -> Result<Order, CheckoutServiceError> {
        let now = Timestamp::now();

        let quote = self.price(tenant, &request, now).await?;

        let draft = OrderDraft::from_quote(&quote);
        draft.totals.verify()?;

        Ok(self.orders.place_order(tenant, draft, now).await?)
    }

    #[instrument(skip(self))]
    async fn record_payment(
        &self,
        tenant: TenantUuid,
        order: OrderId,
        status: PaymentStatus,
    ) -> Result<(), CheckoutServiceError> {
        Ok(self
            .orders
            .update_payment_status(tenant, order, status)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storefront::{
        carts::Outcome,
        catalog::{Catalog, Product, ProductId, ProductStatus},
        commissions::VendorId,
        money,
        pricing::LineRequest,
        promotions::{PromoCode, PromoKind, PromoRejection},
    };
    use testresult::TestResult;

    use crate::domain::{
        catalog::MockCatalogStore, orders::MockOrderStore, promotions::MockPromoStore,
    };

    use super::*;

    fn policy() -> TestResult<Arc<PricingPolicy>> {
        Ok(Arc::new(PricingPolicy::new(
            money::currency("USD")?,
            "10%".parse()?,
            2_500,
            "standard",
            500,
        )))
    }

    fn product(price: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(),
            vendor_id: Some(VendorId::new()),
            name: "Enamel pin".to_string(),
            price,
            stock,
            status: ProductStatus::Active,
            variants: Vec::new(),
        }
    }

    fn request(product: &Product, quantity: u32) -> QuoteRequest {
        QuoteRequest {
            lines: vec![LineRequest {
                product_id: product.id,
                variant_id: None,
                quantity,
            }],
            shipping_option: "standard".to_string(),
            promo_code: None,
            asserted_total: None,
        }
    }

    fn catalog_store(catalog: Catalog) -> MockCatalogStore {
        let mut store = MockCatalogStore::new();
        store
            .expect_catalog_for()
            .once()
            .return_once(move |_, _| Ok(catalog));

        store
    }

    fn no_promo_lookups() -> MockPromoStore {
        let mut store = MockPromoStore::new();
        store.expect_find_promo_code().never();

        store
    }

    fn no_writes() -> MockOrderStore {
        let mut store = MockOrderStore::new();
        store.expect_place_order().never();
        store.expect_update_payment_status().never();

        store
    }

    fn service(
        catalog: MockCatalogStore,
        promo_codes: MockPromoStore,
        orders: MockOrderStore,
    ) -> TestResult<StoreCheckoutService> {
        Ok(StoreCheckoutService::new(
            Arc::new(catalog),
            Arc::new(promo_codes),
            Arc::new(orders),
            policy()?,
        ))
    }

    #[tokio::test]
    async fn quote_prices_from_the_catalog_snapshot() -> TestResult {
        let pin = product(1_000, 5);
        let request = request(&pin, 2);
        let tenant = TenantUuid::new();

        let mut catalog = MockCatalogStore::new();
        let expected = vec![pin.id];
        let snapshot: Catalog = [pin].into_iter().collect();
        catalog
            .expect_catalog_for()
            .once()
            .withf(move |t, products| *t == tenant && *products == expected)
            .return_once(move |_, _| Ok(snapshot));

        let service = service(catalog, no_promo_lookups(), no_writes())?;

        let quote = service.quote(tenant, request).await?;

        assert_eq!(quote.subtotal, 2_000);
        assert_eq!(quote.shipping_cost, 500);
        assert_eq!(quote.tax, 250);
        assert_eq!(quote.total, 2_750);

        Ok(())
    }

    #[tokio::test]
    async fn empty_orders_never_reach_the_stores() -> TestResult {
        let mut catalog = MockCatalogStore::new();
        catalog.expect_catalog_for().never();

        let service = service(catalog, no_promo_lookups(), no_writes())?;
        let request = QuoteRequest {
            lines: Vec::new(),
            shipping_option: "standard".to_string(),
            promo_code: None,
            asserted_total: None,
        };

        let result = service.place_order(TenantUuid::new(), request).await;

        assert!(
            matches!(result, Err(CheckoutServiceError::Quote(QuoteError::EmptyOrder))),
            "expected EmptyOrder, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn place_order_persists_server_totals() -> TestResult {
        let pin = product(1_000, 5);
        let mut request = request(&pin, 3);
        // Client rounded differently; within tolerance
        request.asserted_total = Some(3_301);
        let catalog: Catalog = [pin].into_iter().collect();

        let mut orders = MockOrderStore::new();
        orders
            .expect_place_order()
            .once()
            .withf(|_, draft, _| draft.totals.total == 3_300)
            .returning(|_, draft, placed_at| Ok(draft.place(OrderId::new(), placed_at)));
        orders.expect_update_payment_status().never();

        let service = service(catalog_store(catalog), no_promo_lookups(), orders)?;

        let order = service.place_order(TenantUuid::new(), request).await?;

        assert_eq!(order.totals.subtotal, 3_000);
        assert_eq!(order.totals.shipping_cost, 0);
        assert_eq!(order.totals.total, 3_300);
        order.verify_totals()?;

        Ok(())
    }

    #[tokio::test]
    async fn mismatched_totals_are_rejected_before_writing() -> TestResult {
        let pin = product(1_000, 5);
        let mut request = request(&pin, 3);
        request.asserted_total = Some(3_000);
        let catalog: Catalog = [pin].into_iter().collect();

        let service = service(catalog_store(catalog), no_promo_lookups(), no_writes())?;

        let result = service.place_order(TenantUuid::new(), request).await;

        assert!(
            matches!(
                result,
                Err(CheckoutServiceError::Quote(QuoteError::AmountMismatch {
                    asserted: 3_000,
                    computed: 3_300,
                }))
            ),
            "expected AmountMismatch, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn stock_lost_at_commit_is_reported_as_sold_out() -> TestResult {
        let pin = product(1_000, 5);
        let product_id = pin.id;
        let request = request(&pin, 5);
        let catalog: Catalog = [pin].into_iter().collect();

        let mut orders = MockOrderStore::new();
        orders.expect_place_order().once().returning(move |_, _, _| {
            Err(StoreError::OutOfStock {
                product: product_id,
                variant: None,
                requested: 5,
            })
        });

        let service = service(catalog_store(catalog), no_promo_lookups(), orders)?;

        let result = service.place_order(TenantUuid::new(), request).await;

        assert!(
            matches!(
                result,
                Err(CheckoutServiceError::SoldOut { product, requested: 5, .. }) if product == product_id
            ),
            "expected SoldOut, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn promo_codes_are_looked_up_and_applied() -> TestResult {
        let pin = product(2_000, 5);
        let mut request = request(&pin, 1);
        request.promo_code = Some("take5".to_string());
        let catalog: Catalog = [pin].into_iter().collect();

        let mut promo_codes = MockPromoStore::new();
        promo_codes
            .expect_find_promo_code()
            .once()
            .withf(|_, code| code == "take5")
            .returning(|_, _| {
                Ok(Some(PromoCode {
                    code: "TAKE5".to_string(),
                    kind: PromoKind::Fixed(500),
                    min_subtotal: 0,
                    max_discount: None,
                    starts_at: None,
                    ends_at: None,
                    usage_limit: Some(10),
                    used_count: 3,
                    active: true,
                }))
            });

        let service = service(catalog_store(catalog), promo_codes, no_writes())?;

        let quote = service.quote(TenantUuid::new(), request).await?;

        assert_eq!(quote.discount, 500);
        assert_eq!(quote.promo_code.as_deref(), Some("take5"));
        assert_eq!(quote.total, 2_000 + 500 + 250 - 500);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_promo_codes_are_reported_not_fatal() -> TestResult {
        let pin = product(2_000, 5);
        let mut request = request(&pin, 1);
        request.promo_code = Some("NOPE".to_string());
        let catalog: Catalog = [pin].into_iter().collect();

        let mut promo_codes = MockPromoStore::new();
        promo_codes
            .expect_find_promo_code()
            .once()
            .returning(|_, _| Ok(None));

        let service = service(catalog_store(catalog), promo_codes, no_writes())?;

        let quote = service.quote(TenantUuid::new(), request).await?;

        assert_eq!(quote.discount, 0);
        assert_eq!(quote.promo_rejection, Some(PromoRejection::Unknown));

        Ok(())
    }

    #[tokio::test]
    async fn reconcile_cart_reports_corrections_and_invalid_entries() -> TestResult {
        let pin = product(1_200, 3);
        let pin_id = pin.id.to_string();
        let catalog: Catalog = [pin].into_iter().collect();

        let service = service(catalog_store(catalog), no_promo_lookups(), no_writes())?;

        let cart = vec![
            json!({ "id": "a", "productId": pin_id, "quantity": 5, "price": 1000 }),
            json!({ "id": "b", "quantity": 1, "price": 1000 }),
        ];

        let reconciliation = service.reconcile_cart(TenantUuid::new(), cart).await?;

        assert_eq!(reconciliation.outcome("a"), Some(Outcome::QuantityReduced));
        assert_eq!(reconciliation.changes.len(), 2);
        assert_eq!(reconciliation.invalid.len(), 1);

        Ok(())
    }
}
