//! Integration tests for reconciling stale client carts.

use serde_json::json;
use testresult::TestResult;

use storefront::prelude::*;

fn product(name: &str, price: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(),
        vendor_id: None,
        name: name.to_string(),
        price,
        stock,
        status: ProductStatus::Active,
        variants: Vec::new(),
    }
}

#[test]
fn stale_cart_is_corrected_item_by_item() -> TestResult {
    let repriced = product("Wool throw", 1_200, 10);
    let scarce = product("Cushion", 800, 3);
    let steady = product("Candle", 450, 20);
    let deleted = ProductId::new();

    let cart = [
        json!({ "id": "throw", "productId": repriced.id.to_string(), "quantity": 1, "price": 1000 }),
        json!({ "id": "cushion", "product_id": scarce.id.to_string(), "quantity": 5, "price": 800 }),
        json!({ "id": "candle", "productId": steady.id.to_string(), "quantity": 2, "price": 450 }),
        json!({ "id": "gone", "productId": deleted.to_string(), "quantity": 1, "price": 999 }),
    ];
    let catalog: Catalog = [repriced, scarce, steady].into_iter().collect();

    let result = reconcile(&catalog, &cart);

    assert_eq!(result.outcome("throw"), Some(Outcome::PriceChanged));
    assert_eq!(result.outcome("cushion"), Some(Outcome::QuantityReduced));
    assert_eq!(result.outcome("candle"), Some(Outcome::Unchanged));
    assert_eq!(result.outcome("gone"), Some(Outcome::Removed));

    assert_eq!(
        result.changes,
        vec![
            CartChange {
                item_id: "throw".to_string(),
                kind: ChangeKind::PriceChanged,
                old: 1_000,
                new: Some(1_200),
            },
            CartChange {
                item_id: "cushion".to_string(),
                kind: ChangeKind::QuantityReduced,
                old: 5,
                new: Some(3),
            },
            CartChange {
                item_id: "gone".to_string(),
                kind: ChangeKind::Removed,
                old: 1,
                new: None,
            },
        ]
    );

    let kept: Vec<_> = result
        .items
        .iter()
        .map(|item| (item.id.as_str(), item.quantity, item.price))
        .collect();
    assert_eq!(
        kept,
        vec![("throw", 1, 1_200), ("cushion", 3, 800), ("candle", 2, 450)]
    );

    Ok(())
}

#[test]
fn variant_pricing_and_stock_drive_corrections() -> TestResult {
    let variant = Variant {
        id: VariantId::new(),
        name: "Large".to_string(),
        price_modifier: 300,
        stock: 1,
    };
    let mut throw = product("Wool throw", 1_200, 50);
    throw.variants.push(variant.clone());

    let cart = [json!({
        "id": "large-throw",
        "productId": throw.id.to_string(),
        "variantId": variant.id.to_string(),
        "quantity": 2,
        "price": 1200
    })];
    let catalog: Catalog = [throw].into_iter().collect();

    let result = reconcile(&catalog, &cart);

    assert_eq!(result.outcome("large-throw"), Some(Outcome::QuantityReduced));
    assert_eq!(
        result.items.first().map(|item| (item.quantity, item.price)),
        Some((1, 1_500))
    );
    assert_eq!(result.changes.len(), 2);

    Ok(())
}

#[test]
fn reconciled_cart_prices_cleanly_at_checkout() -> TestResult {
    let throw = product("Wool throw", 1_200, 2);
    let cart = [json!({ "id": "a", "productId": throw.id.to_string(), "quantity": 4, "price": 1000 })];
    let catalog: Catalog = [throw].into_iter().collect();
    let policy = PricingPolicy::from_yaml(include_str!("../fixtures/pricing.yml"))?;

    let result = reconcile(&catalog, &cart);
    let request = QuoteRequest {
        lines: result
            .items
            .iter()
            .map(|item| LineRequest {
                product_id: item.product_id,
                variant_id: item.variant_id,
                quantity: item.quantity,
            })
            .collect(),
        shipping_option: "standard".to_string(),
        promo_code: None,
        asserted_total: None,
    };

    let quote = quote(&catalog, &policy, &NoPromotions, &request)?;

    assert_eq!(quote.subtotal, 2_400);

    Ok(())
}

#[test]
fn split_lines_are_trimmed_to_what_checkout_accepts() -> TestResult {
    let throw = product("Wool throw", 1_200, 3);
    let cart = [
        json!({ "id": "a", "productId": throw.id.to_string(), "quantity": 2, "price": 1200 }),
        json!({ "id": "b", "productId": throw.id.to_string(), "quantity": 2, "price": 1200 }),
    ];
    let catalog: Catalog = [throw].into_iter().collect();
    let policy = PricingPolicy::from_yaml(include_str!("../fixtures/pricing.yml"))?;

    let result = reconcile(&catalog, &cart);

    assert_eq!(result.outcome("a"), Some(Outcome::Unchanged));
    assert_eq!(result.outcome("b"), Some(Outcome::QuantityReduced));

    let request = QuoteRequest {
        lines: result
            .items
            .iter()
            .map(|item| LineRequest {
                product_id: item.product_id,
                variant_id: item.variant_id,
                quantity: item.quantity,
            })
            .collect(),
        shipping_option: "standard".to_string(),
        promo_code: None,
        asserted_total: None,
    };

    let quote = quote(&catalog, &policy, &NoPromotions, &request)?;

    assert_eq!(quote.subtotal, 3_600);

    Ok(())
}
