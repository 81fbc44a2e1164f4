//! Cart reconciliation

use rustc_hash::FxHashMap;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    carts::items::{CartItem, InvalidCartItem, parse_items},
    catalog::{Catalog, ProductId, VariantId},
};

/// Units already kept by earlier lines, per product and variant.
type Claimed = FxHashMap<(ProductId, Option<VariantId>), u32>;

/// The single classification given to each readable cart item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Price and stock agree with the catalog.
    Unchanged,

    /// The catalog price differs; the item now carries the catalog price.
    PriceChanged,

    /// Stock no longer covers the quantity; the quantity was clamped.
    QuantityReduced,

    /// The product, or its variant, is gone or no longer for sale.
    Removed,
}

/// The field a [`CartChange`] corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    /// `price` was rewritten.
    PriceChanged,

    /// `quantity` was clamped.
    QuantityReduced,

    /// The item was dropped; `old` is its quantity.
    Removed,
}

/// One correction applied to the client's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartChange {
    /// Client line id
    pub item_id: String,

    /// What changed
    pub kind: ChangeKind,

    /// Value the client had
    pub old: i64,

    /// Value the cart now has; `None` when the item was removed
    pub new: Option<i64>,
}

/// Outcome for one cart item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome {
    /// Client line id
    pub item_id: String,

    /// Outcome
    pub outcome: Outcome,
}

/// The corrected cart and everything that had to change to get there.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    /// Items still in the cart, with catalog prices and clamped quantities.
    pub items: Vec<CartItem>,

    /// Every correction, in cart order.
    pub changes: Vec<CartChange>,

    /// One outcome per readable item, in cart order.
    pub outcomes: Vec<ItemOutcome>,

    /// Entries that could not be read.
    pub invalid: Vec<InvalidCartItem>,
}

impl Reconciliation {
    /// Whether the cart needs no corrections and held no invalid entries.
    pub fn is_clean(&self) -> bool {
        self.changes.is_empty() && self.invalid.is_empty()
    }

    /// Outcome recorded for a cart line.
    pub fn outcome(&self, item_id: &str) -> Option<Outcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.item_id == item_id)
            .map(|outcome| outcome.outcome)
    }
}

/// Reconciles a raw client cart against the catalog.
///
/// Entries that cannot be read are reported in [`Reconciliation::invalid`] and take
/// no further part. Nothing is written anywhere: the result is advisory and
/// checkout re-validates independently.
pub fn reconcile(catalog: &Catalog, raw: &[Value]) -> Reconciliation {
    let (items, invalid) = parse_items(raw);

    Reconciliation {
        invalid,
        ..reconcile_items(catalog, items)
    }
}

/// Reconciles already-parsed cart items against the catalog.
///
/// Lines for the same product and variant share its stock in cart order, so the
/// corrected cart never asks for more than checkout will accept.
pub fn reconcile_items(catalog: &Catalog, items: Vec<CartItem>) -> Reconciliation {
    let mut reconciliation = Reconciliation::default();
    let mut claimed = Claimed::default();

    for mut item in items {
        let (outcome, changes) = check_item(catalog, &mut claimed, &mut item);

        debug!(item_id = %item.id, ?outcome, "reconciled cart item");

        reconciliation.outcomes.push(ItemOutcome {
            item_id: item.id.clone(),
            outcome,
        });
        reconciliation.changes.extend(changes);

        if outcome != Outcome::Removed {
            reconciliation.items.push(item);
        }
    }

    reconciliation
}

/// Corrects `item` in place and classifies it. When both stock and price are off,
/// both are corrected and recorded, and the item is classed as quantity-reduced.
fn check_item(
    catalog: &Catalog,
    claimed: &mut Claimed,
    item: &mut CartItem,
) -> (Outcome, SmallVec<[CartChange; 2]>) {
    let mut changes = SmallVec::new();

    let listing = catalog.available(item.product_id).and_then(|product| {
        match item.variant_id {
            Some(variant_id) => product
                .variant(variant_id)
                .map(|variant| (product, Some(variant))),
            None => Some((product, None)),
        }
    });

    let Some((product, variant)) = listing else {
        changes.push(CartChange {
            item_id: item.id.clone(),
            kind: ChangeKind::Removed,
            old: i64::from(item.quantity),
            new: None,
        });

        return (Outcome::Removed, changes);
    };

    let mut outcome = Outcome::Unchanged;

    let claimed = claimed.entry((product.id, item.variant_id)).or_default();
    let available = product.available_stock(variant).saturating_sub(*claimed);
    if item.quantity > available {
        changes.push(CartChange {
            item_id: item.id.clone(),
            kind: ChangeKind::QuantityReduced,
            old: i64::from(item.quantity),
            new: Some(i64::from(available)),
        });

        item.quantity = available;
        outcome = Outcome::QuantityReduced;
    }
    *claimed = claimed.saturating_add(item.quantity);

    let price = product.unit_price(variant);
    if item.price != price {
        changes.push(CartChange {
            item_id: item.id.clone(),
            kind: ChangeKind::PriceChanged,
            old: item.price,
            new: Some(price),
        });

        item.price = price;
        if outcome == Outcome::Unchanged {
            outcome = Outcome::PriceChanged;
        }
    }

    (outcome, changes)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::catalog::{Product, ProductId, ProductStatus, Variant, VariantId};

    use super::*;

    fn product(price: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(),
            vendor_id: None,
            name: "Linen napkins".to_string(),
            price,
            stock,
            status: ProductStatus::Active,
            variants: Vec::new(),
        }
    }

    fn cart_item(id: &str, product: &Product, quantity: u32, price: i64) -> CartItem {
        CartItem {
            id: id.to_string(),
            product_id: product.id,
            variant_id: None,
            quantity,
            price,
            name: Some(product.name.clone()),
        }
    }

    #[test]
    fn unchanged_items_pass_through() {
        let napkins = product(1_000, 10);
        let item = cart_item("a", &napkins, 2, 1_000);
        let catalog: Catalog = [napkins].into_iter().collect();

        let result = reconcile_items(&catalog, vec![item.clone()]);

        assert!(result.is_clean());
        assert_eq!(result.items, vec![item]);
        assert_eq!(result.outcome("a"), Some(Outcome::Unchanged));
    }

    #[test]
    fn price_and_quantity_are_both_corrected() {
        let napkins = product(1_200, 3);
        let item = cart_item("a", &napkins, 5, 1_000);
        let catalog: Catalog = [napkins].into_iter().collect();

        let result = reconcile_items(&catalog, vec![item]);

        assert_eq!(result.outcome("a"), Some(Outcome::QuantityReduced));
        assert_eq!(
            result.items.first().map(|item| (item.quantity, item.price)),
            Some((3, 1_200))
        );
        assert_eq!(
            result.changes.iter().map(|change| change.kind).collect::<Vec<_>>(),
            vec![ChangeKind::QuantityReduced, ChangeKind::PriceChanged]
        );
    }

    #[test]
    fn repeated_lines_share_stock() {
        let napkins = product(1_000, 3);
        let first = cart_item("a", &napkins, 2, 1_000);
        let second = cart_item("b", &napkins, 2, 1_000);
        let catalog: Catalog = [napkins].into_iter().collect();

        let result = reconcile_items(&catalog, vec![first, second]);

        assert_eq!(result.outcome("a"), Some(Outcome::Unchanged));
        assert_eq!(result.outcome("b"), Some(Outcome::QuantityReduced));
        assert_eq!(
            result.items.iter().map(|item| item.quantity).collect::<Vec<_>>(),
            vec![2, 1]
        );
        assert_eq!(
            result.changes,
            vec![CartChange {
                item_id: "b".to_string(),
                kind: ChangeKind::QuantityReduced,
                old: 2,
                new: Some(1),
            }]
        );
    }

    #[test]
    fn out_of_stock_clamps_to_zero_without_removing() {
        let napkins = product(1_000, 0);
        let item = cart_item("a", &napkins, 2, 1_000);
        let catalog: Catalog = [napkins].into_iter().collect();

        let result = reconcile_items(&catalog, vec![item]);

        assert_eq!(result.items.first().map(|item| item.quantity), Some(0));
        assert_eq!(
            result.changes,
            vec![CartChange {
                item_id: "a".to_string(),
                kind: ChangeKind::QuantityReduced,
                old: 2,
                new: Some(0),
            }]
        );
    }

    #[test]
    fn missing_variant_removes_item() {
        let mut napkins = product(1_000, 10);
        napkins.variants.push(Variant {
            id: VariantId::new(),
            name: "Blue".to_string(),
            price_modifier: 0,
            stock: 10,
        });

        let mut item = cart_item("a", &napkins, 1, 1_000);
        item.variant_id = Some(VariantId::new());
        let catalog: Catalog = [napkins].into_iter().collect();

        let result = reconcile_items(&catalog, vec![item]);

        assert!(result.items.is_empty());
        assert_eq!(result.outcome("a"), Some(Outcome::Removed));
    }

    #[test]
    fn archived_product_is_removed() {
        let mut napkins = product(1_000, 10);
        napkins.status = ProductStatus::Archived;
        let item = cart_item("a", &napkins, 4, 1_000);
        let catalog: Catalog = [napkins].into_iter().collect();

        let result = reconcile_items(&catalog, vec![item]);

        assert_eq!(
            result.changes,
            vec![CartChange {
                item_id: "a".to_string(),
                kind: ChangeKind::Removed,
                old: 4,
                new: None,
            }]
        );
    }

    #[test]
    fn invalid_entries_are_reported_alongside_valid_ones() {
        let napkins = product(1_000, 10);
        let product_id = napkins.id.to_string();
        let catalog: Catalog = [napkins].into_iter().collect();

        let result = reconcile(
            &catalog,
            &[
                json!({ "id": "good", "productId": product_id, "quantity": 1, "price": 1000 }),
                json!({ "id": "bad", "productId": product_id, "quantity": "one", "price": 1000 }),
            ],
        );

        assert_eq!(result.items.len(), 1);
        assert_eq!(result.invalid.len(), 1);
        assert_eq!(result.invalid.first().map(|item| item.index), Some(1));
        assert!(!result.is_clean());
    }

    #[test]
    fn serializes_outcomes_in_kebab_case() -> testresult::TestResult {
        let json = serde_json::to_value(Outcome::QuantityReduced)?;

        assert_eq!(json, json!("quantity-reduced"));

        Ok(())
    }
}
