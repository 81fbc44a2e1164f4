//! Catalog
//!
//! A read-only snapshot of the products a checkout or cart reconciliation needs.
//! The snapshot is authoritative for prices and stock.

use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{commissions::VendorId, ids::Id};

/// Product Id
pub type ProductId = Id<Product>;

/// Variant Id
pub type VariantId = Id<Variant>;

/// Publication status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Listed and purchasable.
    #[default]
    Active,

    /// Not yet published.
    Draft,

    /// Withdrawn from sale.
    Archived,
}

/// A product status string that is not one of `active`, `draft` or `archived`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown product status: {0}")]
pub struct UnknownProductStatus(pub String);

impl FromStr for ProductStatus {
    type Err = UnknownProductStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "draft" => Ok(Self::Draft),
            "archived" => Ok(Self::Archived),
            other => Err(UnknownProductStatus(other.to_string())),
        }
    }
}

/// A purchasable variation of a product, e.g. a size or colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    /// Variant id
    pub id: VariantId,

    /// Variant name
    pub name: String,

    /// Signed adjustment to the product's base price, in minor units.
    pub price_modifier: i64,

    /// Units on hand.
    pub stock: u32,
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product id
    pub id: ProductId,

    /// Owning vendor; `None` for products sold by the platform itself.
    pub vendor_id: Option<VendorId>,

    /// Product name
    pub name: String,

    /// Base price in minor units.
    pub price: i64,

    /// Units on hand when no variant is chosen.
    pub stock: u32,

    /// Publication status
    #[serde(default)]
    pub status: ProductStatus,

    /// Variants
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Whether the product can currently be sold.
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Finds one of this product's variants.
    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.id == id)
    }

    /// Unit price for the product, or for one of its variants.
    ///
    /// Modifiers that would take the price below zero clamp to zero.
    pub fn unit_price(&self, variant: Option<&Variant>) -> i64 {
        let modifier = variant.map_or(0, |variant| variant.price_modifier);

        self.price.saturating_add(modifier).max(0)
    }

    /// Stock available for the product, or for one of its variants.
    pub fn available_stock(&self, variant: Option<&Variant>) -> u32 {
        variant.map_or(self.stock, |variant| variant.stock)
    }
}

/// Products keyed by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: FxHashMap<ProductId, Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id, product);
    }

    /// Looks up a product, whatever its status.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    /// Looks up a product that is currently purchasable.
    pub fn available(&self, id: ProductId) -> Option<&Product> {
        self.get(id).filter(|product| product.is_available())
    }

    /// Number of products in the snapshot.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the snapshot holds no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        Self {
            products: iter
                .into_iter()
                .map(|product| (product.id, product))
                .collect(),
        }
    }
}
