//! Cart items
//!
//! Client carts arrive as loosely typed JSON. Each entry is parsed on its own so a
//! single malformed entry never hides the rest of the cart.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    catalog::{ProductId, VariantId},
    ids::Id,
};

/// A cart entry as the client last saw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Client-chosen line id
    pub id: String,

    /// Product id
    pub product_id: ProductId,

    /// Variant id
    pub variant_id: Option<VariantId>,

    /// Units in the cart
    pub quantity: u32,

    /// Unit price snapshot, in minor units
    pub price: i64,

    /// Display name snapshot
    pub name: Option<String>,
}

/// Why a raw cart entry could not be read.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CartItemError {
    /// The entry is not a JSON object.
    #[error("cart item is not an object")]
    NotAnObject,

    /// A required field is absent or null.
    #[error("missing field `{field}`")]
    MissingField {
        /// Field name
        field: &'static str,
    },

    /// A field holds the wrong JSON type.
    #[error("field `{field}` must be {expected}")]
    WrongType {
        /// Field name
        field: &'static str,
        /// Expected type
        expected: &'static str,
    },

    /// An id field is not a valid UUID.
    #[error("field `{field}` is not a valid id")]
    InvalidId {
        /// Field name
        field: &'static str,
    },

    /// Quantity is zero, negative or too large.
    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    /// Price is negative, fractional or too large.
    #[error("price must be a non-negative whole number of minor units")]
    InvalidPrice,
}

/// A cart entry that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidCartItem {
    /// Position of the entry in the submitted cart.
    pub index: usize,

    /// The entry's id, when one could be read.
    pub id: Option<String>,

    /// What was wrong with it.
    pub reason: CartItemError,
}

impl CartItem {
    /// Reads a cart entry from JSON.
    ///
    /// Field names are accepted in camelCase (`productId`) or snake_case
    /// (`product_id`).
    ///
    /// # Errors
    ///
    /// Returns a [`CartItemError`] describing the first problem found.
    pub fn from_json(value: &Value) -> Result<Self, CartItemError> {
        let object = value.as_object().ok_or(CartItemError::NotAnObject)?;

        let id = required(object, "id", None)?
            .as_str()
            .ok_or(CartItemError::WrongType {
                field: "id",
                expected: "a string",
            })?
            .to_string();

        let product_id = required(object, "productId", Some("product_id"))?;
        let product_id = parse_id(product_id, "productId")?;

        let variant_id = optional(object, "variantId", Some("variant_id"))
            .map(|value| parse_id(value, "variantId"))
            .transpose()?;

        let quantity = required(object, "quantity", None)?;
        let quantity = quantity
            .as_i64()
            .or_else(|| quantity.as_u64().map(|_| i64::MAX))
            .ok_or(CartItemError::WrongType {
                field: "quantity",
                expected: "an integer",
            })?;
        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or(CartItemError::InvalidQuantity)?;

        let price = parse_price(required(object, "price", None)?)?;

        let name = optional(object, "name", None)
            .map(|value| {
                value.as_str().map(str::to_string).ok_or(CartItemError::WrongType {
                    field: "name",
                    expected: "a string",
                })
            })
            .transpose()?;

        Ok(Self {
            id,
            product_id,
            variant_id,
            quantity,
            price,
            name,
        })
    }
}

/// Reads every entry of a raw cart, splitting readable items from invalid ones.
pub fn parse_items(raw: &[Value]) -> (Vec<CartItem>, Vec<InvalidCartItem>) {
    let mut items = Vec::with_capacity(raw.len());
    let mut invalid = Vec::new();

    for (index, value) in raw.iter().enumerate() {
        match CartItem::from_json(value) {
            Ok(item) => items.push(item),
            Err(reason) => invalid.push(InvalidCartItem {
                index,
                id: value
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                reason,
            }),
        }
    }

    (items, invalid)
}

fn optional<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    alias: Option<&str>,
) -> Option<&'a Value> {
    object
        .get(field)
        .or_else(|| alias.and_then(|alias| object.get(alias)))
        .filter(|value| !value.is_null())
}

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
    alias: Option<&str>,
) -> Result<&'a Value, CartItemError> {
    optional(object, field, alias).ok_or(CartItemError::MissingField { field })
}

fn parse_id<T>(value: &Value, field: &'static str) -> Result<Id<T>, CartItemError> {
    value
        .as_str()
        .ok_or(CartItemError::WrongType {
            field,
            expected: "a string",
        })?
        .parse()
        .map_err(|_err| CartItemError::InvalidId { field })
}

/// Prices are JSON numbers holding a whole number of minor units; `1200` and
/// `1200.0` are both accepted.
fn parse_price(value: &Value) -> Result<i64, CartItemError> {
    let number = value.as_number().ok_or(CartItemError::WrongType {
        field: "price",
        expected: "a number",
    })?;

    let price = if let Some(price) = number.as_i64() {
        price
    } else {
        number
            .as_f64()
            .and_then(|price| Decimal::try_from(price).ok())
            .filter(|price| price.fract().is_zero())
            .and_then(|price| price.to_i64())
            .ok_or(CartItemError::InvalidPrice)?
    };

    if price < 0 {
        return Err(CartItemError::InvalidPrice);
    }

    Ok(price)
}
