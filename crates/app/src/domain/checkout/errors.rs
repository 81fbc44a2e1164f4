//! Checkout service errors.

use storefront::{
    catalog::{ProductId, VariantId},
    orders::OrderError,
    pricing::QuoteError,
};
use thiserror::Error;

use crate::domain::errors::StoreError;

/// Checkout service errors.
#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    /// The order could not be priced.
    #[error(transparent)]
    Quote(#[from] QuoteError),

    /// The priced order does not balance.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Stock was taken by another order between pricing and commit.
    #[error("product {product} sold out while the order was being placed")]
    SoldOut {
        /// Product id
        product: ProductId,
        /// Variant id
        variant: Option<VariantId>,
        /// Units requested
        requested: u32,
    },

    /// The promo code reached its usage limit between pricing and commit.
    #[error("promo code {0} is no longer available")]
    PromoExhausted(String),

    /// Storage error
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CheckoutServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::OutOfStock {
                product,
                variant,
                requested,
            } => Self::SoldOut {
                product,
                variant,
                requested,
            },
            StoreError::PromoExhausted(code) => Self::PromoExhausted(code),
            other => Self::Store(other),
        }
    }
}
