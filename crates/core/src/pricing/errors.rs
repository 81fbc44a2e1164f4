//! Quote errors

use thiserror::Error;

use crate::{
    catalog::{ProductId, VariantId},
    money::MoneyError,
};

/// Reasons a checkout quote cannot be produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// The request contained no lines.
    #[error("order has no lines")]
    EmptyOrder,

    /// A line asked for zero units.
    #[error("line {index} has a quantity of zero")]
    InvalidQuantity {
        /// Position of the line in the request.
        index: usize,
    },

    /// The product does not exist or is not for sale.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The product exists but the requested variant does not.
    #[error("variant {variant} of product {product} not found")]
    VariantNotFound {
        /// Product id
        product: ProductId,
        /// Variant id
        variant: VariantId,
    },

    /// More units were requested than are in stock.
    #[error(
        "insufficient stock for product {product}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        /// Product id
        product: ProductId,
        /// Variant id, when the stock belongs to a variant.
        variant: Option<VariantId>,
        /// Units requested across every line for this product or variant.
        requested: u32,
        /// Units on hand.
        available: u32,
    },

    /// The client's total disagrees with the server's by more than the tolerance.
    #[error("client total {asserted} does not match computed total {computed}")]
    AmountMismatch {
        /// Total submitted by the client.
        asserted: i64,
        /// Total computed from the catalog.
        computed: i64,
    },

    /// The shipping option is not in the shipping table.
    #[error("unknown shipping option: {0}")]
    UnknownShippingOption(String),

    /// Money arithmetic overflowed.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl QuoteError {
    /// Units the customer must drop for an [`QuoteError::InsufficientStock`] line.
    pub fn shortfall(&self) -> Option<u32> {
        match self {
            Self::InsufficientStock {
                requested,
                available,
                ..
            } => Some(requested.saturating_sub(*available)),
            _ => None,
        }
    }
}
