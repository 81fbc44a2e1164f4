//! Store errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront::{
    catalog::{ProductId, VariantId},
    orders::OrderError,
    rates::RateError,
};
use thiserror::Error;

/// Errors raised by the persistence stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A row with the same key already exists.
    #[error("record already exists")]
    AlreadyExists,

    /// The requested row does not exist or is not visible to the tenant.
    #[error("record not found")]
    NotFound,

    /// A referenced row does not exist.
    #[error("related resource not found")]
    InvalidReference,

    /// A required column was null.
    #[error("missing required data")]
    MissingRequiredData,

    /// A check constraint rejected the data.
    #[error("invalid data")]
    InvalidData,

    /// A stock reservation found less stock than requested.
    #[error("insufficient stock for product {product}")]
    OutOfStock {
        /// Product id
        product: ProductId,
        /// Variant id, when the variant's stock was short
        variant: Option<VariantId>,
        /// Units requested
        requested: u32,
    },

    /// The promo code ran out of uses while the order was being placed.
    #[error("promo code {0} has no uses left")]
    PromoExhausted(String),

    /// A stored value could not be converted into its domain type.
    #[error("invalid stored value in {column}: {reason}")]
    InvalidRecord {
        /// Column name
        column: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Storage error
    #[error("storage error")]
    Sql(#[source] Error),
}

impl StoreError {
    pub(crate) fn invalid_record(column: &'static str, reason: impl ToString) -> Self {
        Self::InvalidRecord {
            column,
            reason: reason.to_string(),
        }
    }
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<TryFromIntError> for StoreError {
    fn from(error: TryFromIntError) -> Self {
        Self::invalid_record("integer", error)
    }
}

impl From<RateError> for StoreError {
    fn from(error: RateError) -> Self {
        Self::invalid_record("rate", error)
    }
}

impl From<OrderError> for StoreError {
    fn from(error: OrderError) -> Self {
        Self::invalid_record("status", error)
    }
}
