//! Commissions
//!
//! Splits vendor revenue into platform commission and vendor payout, and rolls the
//! splits up into per-vendor reports over a period.

use jiff::Timestamp;
use thiserror::Error;

use crate::{ids::Id, money::MoneyError, rates::RateError};

mod report;
mod split;

pub use report::*;
pub use split::*;

/// Vendor
#[derive(Debug)]
pub struct Vendor;

/// Vendor Id
pub type VendorId = Id<Vendor>;

/// Errors raised while computing commissions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommissionError {
    /// A configured commission rate is invalid.
    #[error(transparent)]
    Rate(#[from] RateError),

    /// The reporting period does not span any time.
    #[error("report period must start before it ends ({start} >= {end})")]
    EmptyPeriod {
        /// Requested start
        start: Timestamp,
        /// Requested end
        end: Timestamp,
    },

    /// Money arithmetic overflowed.
    #[error(transparent)]
    Money(#[from] MoneyError),
}
