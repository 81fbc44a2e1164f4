//! Promotions
//!
//! Promo-code validation as seen by the checkout calculator: given a code and a
//! subtotal, either a discount amount or a reason the code does not apply.

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rates::Rate;

/// Why a promo code could not be applied.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum PromoRejection {
    /// No promo with this code exists.
    #[error("promo code is not recognised")]
    Unknown,

    /// The promo has been switched off.
    #[error("promo code is no longer active")]
    Inactive,

    /// The promo window has not opened yet.
    #[error("promo code is not valid yet")]
    NotStarted,

    /// The promo window has closed.
    #[error("promo code has expired")]
    Expired,

    /// The subtotal is too small for the promo.
    #[error("promo code requires a subtotal of at least {minimum}")]
    BelowMinimum {
        /// Minimum subtotal in minor units.
        minimum: i64,
    },

    /// Every permitted use has been taken.
    #[error("promo code has reached its usage limit")]
    UsageLimitReached,
}

/// Result of validating a promo code against a subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoOutcome {
    /// The code applies and is worth this many minor units.
    Discount(i64),

    /// The code does not apply.
    NotApplicable(PromoRejection),
}

/// Validates promo codes for the calculator.
///
/// Implementations must return a non-negative amount; the calculator additionally
/// caps the discount at the subtotal.
pub trait PromoValidator {
    /// Validates `code` for an order with the given subtotal.
    fn validate(&self, code: &str, subtotal: i64) -> PromoOutcome;
}

/// A validator that recognises no codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPromotions;

impl PromoValidator for NoPromotions {
    fn validate(&self, _code: &str, _subtotal: i64) -> PromoOutcome {
        PromoOutcome::NotApplicable(PromoRejection::Unknown)
    }
}

/// What a promo code takes off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PromoKind {
    /// A percentage of the subtotal.
    Percent(Rate),

    /// A fixed amount in minor units.
    Fixed(i64),
}

/// A promo code and the rules that govern it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    /// The code customers enter.
    pub code: String,

    /// Discount rule
    pub kind: PromoKind,

    /// Minimum subtotal in minor units.
    #[serde(default)]
    pub min_subtotal: i64,

    /// Upper bound on the discount, in minor units.
    #[serde(default)]
    pub max_discount: Option<i64>,

    /// Start of the validity window.
    #[serde(default)]
    pub starts_at: Option<Timestamp>,

    /// End of the validity window (exclusive).
    #[serde(default)]
    pub ends_at: Option<Timestamp>,

    /// How many orders may use the code.
    #[serde(default)]
    pub usage_limit: Option<u32>,

    /// How many orders have used the code.
    #[serde(default)]
    pub used_count: u32,

    /// Whether the code is switched on.
    pub active: bool,
}

impl PromoCode {
    /// Evaluates the code for a subtotal at a point in time.
    pub fn evaluate(&self, subtotal: i64, now: Timestamp) -> PromoOutcome {
        if let Some(rejection) = self.rejection(subtotal, now) {
            return PromoOutcome::NotApplicable(rejection);
        }

        let amount = match self.kind {
            PromoKind::Percent(rate) => rate.apply(subtotal).unwrap_or(subtotal),
            PromoKind::Fixed(amount) => amount,
        };

        let capped = self
            .max_discount
            .map_or(amount, |max_discount| amount.min(max_discount));

        PromoOutcome::Discount(capped.clamp(0, subtotal.max(0)))
    }

    fn rejection(&self, subtotal: i64, now: Timestamp) -> Option<PromoRejection> {
        if !self.active {
            return Some(PromoRejection::Inactive);
        }

        if self.starts_at.is_some_and(|starts_at| now < starts_at) {
            return Some(PromoRejection::NotStarted);
        }

        if self.ends_at.is_some_and(|ends_at| now >= ends_at) {
            return Some(PromoRejection::Expired);
        }

        if self
            .usage_limit
            .is_some_and(|usage_limit| self.used_count >= usage_limit)
        {
            return Some(PromoRejection::UsageLimitReached);
        }

        if subtotal < self.min_subtotal {
            return Some(PromoRejection::BelowMinimum {
                minimum: self.min_subtotal,
            });
        }

        None
    }
}

/// Promo codes evaluated at a fixed point in time. Codes are case-insensitive.
#[derive(Debug, Clone)]
pub struct PromoBook {
    codes: FxHashMap<String, PromoCode>,
    now: Timestamp,
}

impl PromoBook {
    /// Creates a book that evaluates codes as of `now`.
    pub fn new(codes: impl IntoIterator<Item = PromoCode>, now: Timestamp) -> Self {
        let codes = codes
            .into_iter()
            .map(|promo| (normalize_code(&promo.code), promo))
            .collect();

        Self { codes, now }
    }

    /// Looks up a code.
    pub fn get(&self, code: &str) -> Option<&PromoCode> {
        self.codes.get(&normalize_code(code))
    }
}

impl PromoValidator for PromoBook {
    fn validate(&self, code: &str, subtotal: i64) -> PromoOutcome {
        match self.get(code) {
            Some(promo) => promo.evaluate(subtotal, self.now),
            None => PromoOutcome::NotApplicable(PromoRejection::Unknown),
        }
    }
}

/// Canonical form of a promo code: trimmed and upper-cased.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
