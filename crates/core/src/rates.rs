//! Rates
//!
//! Percentages applied to money: tax rates, commission rates and percent-off
//! promotions. A rate is held as an exact decimal fraction (`0.0825` for 8.25%).

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use thiserror::Error;

use crate::money::MoneyError;

/// Errors raised while building a [`Rate`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateError {
    /// The text is not a number or a `N%` percentage.
    #[error("invalid rate: {0}")]
    Invalid(String),

    /// The rate is negative or above 100%.
    #[error("rate {0}% is outside 0-100%")]
    OutOfRange(Decimal),
}

/// A percentage between 0% and 100% inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Rate(Decimal);

impl Rate {
    /// 0%
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Builds a rate from a fraction, where `1` is 100%.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::OutOfRange`] if the fraction is outside `0..=1`.
    pub fn from_fraction(fraction: Decimal) -> Result<Self, RateError> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            let points = fraction
                .checked_mul(Decimal::ONE_HUNDRED)
                .unwrap_or(if fraction.is_sign_negative() {
                    Decimal::MIN
                } else {
                    Decimal::MAX
                });

            return Err(RateError::OutOfRange(points));
        }

        Ok(Self(fraction.normalize()))
    }

    /// Builds a rate from percentage points, where `100` is 100%.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::OutOfRange`] if the points are outside `0..=100`.
    pub fn from_percent_points(points: Decimal) -> Result<Self, RateError> {
        if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
            return Err(RateError::OutOfRange(points));
        }

        Self::from_fraction(points / Decimal::ONE_HUNDRED)
    }

    /// The rate as a fraction.
    pub fn fraction(self) -> Decimal {
        self.0
    }

    /// The rate in percentage points.
    pub fn percent_points(self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    /// Applies the rate to an amount of minor units, rounding half up to the nearest
    /// minor unit. This is the only place a rate-derived amount is rounded.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the result cannot be represented.
    pub fn apply(self, minor: i64) -> Result<i64, MoneyError> {
        Decimal::from(minor)
            .checked_mul(self.0)
            .ok_or(MoneyError::Overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or(MoneyError::Overflow)
    }
}

impl Display for Rate {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}%", self.percent_points())
    }
}

impl FromStr for Rate {
    type Err = RateError;

    /// Parses `"8.25%"` as percentage points and `"0.0825"` as a fraction.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || RateError::Invalid(s.to_string());

        if let Some(points) = trimmed.strip_suffix('%') {
            let points = points.trim().parse::<Decimal>().map_err(|_err| invalid())?;

            Self::from_percent_points(points)
        } else {
            let fraction = trimmed.parse::<Decimal>().map_err(|_err| invalid())?;

            Self::from_fraction(fraction)
        }
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;

        text.parse().map_err(D::Error::custom)
    }
}
