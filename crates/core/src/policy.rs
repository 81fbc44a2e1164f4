//! Pricing policy
//!
//! Store-wide checkout settings: currency, tax rate, the static shipping table and
//! the free-shipping threshold. Usually loaded from a YAML file.

use std::{collections::BTreeMap, fs, path::Path};

use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    money::{self, MoneyError},
    rates::Rate,
};

/// Policy loading errors
#[derive(Debug, Error)]
pub enum PolicyError {
    /// IO error reading the policy file
    #[error("failed to read pricing policy: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse pricing policy: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Bad currency or amount
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The default shipping option is not in the shipping table.
    #[error("default shipping option {0:?} has no rate")]
    MissingDefaultShipping(String),

    /// A configured amount is below zero.
    #[error("{0} must not be negative")]
    NegativeAmount(String),
}

/// Checkout settings shared by every quote.
#[derive(Debug, Clone)]
pub struct PricingPolicy {
    currency: &'static Currency,
    tax_rate: Rate,
    free_shipping_threshold: i64,
    default_shipping: String,
    shipping: BTreeMap<String, i64>,
}

impl PricingPolicy {
    /// Creates a policy with a single, default shipping option.
    pub fn new(
        currency: &'static Currency,
        tax_rate: Rate,
        free_shipping_threshold: i64,
        default_shipping: impl Into<String>,
        default_shipping_cost: i64,
    ) -> Self {
        let default_shipping = default_shipping.into();
        let shipping = BTreeMap::from([(default_shipping.clone(), default_shipping_cost)]);

        Self {
            currency,
            tax_rate,
            free_shipping_threshold,
            default_shipping,
            shipping,
        }
    }

    /// Adds a shipping option to the table.
    #[must_use]
    pub fn with_shipping_option(mut self, key: impl Into<String>, cost: i64) -> Self {
        self.shipping.insert(key.into(), cost);
        self
    }

    /// Loads a policy from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parses a policy from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, names an unknown currency, holds
    /// a negative or over-precise amount, or the default shipping option is missing
    /// from the shipping table.
    pub fn from_yaml(yaml: &str) -> Result<Self, PolicyError> {
        let file: PolicyFile = serde_norway::from_str(yaml)?;
        let currency = money::currency(&file.currency)?;

        let free_shipping_threshold = file
            .free_shipping_threshold
            .to_minor(currency, "free_shipping_threshold")?;

        let shipping = file
            .shipping
            .into_iter()
            .map(|(key, amount)| {
                let cost = amount.to_minor(currency, &format!("shipping rate {key:?}"))?;

                Ok((key, cost))
            })
            .collect::<Result<BTreeMap<_, _>, PolicyError>>()?;

        if !shipping.contains_key(&file.default_shipping) {
            return Err(PolicyError::MissingDefaultShipping(file.default_shipping));
        }

        Ok(Self {
            currency,
            tax_rate: file.tax_rate,
            free_shipping_threshold,
            default_shipping: file.default_shipping,
            shipping,
        })
    }

    /// Currency every amount is expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Tax rate applied to subtotal plus shipping.
    pub fn tax_rate(&self) -> Rate {
        self.tax_rate
    }

    /// Minimum subtotal for free default shipping.
    pub fn free_shipping_threshold(&self) -> i64 {
        self.free_shipping_threshold
    }

    /// Key of the shipping option that free shipping applies to.
    pub fn default_shipping(&self) -> &str {
        &self.default_shipping
    }

    /// Fixed cost of a shipping option, if the option exists.
    pub fn shipping_rate(&self, key: &str) -> Option<i64> {
        self.shipping.get(key).copied()
    }

    /// All shipping options and their fixed costs.
    pub fn shipping_options(&self) -> impl Iterator<Item = (&str, i64)> {
        self.shipping.iter().map(|(key, cost)| (key.as_str(), *cost))
    }
}

#[derive(Debug, Deserialize)]
struct PolicyFile {
    currency: String,
    tax_rate: Rate,
    free_shipping_threshold: Amount,
    default_shipping: String,
    shipping: BTreeMap<String, Amount>,
}

/// Either minor units (`2500`) or a major-unit string (`"25.00"`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Amount {
    Minor(i64),
    Major(String),
}

impl Amount {
    fn to_minor(&self, currency: &Currency, field: &str) -> Result<i64, PolicyError> {
        let minor = match self {
            Amount::Minor(minor) => *minor,
            Amount::Major(text) => money::parse_major(text, currency)?,
        };

        if minor < 0 {
            return Err(PolicyError::NegativeAmount(field.to_string()));
        }

        Ok(minor)
    }
}
