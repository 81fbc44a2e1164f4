//! Orders

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::{ProductId, VariantId},
    commissions::VendorId,
    ids::Id,
    money::MoneyError,
    pricing::{PricedLine, Quote},
};

/// Order Id
pub type OrderId = Id<Order>;

/// Errors related to orders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The stored total disagrees with its components.
    #[error("order total {recorded} does not balance; components add up to {expected}")]
    TotalsOutOfBalance {
        /// `subtotal + shipping_cost + tax - discount`
        expected: i64,
        /// Total on the order
        recorded: i64,
    },

    /// An order or payment status string was not recognised.
    #[error("unknown status: {0}")]
    UnknownStatus(String),

    /// Money arithmetic overflowed.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet processed
    #[default]
    Pending,
    /// Being prepared
    Processing,
    /// Handed to the carrier
    Shipped,
    /// Received by the customer
    Delivered,
    /// Cancelled before shipping
    Cancelled,
    /// Money returned
    Refunded,
}

impl OrderStatus {
    /// Stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

/// Payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payment
    #[default]
    Pending,
    /// Payment captured
    Paid,
    /// Payment settled
    Completed,
    /// Payment failed
    Failed,
    /// Payment returned to the customer
    Refunded,
}

impl PaymentStatus {
    /// Whether sales under this status earn commission.
    pub fn recognises_commission(self) -> bool {
        matches!(self, Self::Paid | Self::Completed)
    }

    /// Stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(OrderError::UnknownStatus(other.to_string())),
        }
    }
}

/// A line of a placed order. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product id
    pub product_id: ProductId,

    /// Variant id
    pub variant_id: Option<VariantId>,

    /// Owning vendor at the time of sale
    pub vendor_id: Option<VendorId>,

    /// Product name at the time of sale
    pub name: String,

    /// Unit price charged
    pub unit_price: i64,

    /// Units
    pub quantity: u32,

    /// `unit_price * quantity`
    pub line_total: i64,
}

impl From<&PricedLine> for OrderItem {
    fn from(line: &PricedLine) -> Self {
        Self {
            product_id: line.product_id,
            variant_id: line.variant_id,
            vendor_id: line.vendor_id,
            name: line.name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            line_total: line.line_total,
        }
    }
}

/// Money components of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    /// Sum of line totals
    pub subtotal: i64,

    /// Shipping cost
    pub shipping_cost: i64,

    /// Tax
    pub tax: i64,

    /// Discount
    pub discount: i64,

    /// Amount charged
    pub total: i64,
}

impl OrderTotals {
    /// Checks `total == max(subtotal + shipping_cost + tax - discount, 0)`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::TotalsOutOfBalance`] when the equation fails.
    pub fn verify(&self) -> Result<(), OrderError> {
        let expected = self
            .subtotal
            .checked_add(self.shipping_cost)
            .and_then(|sum| sum.checked_add(self.tax))
            .and_then(|sum| sum.checked_sub(self.discount))
            .ok_or(MoneyError::Overflow)?
            .max(0);

        if expected != self.total {
            return Err(OrderError::TotalsOutOfBalance {
                expected,
                recorded: self.total,
            });
        }

        Ok(())
    }
}

/// An order ready to be persisted, built only from a server-computed quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// ISO 4217 currency code
    pub currency: &'static str,

    /// Lines
    pub items: Vec<OrderItem>,

    /// Shipping option key
    pub shipping_option: String,

    /// Promo code that was redeemed
    pub promo_code: Option<String>,

    /// Money components
    #[serde(flatten)]
    pub totals: OrderTotals,
}

impl OrderDraft {
    /// Builds a draft from a quote. A promo code that was rejected is not carried.
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            currency: quote.currency,
            items: quote.lines.iter().map(OrderItem::from).collect(),
            shipping_option: quote.shipping_option.clone(),
            promo_code: quote.promo_code.clone(),
            totals: OrderTotals {
                subtotal: quote.subtotal,
                shipping_cost: quote.shipping_cost,
                tax: quote.tax,
                discount: quote.discount,
                total: quote.total,
            },
        }
    }

    /// Assigns identity and initial statuses.
    pub fn place(self, id: OrderId, placed_at: Timestamp) -> Order {
        Order {
            id,
            currency: self.currency.to_string(),
            items: self.items,
            shipping_option: self.shipping_option,
            promo_code: self.promo_code,
            totals: self.totals,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            placed_at,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order id
    pub id: OrderId,

    /// ISO 4217 currency code
    pub currency: String,

    /// Lines
    pub items: Vec<OrderItem>,

    /// Shipping option key
    pub shipping_option: String,

    /// Promo code that was redeemed
    pub promo_code: Option<String>,

    /// Money components
    #[serde(flatten)]
    pub totals: OrderTotals,

    /// Fulfilment status
    pub status: OrderStatus,

    /// Payment status
    pub payment_status: PaymentStatus,

    /// When the order was placed
    pub placed_at: Timestamp,
}

impl Order {
    /// Checks the order's total equation.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::TotalsOutOfBalance`] when the stored total disagrees
    /// with its components.
    pub fn verify_totals(&self) -> Result<(), OrderError> {
        self.totals.verify()
    }
}
