//! Pricing
//!
//! The authoritative checkout calculator. Totals are recomputed from the catalog
//! snapshot and the pricing policy; anything the client sends about money is only
//! used to detect disagreement.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    catalog::{Catalog, ProductId, VariantId},
    commissions::VendorId,
    money::{self, MoneyError},
    policy::PricingPolicy,
    promotions::{PromoOutcome, PromoRejection, PromoValidator},
};

mod errors;
pub mod shipping;

pub use errors::QuoteError;

/// Largest difference, in minor units, tolerated between a client-asserted total
/// and the computed total.
pub const TOTAL_TOLERANCE: u64 = 1;

/// One requested line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    /// Product id
    pub product_id: ProductId,

    /// Variant id
    #[serde(default)]
    pub variant_id: Option<VariantId>,

    /// Units requested
    pub quantity: u32,
}

/// Everything needed to price an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Order lines
    pub lines: Vec<LineRequest>,

    /// Shipping option key
    pub shipping_option: String,

    /// Promo code entered by the customer
    #[serde(default)]
    pub promo_code: Option<String>,

    /// Total the client believes it will pay, in minor units
    #[serde(default)]
    pub asserted_total: Option<i64>,
}

/// A line priced from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    /// Product id
    pub product_id: ProductId,

    /// Variant id
    pub variant_id: Option<VariantId>,

    /// Vendor that owns the product
    pub vendor_id: Option<VendorId>,

    /// Product name
    pub name: String,

    /// Price of one unit
    pub unit_price: i64,

    /// Units
    pub quantity: u32,

    /// `unit_price * quantity`
    pub line_total: i64,
}

/// The server's monetary breakdown of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// ISO 4217 currency code
    pub currency: &'static str,

    /// Priced lines, in request order
    pub lines: Vec<PricedLine>,

    /// Sum of line totals
    pub subtotal: i64,

    /// Shipping option key
    pub shipping_option: String,

    /// Shipping cost
    pub shipping_cost: i64,

    /// Tax on subtotal plus shipping
    pub tax: i64,

    /// Promo discount
    pub discount: i64,

    /// `subtotal + shipping_cost + tax - discount`, never negative
    pub total: i64,

    /// Promo code that produced the discount
    pub promo_code: Option<String>,

    /// Why the entered promo code did not apply
    pub promo_rejection: Option<PromoRejection>,
}

/// Prices an order against the catalog.
///
/// This is a pure function of its inputs: calling it twice with the same catalog,
/// policy, promotions and request yields the same quote.
///
/// # Errors
///
/// - [`QuoteError::EmptyOrder`]: no lines were requested.
/// - [`QuoteError::InvalidQuantity`]: a line asked for zero units.
/// - [`QuoteError::ProductNotFound`]: a product is missing or not for sale.
/// - [`QuoteError::VariantNotFound`]: a requested variant is missing.
/// - [`QuoteError::InsufficientStock`]: requested units exceed stock.
/// - [`QuoteError::UnknownShippingOption`]: the shipping option is not configured.
/// - [`QuoteError::AmountMismatch`]: the client's total is off by more than one minor unit.
/// - [`QuoteError::Money`]: arithmetic overflowed.
pub fn quote(
    catalog: &Catalog,
    policy: &PricingPolicy,
    promotions: &impl PromoValidator,
    request: &QuoteRequest,
) -> Result<Quote, QuoteError> {
    if request.lines.is_empty() {
        return Err(QuoteError::EmptyOrder);
    }

    let lines = price_lines(catalog, &request.lines)?;
    let subtotal = money::checked_sum(lines.iter().map(|line| line.line_total))?;

    let shipping_cost = shipping::shipping_cost(policy, &request.shipping_option, subtotal)?;

    let taxable = subtotal
        .checked_add(shipping_cost)
        .ok_or(MoneyError::Overflow)?;
    let tax = policy.tax_rate().apply(taxable)?;

    let (discount, promo_code, promo_rejection) = match request.promo_code.as_deref() {
        Some(code) => match promotions.validate(code, subtotal) {
            PromoOutcome::Discount(amount) => {
                (amount.clamp(0, subtotal), Some(code.to_string()), None)
            }
            PromoOutcome::NotApplicable(rejection) => {
                debug!(code, %rejection, "promo code not applied");

                (0, None, Some(rejection))
            }
        },
        None => (0, None, None),
    };

    let total = taxable
        .checked_add(tax)
        .and_then(|gross| gross.checked_sub(discount))
        .ok_or(MoneyError::Overflow)?
        .max(0);

    if let Some(asserted) = request.asserted_total {
        if asserted.abs_diff(total) > TOTAL_TOLERANCE {
            return Err(QuoteError::AmountMismatch {
                asserted,
                computed: total,
            });
        }
    }

    Ok(Quote {
        currency: policy.currency().iso_alpha_code,
        lines,
        subtotal,
        shipping_option: request.shipping_option.clone(),
        shipping_cost,
        tax,
        discount,
        total,
        promo_code,
        promo_rejection,
    })
}

fn price_lines(
    catalog: &Catalog,
    requests: &[LineRequest],
) -> Result<Vec<PricedLine>, QuoteError> {
    let mut demand: FxHashMap<(ProductId, Option<VariantId>), u32> = FxHashMap::default();

    requests
        .iter()
        .enumerate()
        .map(|(index, request)| {
            if request.quantity == 0 {
                return Err(QuoteError::InvalidQuantity { index });
            }

            let product = catalog
                .available(request.product_id)
                .ok_or(QuoteError::ProductNotFound(request.product_id))?;

            let variant = request
                .variant_id
                .map(|variant_id| {
                    product
                        .variant(variant_id)
                        .ok_or(QuoteError::VariantNotFound {
                            product: product.id,
                            variant: variant_id,
                        })
                })
                .transpose()?;

            let requested = demand
                .entry((product.id, request.variant_id))
                .or_default();
            *requested = requested.saturating_add(request.quantity);

            let available = product.available_stock(variant);

            if *requested > available {
                return Err(QuoteError::InsufficientStock {
                    product: product.id,
                    variant: request.variant_id,
                    requested: *requested,
                    available,
                });
            }

            let unit_price = product.unit_price(variant);

            Ok(PricedLine {
                product_id: product.id,
                variant_id: request.variant_id,
                vendor_id: product.vendor_id,
                name: product.name.clone(),
                unit_price,
                quantity: request.quantity,
                line_total: money::line_total(unit_price, request.quantity)?,
            })
        })
        .collect()
}
