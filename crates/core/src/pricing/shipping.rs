//! Shipping

use crate::{policy::PricingPolicy, pricing::QuoteError};

/// Shipping cost for an option given the order subtotal.
///
/// The default option ships free once the subtotal reaches the policy threshold;
/// every other option always costs its table rate.
///
/// # Errors
///
/// Returns [`QuoteError::UnknownShippingOption`] if the option is not in the table.
pub fn shipping_cost(
    policy: &PricingPolicy,
    option: &str,
    subtotal: i64,
) -> Result<i64, QuoteError> {
    let rate = policy
        .shipping_rate(option)
        .ok_or_else(|| QuoteError::UnknownShippingOption(option.to_string()))?;

    if option == policy.default_shipping() && subtotal >= policy.free_shipping_threshold() {
        return Ok(0);
    }

    Ok(rate)
}
