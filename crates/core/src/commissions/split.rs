//! Commission splitting

use serde::Serialize;

use crate::{
    commissions::VendorId,
    money::MoneyError,
    orders::OrderId,
    rates::Rate,
};

/// How one order item's revenue divides between platform and vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionResult {
    /// Order the item belongs to
    pub order_id: OrderId,

    /// Vendor that sold the item
    pub vendor_id: VendorId,

    /// `price * quantity`
    pub item_total: i64,

    /// Vendor's commission rate
    pub commission_rate: Rate,

    /// Platform share
    pub commission_amount: i64,

    /// Vendor share
    pub vendor_amount: i64,
}

/// Splits an item total into commission and vendor payout.
///
/// The commission is rounded half up; the vendor amount is whatever remains, so the
/// two parts always add back up to `item_total`.
///
/// # Errors
///
/// Returns [`MoneyError::Overflow`] if the commission cannot be represented.
pub fn split(
    order_id: OrderId,
    vendor_id: VendorId,
    item_total: i64,
    commission_rate: Rate,
) -> Result<CommissionResult, MoneyError> {
    let commission_amount = commission_rate.apply(item_total)?;
    let vendor_amount = item_total
        .checked_sub(commission_amount)
        .ok_or(MoneyError::Overflow)?;

    Ok(CommissionResult {
        order_id,
        vendor_id,
        item_total,
        commission_rate,
        commission_amount,
        vendor_amount,
    })
}
