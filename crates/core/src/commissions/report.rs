//! Commission reports

use jiff::Timestamp;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    catalog::ProductId,
    commissions::{CommissionError, CommissionResult, VendorId, split},
    money::{self, MoneyError},
    orders::{OrderId, PaymentStatus},
    rates::Rate,
};

/// Half-open reporting window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    start: Timestamp,
    end: Timestamp,
}

impl ReportPeriod {
    /// Creates a period.
    ///
    /// # Errors
    ///
    /// Returns [`CommissionError::EmptyPeriod`] unless `start` is before `end`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, CommissionError> {
        if start >= end {
            return Err(CommissionError::EmptyPeriod { start, end });
        }

        Ok(Self { start, end })
    }

    /// First instant in the period.
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// First instant after the period.
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Whether `at` falls in the period.
    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at < self.end
    }
}

/// A persisted order item joined to its order and owning vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    /// Order id
    pub order_id: OrderId,

    /// Vendor that owns the product; `None` for platform products.
    pub vendor_id: Option<VendorId>,

    /// Product id
    pub product_id: ProductId,

    /// Unit price charged
    pub unit_price: i64,

    /// Units sold
    pub quantity: u32,

    /// Payment status of the order
    pub payment_status: PaymentStatus,

    /// When the order was placed
    pub placed_at: Timestamp,
}

impl SaleLine {
    /// `unit_price * quantity`
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the total does not fit in an `i64`.
    pub fn item_total(&self) -> Result<i64, MoneyError> {
        money::line_total(self.unit_price, self.quantity)
    }
}

/// Totals for one vendor over the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSummary {
    /// Vendor id
    pub vendor_id: VendorId,

    /// Commission rate applied
    pub commission_rate: Rate,

    /// Sum of item totals
    pub total_sales: i64,

    /// Sum of commission amounts
    pub total_commission: i64,

    /// Sum of vendor amounts
    pub vendor_payouts: i64,

    /// Distinct orders containing the vendor's items
    pub order_count: usize,

    /// Order items counted
    pub item_count: usize,
}

/// A vendor left out of the report because it has no commission rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingCommissionConfig {
    /// Vendor id
    pub vendor_id: VendorId,

    /// Order items skipped
    pub skipped_items: usize,

    /// Sales skipped
    pub skipped_sales: i64,
}

/// Grand totals across every reported vendor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    /// Sum of vendor sales
    pub total_sales: i64,

    /// Sum of commissions
    pub total_commission: i64,

    /// Sum of vendor payouts
    pub vendor_payouts: i64,
}

/// Per-vendor commission and payout figures for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionReport {
    /// Reporting window
    pub period: ReportPeriod,

    /// Vendors ranked by total sales, highest first.
    pub vendors: Vec<VendorSummary>,

    /// Item-level splits behind the vendor totals.
    pub items: Vec<CommissionResult>,

    /// Vendors omitted for lack of a commission rate.
    pub omitted: Vec<MissingCommissionConfig>,

    /// Grand totals
    pub totals: ReportTotals,
}

#[derive(Default)]
struct VendorAccumulator {
    total_sales: i64,
    total_commission: i64,
    vendor_payouts: i64,
    orders: FxHashSet<OrderId>,
    item_count: usize,
}

impl CommissionReport {
    /// Aggregates sale lines into a report.
    ///
    /// Only lines whose order has settled payment (`paid` or `completed`) and was
    /// placed inside `period` are counted. Lines without a vendor are platform sales
    /// and are skipped. Vendors missing from `rates` are omitted and logged rather
    /// than failing the report.
    ///
    /// # Errors
    ///
    /// Returns [`CommissionError::Money`] if any sum overflows.
    pub fn build(
        sales: &[SaleLine],
        rates: &FxHashMap<VendorId, Rate>,
        period: ReportPeriod,
    ) -> Result<Self, CommissionError> {
        let mut vendors: FxHashMap<VendorId, VendorAccumulator> = FxHashMap::default();
        let mut missing: FxHashMap<VendorId, MissingCommissionConfig> = FxHashMap::default();
        let mut items = Vec::new();

        let qualifying = sales.iter().filter(|line| {
            line.payment_status.recognises_commission() && period.contains(line.placed_at)
        });

        for line in qualifying {
            let Some(vendor_id) = line.vendor_id else {
                continue;
            };

            let item_total = line.item_total()?;

            let Some(rate) = rates.get(&vendor_id).copied() else {
                let entry = missing
                    .entry(vendor_id)
                    .or_insert_with(|| MissingCommissionConfig {
                        vendor_id,
                        skipped_items: 0,
                        skipped_sales: 0,
                    });
                entry.skipped_items += 1;
                entry.skipped_sales = entry
                    .skipped_sales
                    .checked_add(item_total)
                    .ok_or(MoneyError::Overflow)?;

                continue;
            };

            let result = split(line.order_id, vendor_id, item_total, rate)?;

            let acc = vendors.entry(vendor_id).or_default();
            acc.total_sales = add(acc.total_sales, result.item_total)?;
            acc.total_commission = add(acc.total_commission, result.commission_amount)?;
            acc.vendor_payouts = add(acc.vendor_payouts, result.vendor_amount)?;
            acc.orders.insert(line.order_id);
            acc.item_count += 1;

            items.push(result);
        }

        let mut omitted: Vec<_> = missing.into_values().collect();
        omitted.sort_by_key(|entry| entry.vendor_id);

        for entry in &omitted {
            warn!(
                vendor_id = %entry.vendor_id,
                skipped_items = entry.skipped_items,
                skipped_sales = entry.skipped_sales,
                "vendor has no commission rate; omitted from report"
            );
        }

        let mut vendors: Vec<VendorSummary> = vendors
            .into_iter()
            .map(|(vendor_id, acc)| VendorSummary {
                vendor_id,
                commission_rate: rates.get(&vendor_id).copied().unwrap_or_default(),
                total_sales: acc.total_sales,
                total_commission: acc.total_commission,
                vendor_payouts: acc.vendor_payouts,
                order_count: acc.orders.len(),
                item_count: acc.item_count,
            })
            .collect();

        vendors.sort_by(|a, b| {
            b.total_sales
                .cmp(&a.total_sales)
                .then_with(|| a.vendor_id.cmp(&b.vendor_id))
        });

        let totals = vendors
            .iter()
            .try_fold(ReportTotals::default(), |totals, vendor| {
                Ok::<_, MoneyError>(ReportTotals {
                    total_sales: add(totals.total_sales, vendor.total_sales)?,
                    total_commission: add(totals.total_commission, vendor.total_commission)?,
                    vendor_payouts: add(totals.vendor_payouts, vendor.vendor_payouts)?,
                })
            })?;

        Ok(Self {
            period,
            vendors,
            items,
            omitted,
            totals,
        })
    }

    /// The `n` vendors with the highest sales.
    pub fn top_vendors(&self, n: usize) -> &[VendorSummary] {
        self.vendors.get(..n).unwrap_or(&self.vendors)
    }

    /// Totals for one vendor, if it was reported.
    pub fn vendor(&self, vendor_id: VendorId) -> Option<&VendorSummary> {
        self.vendors
            .iter()
            .find(|summary| summary.vendor_id == vendor_id)
    }
}

fn add(a: i64, b: i64) -> Result<i64, MoneyError> {
    a.checked_add(b).ok_or(MoneyError::Overflow)
}
