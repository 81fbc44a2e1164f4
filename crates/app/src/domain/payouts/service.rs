//! Payouts service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use storefront::commissions::{CommissionError, CommissionReport, ReportPeriod};
use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::{errors::StoreError, payouts::SalesStore, tenants::TenantUuid};

/// Payouts service errors.
#[derive(Debug, Error)]
pub enum PayoutsServiceError {
    /// The report could not be computed.
    #[error(transparent)]
    Commission(#[from] CommissionError),

    /// Sales or rates could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Vendor commission reporting.
#[async_trait]
pub trait PayoutsService: Send + Sync {
    /// Builds the commission report for a period.
    async fn commission_report(
        &self,
        tenant: TenantUuid,
        period: ReportPeriod,
    ) -> Result<CommissionReport, PayoutsServiceError>;
}

/// Payouts service over a sales store.
#[derive(Clone)]
pub struct StorePayoutsService {
    sales: Arc<dyn SalesStore>,
}

impl fmt::Debug for StorePayoutsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorePayoutsService").finish_non_exhaustive()
    }
}

impl StorePayoutsService {
    /// Creates the service.
    #[must_use]
    pub fn new(sales: Arc<dyn SalesStore>) -> Self {
        Self { sales }
    }
}

#[async_trait]
impl PayoutsService for StorePayoutsService {
    #[instrument(skip(self))]
    async fn commission_report(
        &self,
        tenant: TenantUuid,
        period: ReportPeriod,
    ) -> Result<CommissionReport, PayoutsServiceError> {
        let rates = self.sales.commission_rates(tenant).await?;
        let lines = self.sales.sale_lines(tenant, period).await?;

        let report = CommissionReport::build(&lines, &rates, period)?;

        info!(
            vendors = report.vendors.len(),
            omitted = report.omitted.len(),
            total_sales = report.totals.total_sales,
            "commission report built"
        );

        Ok(report)
    }
}
