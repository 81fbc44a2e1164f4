//! Storefront
//!
//! Server-side money logic for a multi-vendor storefront: authoritative checkout
//! totals, reconciliation of stale client carts against the live catalog, and
//! vendor commission splitting for payout reports.
//!
//! Every amount is an `i64` count of minor currency units. Nothing in this crate
//! performs I/O; callers fetch catalog, promotion and order data first and hand
//! in snapshots.

pub mod carts;
pub mod catalog;
pub mod commissions;
pub mod ids;
pub mod money;
pub mod orders;
pub mod policy;
pub mod prelude;
pub mod pricing;
pub mod promotions;
pub mod rates;
