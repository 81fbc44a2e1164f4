//! Storefront application services: configuration, persistence and the
//! checkout and payout services built on the `storefront` crate.

pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod observability;

#[cfg(test)]
mod test;
