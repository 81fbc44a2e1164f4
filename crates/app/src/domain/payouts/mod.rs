//! Payouts

pub(crate) mod repository;
mod service;
mod store;

pub use service::*;
pub use store::*;
