//! Promo Codes

pub(crate) mod repository;
mod store;

pub use store::*;
