//! Storefront Domain Concerns

pub mod catalog;
pub mod checkout;
pub mod errors;
pub mod orders;
pub mod payouts;
pub mod promotions;
pub mod tenants;
