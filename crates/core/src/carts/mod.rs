//! Carts
//!
//! Reconciles a possibly stale client cart against the live catalog before
//! checkout, so the customer sees a diff instead of a silently rewritten cart.

pub mod items;
mod reconcile;

pub use items::{CartItem, CartItemError, InvalidCartItem};
pub use reconcile::*;
