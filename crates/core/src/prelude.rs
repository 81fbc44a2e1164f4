//! Common imports for callers of the checkout, cart and payout logic.

pub use crate::{
    carts::{CartChange, CartItem, ChangeKind, Outcome, Reconciliation, reconcile},
    catalog::{Catalog, Product, ProductId, ProductStatus, Variant, VariantId},
    commissions::{
        CommissionError, CommissionReport, CommissionResult, ReportPeriod, SaleLine, VendorId,
        split,
    },
    money::MoneyError,
    orders::{Order, OrderDraft, OrderId, OrderItem, OrderStatus, PaymentStatus},
    policy::{PolicyError, PricingPolicy},
    pricing::{LineRequest, Quote, QuoteError, QuoteRequest, quote},
    promotions::{NoPromotions, PromoBook, PromoCode, PromoKind, PromoRejection, PromoValidator},
    rates::Rate,
};
