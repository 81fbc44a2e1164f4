//! Tenants

use storefront::ids::Id;

/// Tenant
#[derive(Debug)]
pub struct Tenant;

/// Tenant UUID
pub type TenantUuid = Id<Tenant>;
