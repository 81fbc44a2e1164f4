//! Tenant Config

use clap::Args;
use uuid::Uuid;

use crate::domain::tenants::TenantUuid;

/// Tenant selection.
#[derive(Debug, Clone, Args)]
pub struct TenantConfig {
    /// Tenant whose data the command reads and writes
    #[arg(long, env = "TENANT_UUID")]
    pub tenant_uuid: Uuid,
}

impl TenantConfig {
    /// The configured tenant.
    pub fn tenant(&self) -> TenantUuid {
        TenantUuid::from_uuid(self.tenant_uuid)
    }
}
