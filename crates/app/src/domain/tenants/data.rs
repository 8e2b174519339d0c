//! Tenant Data

use roster::limits::PlanLimits;

use crate::domain::tenants::records::TenantUuid;

/// New Tenant Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewTenant {
    /// UUID to assign to the tenant row.
    pub uuid: TenantUuid,

    /// URL-safe business identifier, e.g. `acme-driving`.
    pub slug: String,

    /// Tenant name to persist.
    pub name: String,

    /// Plan caps.
    pub limits: PlanLimits,
}
