//! Tenant Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use roster::{TenantSettings, limits::PlanLimits};
use serde::Serialize;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// Tenant UUID
pub type TenantUuid = TypedUuid<TenantRecord>;

/// Tenant lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantStatus {
    Active,
    Inactive,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tenant status '{0}'")]
pub struct UnknownTenantStatus(pub String);

impl TenantStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for TenantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TenantStatus {
    type Err = UnknownTenantStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "deleted" => Ok(Self::Deleted),
            other => Err(UnknownTenantStatus(other.to_string())),
        }
    }
}

/// Tenant Record
#[derive(Debug, Clone, Serialize)]
pub struct TenantRecord {
    /// Unique tenant identifier.
    pub uuid: TenantUuid,

    /// URL-safe business identifier.
    pub slug: String,

    /// Human-readable tenant name.
    pub name: String,

    /// Lifecycle status.
    pub status: TenantStatus,

    /// Plan caps.
    pub limits: PlanLimits,

    /// Tenant creation timestamp.
    pub created_at: Timestamp,

    /// Last update timestamp.
    pub updated_at: Timestamp,

    /// Soft-delete timestamp when deleted.
    pub deleted_at: Option<Timestamp>,
}

/// A resolved tenant: its record plus typed configuration.
///
/// Resolved once per request and passed to every operation that needs limits or settings.
#[derive(Debug, Clone)]
pub struct Tenant {
    pub record: TenantRecord,
    pub settings: TenantSettings,
}

impl Tenant {
    pub const fn uuid(&self) -> TenantUuid {
        self.record.uuid
    }

    pub const fn limits(&self) -> &PlanLimits {
        &self.record.limits
    }

    /// Whether the plan allows one more of `limit` given `current_count`.
    ///
    /// Unknown limit names are allowed.
    pub fn check_limit(&self, limit: &str, current_count: u64) -> bool {
        self.record.limits.allows_named(limit, current_count)
    }
}
