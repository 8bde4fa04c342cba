//! Account roles and the role constraints attached to routes.
//!
//! Role strings are normalised once, at the profile store boundary, so the
//! rest of the shell never branches on the legacy `handyman` spelling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Landing path for anonymous visitors.
pub const ANONYMOUS_HOME: &str = "/";

/// Closed set of account roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    #[serde(alias = "handyman")]
    ServiceProvider,
    Admin,
    SuperAdmin,
}

/// Error returned when a role string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRoleError(pub String);

impl Role {
    /// Canonical wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::ServiceProvider => "service_provider",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Whether the role belongs to the administrative tier.
    pub fn is_admin_tier(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Dashboard path a user of this role lands on.
    ///
    /// # Examples
    /// ```
    /// use marketplace_shell::domain::Role;
    ///
    /// assert_eq!(Role::SuperAdmin.home_path(), "/admin/dashboard");
    /// ```
    pub fn home_path(self) -> &'static str {
        match self {
            Self::Customer => "/customer/dashboard",
            Self::ServiceProvider => "/service-provider/dashboard",
            Self::Admin | Self::SuperAdmin => "/admin/dashboard",
        }
    }

    /// Roles a visitor may pick on the sign-up form.
    pub fn is_self_registrable(self) -> bool {
        matches!(self, Self::Customer | Self::ServiceProvider)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "customer" => Ok(Self::Customer),
            // Legacy spelling kept by older profile rows.
            "service_provider" | "handyman" => Ok(Self::ServiceProvider),
            "admin" => Ok(Self::Admin),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(UnknownRoleError(other.to_owned())),
        }
    }
}

/// Role constraint attached to a gated route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleRequirement {
    /// The identity's role must equal this role.
    Exactly(Role),
    /// The identity must be `admin` or `super_admin`.
    AdminTier,
}

impl RoleRequirement {
    /// Requirement used when a route names a single role.
    ///
    /// Naming `admin` widens to the whole admin tier, since `super_admin`
    /// holds every `admin` privilege. Naming `super_admin` does not: a plain
    /// `admin` never satisfies it.
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Self::AdminTier,
            other => Self::Exactly(other),
        }
    }

    /// Whether `role` satisfies the requirement.
    pub fn admits(self, role: Role) -> bool {
        match self {
            Self::Exactly(required) => required == role,
            Self::AdminTier => role.is_admin_tier(),
        }
    }
}
