//! Tenant resolution - who is asking, and which company's rows they may touch
//!
//! Every core entry point takes a [`RequestContext`]: the caller's
//! [`Identity`] plus an optional company override. Two resolvers turn that into
//! a tenant, and they intentionally disagree for a super admin without an
//! override:
//!
//! - [`resolve_company_id`] answers "which company does a new row belong to?"
//!   and falls back to the super admin's own (system) company.
//! - [`resolve_company_filter`] answers "which rows may this request see?" and
//!   falls back to [`CompanyFilter::All`], the global view.
//!
//! Creates use the first; gets, updates, deletes and lists use the second.

use serde::{Deserialize, Serialize};

use crate::core::error::ShopError;
use crate::core::identity::EntityId;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[derive(Default)]
pub enum Role {
    SuperAdmin,
    #[default]
    Admin,
    Manager,
    Tech,
}

impl Role {
    fn rank(self) -> u8 {
        match self {
            Role::SuperAdmin => 3,
            Role::Admin => 2,
            Role::Manager => 1,
            Role::Tech => 0,
        }
    }

    /// Whether a holder of `self` may perform an operation requiring `required`
    pub fn satisfies(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    pub fn is_super_admin(self) -> bool {
        self == Role::SuperAdmin
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Tech => "TECH",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "TECH" => Ok(Role::Tech),
            _ => Err(format!(
                "Invalid role: {}. Use SUPER_ADMIN, ADMIN, MANAGER, or TECH",
                s
            )),
        }
    }
}

/// Authenticated caller, bound to the company the user belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: EntityId,
    pub company_id: EntityId,
    pub role: Role,
}

/// Rows visible to a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyFilter {
    /// Only rows of this company
    Company(EntityId),
    /// Every company (super admin global view)
    All,
}

impl CompanyFilter {
    pub fn company(&self) -> Option<&EntityId> {
        match self {
            CompanyFilter::Company(id) => Some(id),
            CompanyFilter::All => None,
        }
    }

    pub fn allows(&self, company_id: &EntityId) -> bool {
        match self {
            CompanyFilter::Company(id) => id == company_id,
            CompanyFilter::All => true,
        }
    }
}

/// Identity plus the optional tenant override a super admin may supply
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub identity: Identity,
    pub company_override: Option<EntityId>,
}

impl RequestContext {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            company_override: None,
        }
    }

    pub fn with_override(mut self, company_id: Option<EntityId>) -> Self {
        self.company_override = company_id;
        self
    }

    /// Company that new rows created by this request belong to
    pub fn company_id(&self) -> EntityId {
        resolve_company_id(&self.identity, self.company_override.as_ref())
    }

    /// Row filter for reads, updates and deletes
    pub fn company_filter(&self) -> CompanyFilter {
        resolve_company_filter(&self.identity, self.company_override.as_ref())
    }

    pub fn require_role(&self, required: Role) -> Result<(), ShopError> {
        require_role(&self.identity, required)
    }
}

/// Effective company for a request; overrides only count for super admins
pub fn resolve_company_id(identity: &Identity, company_override: Option<&EntityId>) -> EntityId {
    match company_override {
        Some(id) if identity.role.is_super_admin() => id.clone(),
        _ => identity.company_id.clone(),
    }
}

/// Effective row filter; a super admin without an override sees every company
pub fn resolve_company_filter(
    identity: &Identity,
    company_override: Option<&EntityId>,
) -> CompanyFilter {
    if !identity.role.is_super_admin() {
        return CompanyFilter::Company(identity.company_id.clone());
    }
    match company_override {
        Some(id) => CompanyFilter::Company(id.clone()),
        None => CompanyFilter::All,
    }
}

pub fn require_role(identity: &Identity, required: Role) -> Result<(), ShopError> {
    if identity.role.satisfies(required) {
        Ok(())
    } else {
        Err(ShopError::Forbidden { required })
    }
}
