//! Company (tenant) and user entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::tenant::Role;

/// A tenant. Every other row hangs off a company and is deleted with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: EntityId,
    pub name: String,
    /// URL-safe unique handle
    pub slug: String,
    pub is_active: bool,
    pub created: DateTime<Utc>,
}

impl Entity for Company {
    const PREFIX: EntityPrefix = EntityPrefix::Cmpy;
    const NAME: &'static str = "company";

    fn id(&self) -> &EntityId {
        &self.id
    }

    /// A company owns itself
    fn company_id(&self) -> &EntityId {
        &self.id
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// A login. The password digest never leaves the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: EntityId,
    pub company_id: EntityId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created: DateTime<Utc>,
}

impl Entity for User {
    const PREFIX: EntityPrefix = EntityPrefix::User;
    const NAME: &'static str = "user";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn company_id(&self) -> &EntityId {
        &self.company_id
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

/// Row counts shown next to a company in the admin list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyCounts {
    pub users: u64,
    pub customers: u64,
    pub vehicles: u64,
    pub estimates: u64,
    pub work_orders: u64,
}

/// Company with its users and counts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    pub counts: CompanyCounts,
    pub users: Vec<User>,
}

/// New tenant plus its first admin
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub name: String,
    pub slug: String,
    /// Defaults to the company name
    #[serde(default)]
    pub admin_name: Option<String>,
    pub admin_email: String,
    pub admin_password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to ADMIN
    #[serde(default)]
    pub role: Option<Role>,
}

/// Whether a slug is acceptable: lowercase ASCII letters, digits and dashes
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("autofix"));
        assert!(is_valid_slug("taller-mecanico-2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Auto Fix"));
        assert!(!is_valid_slug("-edge"));
        assert!(!is_valid_slug("edge-"));
    }

    #[test]
    fn test_user_serializes_without_password() {
        let user = User {
            id: EntityId::new(EntityPrefix::User),
            company_id: EntityId::new(EntityPrefix::Cmpy),
            name: "Ana".to_string(),
            email: "ana@shop.test".to_string(),
            role: Role::Manager,
            is_active: true,
            created: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"role\":\"MANAGER\""));
        assert!(json.contains("\"companyId\""));
        assert!(!json.contains("password"));
    }
}
