//! User entity
//!
//! Table: chat_user

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Global user role. Distinct from the per-group role on a membership row;
/// the two are checked independently at each entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl From<&str> for UserRole {
    fn from(value: &str) -> Self {
        Self::parse(value).unwrap_or(UserRole::User)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Login email (unique)
    #[sea_orm(column_type = "String(Some(255))", unique)]
    pub email: String,

    /// Password (bcrypt hash)
    #[sea_orm(column_type = "String(Some(128))")]
    #[serde(skip_serializing)]
    pub password: String,

    /// Display name
    #[sea_orm(column_type = "String(Some(64))", nullable)]
    pub name: Option<String>,

    /// Global role: "user" or "admin"
    #[sea_orm(column_type = "String(Some(16))")]
    pub role: String,

    /// Admin that created this account (self reference)
    #[serde(rename = "createdById")]
    #[sea_orm(nullable)]
    pub created_by_id: Option<i64>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Public user profile (no password hash)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub name: Option<String>,
}

impl From<Model> for UserProfile {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            name: model.name,
        }
    }
}

/// Short user summary embedded in group rosters and group messages
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
}

impl From<Model> for UserSummary {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("user"), Some(UserRole::User));
        assert_eq!(UserRole::parse("root"), None);
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_unknown_role_defaults_to_user() {
        assert_eq!(UserRole::from("superuser"), UserRole::User);
    }
}
