//! GroupMember entity - membership row gating all group access
//!
//! Table: chat_group_member

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role scoped to one group. Independent of the global user role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupRole {
    Admin,
    Member,
}

impl GroupRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupRole::Admin => "admin",
            GroupRole::Member => "member",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_group_member")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[serde(rename = "groupId")]
    pub group_id: i64,

    #[serde(rename = "userId")]
    pub user_id: i64,

    /// "admin" or "member", scoped to the group
    #[sea_orm(column_type = "String(Some(16))")]
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
