//! Group entity - an admin-managed chat workspace
//!
//! Table: chat_group

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{group_session, user::UserSummary};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_group")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "String(Some(64))")]
    pub name: String,

    /// Global admin that created the group
    #[serde(rename = "createdById")]
    pub created_by_id: i64,

    #[serde(rename = "createdAt")]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// One roster entry in a group listing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupRosterEntry {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    /// Role inside this group, not the global one
    pub role: String,
}

impl GroupRosterEntry {
    pub fn new(user: UserSummary, role: String) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role,
        }
    }
}

/// Group as seen by one member: their role, the roster, and the most recent
/// session only
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupResponse {
    pub id: i64,
    pub name: String,
    /// The caller's membership role in this group
    pub role: String,
    pub members: Vec<GroupRosterEntry>,
    #[serde(rename = "lastSession")]
    pub last_session: Option<group_session::Model>,
}
