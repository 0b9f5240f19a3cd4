//! GroupSession entity - a shared chat inside a group
//!
//! Table: chat_group_session

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::group_message::GroupMessageResponse;

/// Name given to a group session until renamed
pub const DEFAULT_GROUP_SESSION_NAME: &str = "New Group Chat";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_group_session")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "String(Some(255))")]
    pub name: String,

    #[serde(rename = "groupId")]
    pub group_id: i64,

    #[serde(rename = "createdAt")]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Group session with its messages (author summaries attached), oldest first
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupSessionResponse {
    pub id: i64,
    pub name: String,
    #[serde(rename = "groupId")]
    pub group_id: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTimeUtc,
    pub messages: Vec<GroupMessageResponse>,
}

impl GroupSessionResponse {
    pub fn new(session: Model, messages: Vec<GroupMessageResponse>) -> Self {
        Self {
            id: session.id,
            name: session.name,
            group_id: session.group_id,
            created_at: session.created_at,
            messages,
        }
    }
}
