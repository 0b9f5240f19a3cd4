//! GroupMessage entity - one chat turn inside a group session
//!
//! Table: chat_group_message

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::user::UserSummary;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_group_message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// "user" or "assistant"
    #[sea_orm(column_type = "String(Some(16))")]
    pub role: String,

    #[serde(rename = "groupSessionId")]
    pub group_session_id: i64,

    /// Author; None for assistant-authored messages, which have no human owner
    #[serde(rename = "userId")]
    #[sea_orm(nullable)]
    pub user_id: Option<i64>,

    #[serde(rename = "createdAt")]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Group message with the author's summary attached (None for the bot)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroupMessageResponse {
    pub id: i64,
    pub content: String,
    pub role: String,
    #[serde(rename = "groupSessionId")]
    pub group_session_id: i64,
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTimeUtc,
    pub user: Option<UserSummary>,
}

impl GroupMessageResponse {
    pub fn new(message: Model, user: Option<UserSummary>) -> Self {
        Self {
            id: message.id,
            content: message.content,
            role: message.role,
            group_session_id: message.group_session_id,
            user_id: message.user_id,
            created_at: message.created_at,
            user,
        }
    }
}
