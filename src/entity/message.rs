//! Message entity - one chat turn inside a private session
//!
//! Table: chat_message

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Author role of a stored message. Only these two values are accepted; the
/// transcript models no system or tool turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    /// "user" or "assistant"
    #[sea_orm(column_type = "String(Some(16))")]
    pub role: String,

    #[serde(rename = "sessionId")]
    pub session_id: i64,

    /// Author
    #[serde(rename = "userId")]
    pub user_id: i64,

    #[serde(rename = "createdAt")]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
