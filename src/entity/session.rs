//! Session entity - a user's private chat
//!
//! Table: chat_session

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::message;

/// Name given to a session until the first user message renames it
pub const DEFAULT_SESSION_NAME: &str = "New Chat";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_session")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "String(Some(255))")]
    pub name: String,

    /// Owning user; all access is filtered by this column
    #[serde(rename = "userId")]
    pub user_id: i64,

    #[serde(rename = "createdAt")]
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Session with its messages, oldest first
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: i64,
    pub name: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "createdAt")]
    pub created_at: DateTimeUtc,
    pub messages: Vec<message::Model>,
}

impl SessionResponse {
    pub fn new(session: Model, messages: Vec<message::Model>) -> Self {
        Self {
            id: session.id,
            name: session.name,
            user_id: session.user_id,
            created_at: session.created_at,
            messages,
        }
    }
}
