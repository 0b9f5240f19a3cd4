//! Chat turn orchestration
//!
//! One user turn is a strictly sequential chain: persist the user message,
//! invoke the LLM gateway, persist the reply, re-fetch for the caller. A
//! failed upstream call never fails the turn; the error text is written into
//! the transcript as an assistant message instead.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;

use crate::entity::message::MessageRole;
use crate::entity::session::DEFAULT_SESSION_NAME;
use crate::entity::{group_message, message, session};
use crate::error::{AppResult, OptionExt};
use crate::llm::{extract_reply, LlmGateway, TurnPayload};

/// Longest session name derived from a first message before truncation
const SESSION_NAME_LIMIT: usize = 30;

/// Derive a session name from the first user message: the content verbatim up
/// to 30 characters, else the first 30 characters plus an ellipsis
pub fn truncate_session_name(content: &str) -> String {
    if content.chars().count() > SESSION_NAME_LIMIT {
        let prefix: String = content.chars().take(SESSION_NAME_LIMIT).collect();
        format!("{}...", prefix)
    } else {
        content.to_string()
    }
}

/// Resolve a session for its owner. A session owned by someone else yields
/// the same NotFound as a missing one.
pub async fn find_owned_session(
    db: &DatabaseConnection,
    user_id: i64,
    session_id: i64,
) -> AppResult<session::Model> {
    session::Entity::find()
        .filter(session::Column::Id.eq(session_id))
        .filter(session::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_not_found("Session not found")
}

/// Messages of one session, oldest first (id as tie-break)
pub async fn session_messages(
    db: &DatabaseConnection,
    session_id: i64,
) -> AppResult<Vec<message::Model>> {
    let messages = message::Entity::find()
        .filter(message::Column::SessionId.eq(session_id))
        .order_by_asc(message::Column::CreatedAt)
        .order_by_asc(message::Column::Id)
        .all(db)
        .await?;
    Ok(messages)
}

/// Append a message to a session. The first user message of a session still
/// carrying the default name renames it; the rename can fire only once
/// because the name check fails afterwards.
pub async fn store_session_message(
    db: &DatabaseConnection,
    session: &session::Model,
    author_id: i64,
    content: String,
    role: MessageRole,
) -> AppResult<message::Model> {
    let stored = message::ActiveModel {
        content: Set(content.clone()),
        role: Set(role.as_str().to_string()),
        session_id: Set(session.id),
        user_id: Set(author_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    if role == MessageRole::User && session.name == DEFAULT_SESSION_NAME {
        let mut active: session::ActiveModel = session.clone().into();
        active.name = Set(truncate_session_name(&content));
        active.update(db).await?;
    }

    Ok(stored)
}

/// Append a message to a group session. `author_id` is None for the bot.
pub async fn store_group_message(
    db: &DatabaseConnection,
    group_session_id: i64,
    author_id: Option<i64>,
    content: String,
    role: MessageRole,
) -> AppResult<group_message::Model> {
    let stored = group_message::ActiveModel {
        content: Set(content),
        role: Set(role.as_str().to_string()),
        group_session_id: Set(group_session_id),
        user_id: Set(author_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(stored)
}

/// Ask the gateway for a reply. Failures become transcript text, not errors.
async fn reply_or_error(gateway: &Arc<dyn LlmGateway>, payload: &TurnPayload) -> String {
    match gateway.process(payload).await {
        Ok(data) => extract_reply(&data),
        Err(err) => format!("Error: {}", err),
    }
}

/// One individual-mode turn: store the user message, always ask the bot,
/// store the reply, and return the re-fetched session so the caller picks up
/// the server-side rename.
pub async fn run_session_turn(
    db: &DatabaseConnection,
    gateway: &Arc<dyn LlmGateway>,
    user_id: i64,
    session_id: i64,
    content: String,
) -> AppResult<session::SessionResponse> {
    let session = find_owned_session(db, user_id, session_id).await?;

    store_session_message(db, &session, user_id, content.clone(), MessageRole::User).await?;

    let payload = TurnPayload::chat(content, format!("session_{}", session.id));
    let reply = reply_or_error(gateway, &payload).await;
    store_session_message(db, &session, user_id, reply, MessageRole::Assistant).await?;

    let reconciled = find_owned_session(db, user_id, session_id).await?;
    let messages = session_messages(db, session_id).await?;
    Ok(session::SessionResponse::new(reconciled, messages))
}

/// One group-mode turn: the user message is always stored; the bot is asked
/// only when requested, and its reply is stored without a human owner.
pub async fn run_group_turn(
    db: &DatabaseConnection,
    gateway: &Arc<dyn LlmGateway>,
    user_id: i64,
    group_session_id: i64,
    content: String,
    role: MessageRole,
    ask_bot: bool,
) -> AppResult<group_message::Model> {
    let stored =
        store_group_message(db, group_session_id, Some(user_id), content.clone(), role).await?;

    if ask_bot {
        let payload = TurnPayload::chat(content, format!("group_{}", group_session_id));
        let reply = reply_or_error(gateway, &payload).await;
        store_group_message(db, group_session_id, None, reply, MessageRole::Assistant).await?;
    }

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_memory;

    #[test]
    fn test_truncate_short_content_verbatim() {
        assert_eq!(truncate_session_name("hello"), "hello");
    }

    #[test]
    fn test_truncate_exactly_thirty_chars() {
        let content = "a".repeat(30);
        assert_eq!(truncate_session_name(&content), content);
    }

    #[test]
    fn test_truncate_long_content_gets_ellipsis() {
        let content = "what is the weather like in Berlin today?";
        let name = truncate_session_name(content);
        assert_eq!(name, format!("{}...", &content[..30]));
        assert_eq!(name.chars().count(), 33);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let content = "ä".repeat(31);
        let name = truncate_session_name(&content);
        assert_eq!(name, format!("{}...", "ä".repeat(30)));
    }

    async fn seed_session(db: &DatabaseConnection) -> session::Model {
        let user = crate::entity::user::ActiveModel {
            email: Set("u@example.com".to_string()),
            password: Set("hash".to_string()),
            name: Set(None),
            role: Set("user".to_string()),
            created_by_id: Set(None),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        session::ActiveModel {
            name: Set(DEFAULT_SESSION_NAME.to_string()),
            user_id: Set(user.id),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_first_user_message_renames_session_once() {
        let db = connect_memory().await.unwrap();
        let session = seed_session(&db).await;

        store_session_message(
            &db,
            &session,
            session.user_id,
            "first question".to_string(),
            MessageRole::User,
        )
        .await
        .unwrap();

        let renamed = session::Entity::find_by_id(session.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "first question");

        // A later user message must not rename again
        store_session_message(
            &db,
            &renamed,
            session.user_id,
            "second question".to_string(),
            MessageRole::User,
        )
        .await
        .unwrap();

        let unchanged = session::Entity::find_by_id(session.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.name, "first question");
    }

    #[tokio::test]
    async fn test_assistant_message_never_renames() {
        let db = connect_memory().await.unwrap();
        let session = seed_session(&db).await;

        store_session_message(
            &db,
            &session,
            session.user_id,
            "a reply".to_string(),
            MessageRole::Assistant,
        )
        .await
        .unwrap();

        let unchanged = session::Entity::find_by_id(session.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.name, DEFAULT_SESSION_NAME);
    }

    #[tokio::test]
    async fn test_cross_user_session_is_not_found() {
        let db = connect_memory().await.unwrap();
        let session = seed_session(&db).await;

        let foreign = find_owned_session(&db, session.user_id + 1, session.id).await;
        let missing = find_owned_session(&db, session.user_id, session.id + 99).await;
        assert!(matches!(
            foreign,
            Err(crate::error::AppError::NotFound(_))
        ));
        assert!(matches!(
            missing,
            Err(crate::error::AppError::NotFound(_))
        ));
    }
}
