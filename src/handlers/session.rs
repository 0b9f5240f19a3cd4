//! Session handlers
//!
//! CRUD over a user's private chat sessions and their messages. Every query
//! filters by the owning user, so foreign session ids are indistinguishable
//! from nonexistent ones.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chat;
use crate::entity::message::{self, MessageRole};
use crate::entity::session::{self, SessionResponse, DEFAULT_SESSION_NAME};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

/// Create session request
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub name: Option<String>,
}

/// Add message request
#[derive(Debug, Deserialize)]
pub struct AddMessageRequest {
    pub content: String,
    pub role: String,
}

/// Rename session request
#[derive(Debug, Deserialize)]
pub struct RenameSessionRequest {
    pub name: String,
}

/// Orchestrated chat turn request
#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    pub content: String,
}

/// GET /api/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<SessionResponse>>> {
    let sessions = session::Entity::find()
        .filter(session::Column::UserId.eq(current_user.id))
        .order_by_desc(session::Column::CreatedAt)
        .order_by_desc(session::Column::Id)
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(sessions.len());
    for s in sessions {
        let messages = chat::session_messages(&state.db, s.id).await?;
        responses.push(SessionResponse::new(s, messages));
    }

    Ok(Json(responses))
}

/// POST /api/sessions
pub async fn create_session(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateSessionRequest>,
) -> AppResult<Json<SessionResponse>> {
    let name = match req.name {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_SESSION_NAME.to_string(),
    };

    let created = session::ActiveModel {
        name: Set(name),
        user_id: Set(current_user.id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(SessionResponse::new(created, Vec::new())))
}

/// GET /api/sessions/:session_id
pub async fn get_session(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
) -> AppResult<Json<SessionResponse>> {
    let session = chat::find_owned_session(&state.db, current_user.id, session_id).await?;
    let messages = chat::session_messages(&state.db, session_id).await?;

    Ok(Json(SessionResponse::new(session, messages)))
}

/// POST /api/sessions/:session_id/messages
pub async fn add_message(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
    Json(req): Json<AddMessageRequest>,
) -> AppResult<Json<message::Model>> {
    let role = MessageRole::parse(&req.role)
        .ok_or_else(|| AppError::BadRequest("Invalid message role".to_string()))?;

    let session = chat::find_owned_session(&state.db, current_user.id, session_id).await?;
    let stored =
        chat::store_session_message(&state.db, &session, current_user.id, req.content, role)
            .await?;

    Ok(Json(stored))
}

/// POST /api/sessions/:session_id/chat
///
/// Full orchestrated turn: the user message, the assistant reply (or its
/// error text), and the reconciled session in the response.
pub async fn chat_turn(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
    Json(req): Json<ChatTurnRequest>,
) -> AppResult<Json<SessionResponse>> {
    let reconciled = chat::run_session_turn(
        &state.db,
        &state.llm,
        current_user.id,
        session_id,
        req.content,
    )
    .await?;

    Ok(Json(reconciled))
}

/// PUT /api/sessions/:session_id
pub async fn rename_session(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
    Json(req): Json<RenameSessionRequest>,
) -> AppResult<Json<SessionResponse>> {
    let session = chat::find_owned_session(&state.db, current_user.id, session_id).await?;

    let mut active: session::ActiveModel = session.into();
    active.name = Set(req.name);
    let updated = active.update(&state.db).await?;

    let messages = chat::session_messages(&state.db, session_id).await?;
    Ok(Json(SessionResponse::new(updated, messages)))
}

/// DELETE /api/sessions/:session_id
pub async fn delete_session(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(session_id): Path<i64>,
) -> AppResult<Json<Value>> {
    let session = chat::find_owned_session(&state.db, current_user.id, session_id).await?;

    // Messages go first, then the session itself
    state
        .db
        .transaction::<_, (), sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                message::Entity::delete_many()
                    .filter(message::Column::SessionId.eq(session.id))
                    .exec(txn)
                    .await?;

                session::Entity::delete_by_id(session.id).exec(txn).await?;

                Ok(())
            })
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "message": "Session deleted successfully" })))
}
