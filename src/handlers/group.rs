//! Group handlers
//!
//! Group listing and creation plus group session CRUD and messaging. Two
//! authorization axes apply here: the global admin role gates group creation,
//! and a membership row gates everything else. Membership is checked before
//! any data access; a valid session id is worthless without it.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

use crate::chat;
use crate::entity::group::{GroupResponse, GroupRosterEntry};
use crate::entity::group_member::GroupRole;
use crate::entity::group_message::GroupMessageResponse;
use crate::entity::group_session::{GroupSessionResponse, DEFAULT_GROUP_SESSION_NAME};
use crate::entity::message::MessageRole;
use crate::entity::user::UserSummary;
use crate::entity::{group, group_member, group_message, group_session, user};
use crate::error::{AppError, AppResult, OptionExt};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

/// Create group request
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default, rename = "memberIds")]
    pub member_ids: Vec<i64>,
}

/// Create group session request
#[derive(Debug, Deserialize)]
pub struct CreateGroupSessionRequest {
    pub name: Option<String>,
}

/// Rename group session request
#[derive(Debug, Deserialize)]
pub struct RenameGroupSessionRequest {
    pub name: String,
}

/// Add group message request
#[derive(Debug, Deserialize)]
pub struct AddGroupMessageRequest {
    pub content: String,
    pub role: Option<String>,
    #[serde(default, rename = "askBot")]
    pub ask_bot: bool,
}

/// Membership gate for all group-scoped access
async fn require_membership(
    db: &DatabaseConnection,
    group_id: i64,
    user_id: i64,
) -> AppResult<group_member::Model> {
    group_member::Entity::find()
        .filter(group_member::Column::GroupId.eq(group_id))
        .filter(group_member::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(AppError::Forbidden)
}

/// Resolve a session inside its group
async fn find_group_session(
    db: &DatabaseConnection,
    group_id: i64,
    session_id: i64,
) -> AppResult<group_session::Model> {
    group_session::Entity::find()
        .filter(group_session::Column::Id.eq(session_id))
        .filter(group_session::Column::GroupId.eq(group_id))
        .one(db)
        .await?
        .ok_or_not_found("Group session not found")
}

/// Batch-load user summaries for a set of ids
async fn user_summaries(
    db: &DatabaseConnection,
    ids: Vec<i64>,
) -> AppResult<HashMap<i64, UserSummary>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;

    Ok(users
        .into_iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect())
}

/// Messages of one group session, oldest first, with author summaries
async fn group_session_messages(
    db: &DatabaseConnection,
    session_id: i64,
) -> AppResult<Vec<GroupMessageResponse>> {
    let messages = group_message::Entity::find()
        .filter(group_message::Column::GroupSessionId.eq(session_id))
        .order_by_asc(group_message::Column::CreatedAt)
        .order_by_asc(group_message::Column::Id)
        .all(db)
        .await?;

    let author_ids: Vec<i64> = messages.iter().filter_map(|m| m.user_id).collect();
    let authors = user_summaries(db, author_ids).await?;

    Ok(messages
        .into_iter()
        .map(|m| {
            let author = m.user_id.and_then(|id| authors.get(&id).cloned());
            GroupMessageResponse::new(m, author)
        })
        .collect())
}

/// Roster of one group
async fn group_roster(
    db: &DatabaseConnection,
    group_id: i64,
) -> AppResult<Vec<GroupRosterEntry>> {
    let members = group_member::Entity::find()
        .filter(group_member::Column::GroupId.eq(group_id))
        .all(db)
        .await?;

    let users = user_summaries(db, members.iter().map(|m| m.user_id).collect()).await?;

    Ok(members
        .into_iter()
        .filter_map(|m| {
            users
                .get(&m.user_id)
                .cloned()
                .map(|u| GroupRosterEntry::new(u, m.role))
        })
        .collect())
}

/// GET /api/groups - groups the caller belongs to
pub async fn list_groups(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<GroupResponse>>> {
    let memberships = group_member::Entity::find()
        .filter(group_member::Column::UserId.eq(current_user.id))
        .all(&state.db)
        .await?;

    let mut groups = Vec::with_capacity(memberships.len());
    for membership in memberships {
        let Some(g) = group::Entity::find_by_id(membership.group_id)
            .one(&state.db)
            .await?
        else {
            continue;
        };

        let members = group_roster(&state.db, g.id).await?;

        // Only the most recent session, not the full history
        let last_session = group_session::Entity::find()
            .filter(group_session::Column::GroupId.eq(g.id))
            .order_by_desc(group_session::Column::CreatedAt)
            .order_by_desc(group_session::Column::Id)
            .one(&state.db)
            .await?;

        groups.push(GroupResponse {
            id: g.id,
            name: g.name,
            role: membership.role,
            members,
            last_session,
        });
    }

    groups.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Json(groups))
}

/// POST /api/groups (admin only)
pub async fn create_group(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<CreateGroupRequest>,
) -> AppResult<Json<GroupResponse>> {
    if !current_user.is_admin() {
        return Err(AppError::Forbidden);
    }

    if req.name.is_empty() {
        return Err(AppError::BadRequest("Group name is required".to_string()));
    }

    let creator_id = current_user.id;

    // Group, creator membership, and member inserts stand or fall together
    let created = state
        .db
        .transaction::<_, group::Model, sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                let created = group::ActiveModel {
                    name: Set(req.name),
                    created_by_id: Set(creator_id),
                    created_at: Set(chrono::Utc::now()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                group_member::ActiveModel {
                    group_id: Set(created.id),
                    user_id: Set(creator_id),
                    role: Set(GroupRole::Admin.as_str().to_string()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let mut seen = HashSet::new();
                for user_id in req.member_ids {
                    if user_id == creator_id || !seen.insert(user_id) {
                        continue;
                    }

                    // Unknown ids are skipped, not fatal
                    if user::Entity::find_by_id(user_id).one(txn).await?.is_none() {
                        continue;
                    }

                    group_member::ActiveModel {
                        group_id: Set(created.id),
                        user_id: Set(user_id),
                        role: Set(GroupRole::Member.as_str().to_string()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }

                Ok(created)
            })
        })
        .await
        .map_err(|e| {
            tracing::error!("Failed to create group: {}", e);
            AppError::Internal(e.to_string())
        })?;

    let members = group_roster(&state.db, created.id).await?;

    tracing::info!("Group {} created by admin {}", created.id, creator_id);

    Ok(Json(GroupResponse {
        id: created.id,
        name: created.name,
        role: GroupRole::Admin.as_str().to_string(),
        members,
        last_session: None,
    }))
}

/// GET /api/groups/:group_id/sessions
pub async fn list_group_sessions(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<i64>,
) -> AppResult<Json<Vec<GroupSessionResponse>>> {
    require_membership(&state.db, group_id, current_user.id).await?;

    let sessions = group_session::Entity::find()
        .filter(group_session::Column::GroupId.eq(group_id))
        .order_by_desc(group_session::Column::CreatedAt)
        .order_by_desc(group_session::Column::Id)
        .all(&state.db)
        .await?;

    let mut responses = Vec::with_capacity(sessions.len());
    for s in sessions {
        let messages = group_session_messages(&state.db, s.id).await?;
        responses.push(GroupSessionResponse::new(s, messages));
    }

    Ok(Json(responses))
}

/// POST /api/groups/:group_id/sessions
pub async fn create_group_session(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(group_id): Path<i64>,
    Json(req): Json<CreateGroupSessionRequest>,
) -> AppResult<Json<GroupSessionResponse>> {
    require_membership(&state.db, group_id, current_user.id).await?;

    let name = match req.name {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_GROUP_SESSION_NAME.to_string(),
    };

    let created = group_session::ActiveModel {
        name: Set(name),
        group_id: Set(group_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok(Json(GroupSessionResponse::new(created, Vec::new())))
}

/// GET /api/groups/:group_id/sessions/:session_id
pub async fn get_group_session(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((group_id, session_id)): Path<(i64, i64)>,
) -> AppResult<Json<GroupSessionResponse>> {
    require_membership(&state.db, group_id, current_user.id).await?;

    let session = find_group_session(&state.db, group_id, session_id).await?;
    let messages = group_session_messages(&state.db, session_id).await?;

    Ok(Json(GroupSessionResponse::new(session, messages)))
}

/// POST /api/groups/:group_id/sessions/:session_id/messages
///
/// The user message is always stored. When `askBot` is set the turn continues
/// into the orchestrator and the reply lands as an assistant message with no
/// human owner.
pub async fn add_group_message(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((group_id, session_id)): Path<(i64, i64)>,
    Json(req): Json<AddGroupMessageRequest>,
) -> AppResult<Json<GroupMessageResponse>> {
    require_membership(&state.db, group_id, current_user.id).await?;

    let session = find_group_session(&state.db, group_id, session_id).await?;

    let role = match req.role.as_deref() {
        None | Some("") => MessageRole::User,
        Some(value) => MessageRole::parse(value)
            .ok_or_else(|| AppError::BadRequest("Invalid message role".to_string()))?,
    };

    let stored = chat::run_group_turn(
        &state.db,
        &state.llm,
        current_user.id,
        session.id,
        req.content,
        role,
        req.ask_bot,
    )
    .await?;

    let author = user::Entity::find_by_id(current_user.id)
        .one(&state.db)
        .await?
        .map(UserSummary::from);

    Ok(Json(GroupMessageResponse::new(stored, author)))
}

/// PUT /api/groups/:group_id/sessions/:session_id
pub async fn rename_group_session(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((group_id, session_id)): Path<(i64, i64)>,
    Json(req): Json<RenameGroupSessionRequest>,
) -> AppResult<Json<GroupSessionResponse>> {
    require_membership(&state.db, group_id, current_user.id).await?;

    let session = find_group_session(&state.db, group_id, session_id).await?;

    let mut active: group_session::ActiveModel = session.into();
    active.name = Set(req.name);
    let updated = active.update(&state.db).await?;

    let messages = group_session_messages(&state.db, session_id).await?;
    Ok(Json(GroupSessionResponse::new(updated, messages)))
}

/// DELETE /api/groups/:group_id/sessions/:session_id
pub async fn delete_group_session(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((group_id, session_id)): Path<(i64, i64)>,
) -> AppResult<Json<Value>> {
    require_membership(&state.db, group_id, current_user.id).await?;

    let session = find_group_session(&state.db, group_id, session_id).await?;

    // Messages go first, then the session itself
    state
        .db
        .transaction::<_, (), sea_orm::DbErr>(|txn| {
            Box::pin(async move {
                group_message::Entity::delete_many()
                    .filter(group_message::Column::GroupSessionId.eq(session.id))
                    .exec(txn)
                    .await?;

                group_session::Entity::delete_by_id(session.id)
                    .exec(txn)
                    .await?;

                Ok(())
            })
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "message": "Group session deleted successfully" })))
}
