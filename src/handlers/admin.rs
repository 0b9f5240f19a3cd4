//! Admin handlers
//!
//! User management surface for global admins

use axum::{extract::State, Extension, Json};
use sea_orm::{EntityTrait, QueryOrder};
use serde_json::{json, Value};

use crate::entity::user::{self, UserProfile};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::{create_user_account, RegisterRequest};
use crate::middleware::auth::CurrentUser;
use crate::state::AppState;

/// GET /api/admin/users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<UserProfile>>> {
    if !current_user.is_admin() {
        return Err(AppError::Forbidden);
    }

    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

/// POST /api/admin/users (admin only)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<UserProfile>> {
    if !current_user.is_admin() {
        return Err(AppError::Forbidden);
    }

    let created = create_user_account(&state, &current_user, req).await?;
    Ok(Json(created.into()))
}

/// GET /api/admin/is-admin
pub async fn is_admin(Extension(current_user): Extension<CurrentUser>) -> Json<Value> {
    Json(json!({ "isAdmin": current_user.is_admin() }))
}
