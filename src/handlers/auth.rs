//! Authentication handlers
//!
//! Implements login, registration, and current user endpoints

use axum::{extract::State, Extension, Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::entity::user::{self, UserProfile, UserRole};
use crate::error::{AppError, AppResult, OptionExt};
use crate::middleware::auth::{issue_token, CurrentUser};
use crate::state::AppState;

/// A bcrypt hash of no known password. Unknown emails burn a verification
/// against it so both credential failure paths cost the same.
const PHANTOM_HASH: &str = "$2a$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Registration request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub role: Option<String>,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let found = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&state.db)
        .await?;

    let Some(db_user) = found else {
        let _ = bcrypt::verify(&req.password, PHANTOM_HASH);
        tracing::warn!("Login failed: unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let password_valid = bcrypt::verify(&req.password, &db_user.password).unwrap_or(false);
    if !password_valid {
        tracing::warn!("Login failed: wrong password for user {}", db_user.id);
        return Err(AppError::InvalidCredentials);
    }

    let token = issue_token(
        &db_user,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_days,
    )?;

    tracing::info!("User logged in: {}", db_user.id);

    Ok(Json(LoginResponse {
        token,
        user: db_user.into(),
    }))
}

/// POST /api/auth/register (admin only)
pub async fn register(
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

/// GET /api/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserProfile>> {
    let db_user = user::Entity::find_by_id(current_user.id)
        .one(&state.db)
        .await?
        .ok_or_not_found("User not found")?;

    Ok(Json(db_user.into()))
}

/// Create a user account on behalf of an admin. Shared between
/// /auth/register and the admin user management surface.
pub(crate) async fn create_user_account(
    state: &AppState,
    requestor: &CurrentUser,
    req: RegisterRequest,
) -> AppResult<user::Model> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let role = match req.role.as_deref() {
        None | Some("") => UserRole::User,
        Some(value) => UserRole::parse(value)
            .ok_or_else(|| AppError::BadRequest("Invalid role".to_string()))?,
    };

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&req.email))
        .one(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let hashed = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;

    let created = user::ActiveModel {
        email: Set(req.email),
        password: Set(hashed),
        name: Set(req.name),
        role: Set(role.as_str().to_string()),
        created_by_id: Set(Some(requestor.id)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    tracing::info!("User {} created by admin {}", created.id, requestor.id);

    Ok(created)
}
