//! Authentication middleware
//!
//! Stateless bearer-token authentication for API routes. Every protected
//! endpoint runs through [`auth_layer`] before touching any other component;
//! a verification failure short-circuits the request with a uniform 401 that
//! withholds the reason (missing header, malformed token, bad signature and
//! expiry are indistinguishable to the caller).

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::entity::user::{self, UserRole};
use crate::error::AppError;
use crate::state::AppState;

/// Signed token claims: identity plus role, expiring after the configured
/// validity window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub role: String,
    pub exp: i64,
}

/// Authenticated identity attached to the request
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            role: UserRole::from(claims.role.as_str()),
        }
    }
}

/// Issue a signed token for a user
pub fn issue_token(user: &user::Model, secret: &str, ttl_days: i64) -> Result<String, AppError> {
    let claims = Claims {
        id: user.id,
        email: user.email.clone(),
        role: user.role.clone(),
        exp: (Utc::now() + Duration::days(ttl_days)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

/// Verify a token and recover its claims. Any failure collapses to
/// [`AppError::Unauthorized`].
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

/// Paths that don't require authentication
fn is_public_path(path: &str) -> bool {
    // Only API routes are authenticated
    if !path.starts_with("/api") {
        return true;
    }

    path == "/api/auth/login" || path == "/api/health"
}

/// Authentication middleware
pub async fn auth_layer(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if is_public_path(&path) {
        return next.run(request).await;
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return AppError::Unauthorized.into_response();
    };

    match decode_token(token, &state.config.auth.jwt_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(CurrentUser::from(claims));
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!("Token verification failed for {}", path);
            err.into_response()
        }
    }
}
