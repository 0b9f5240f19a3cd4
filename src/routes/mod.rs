use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::auth_layer;
use crate::state::AppState;

pub mod health;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth routes
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/me", get(handlers::auth::me))
        // Session routes
        .route(
            "/sessions",
            get(handlers::session::list_sessions).post(handlers::session::create_session),
        )
        .route(
            "/sessions/:session_id",
            get(handlers::session::get_session)
                .put(handlers::session::rename_session)
                .delete(handlers::session::delete_session),
        )
        .route(
            "/sessions/:session_id/messages",
            post(handlers::session::add_message),
        )
        .route(
            "/sessions/:session_id/chat",
            post(handlers::session::chat_turn),
        )
        // Group routes
        .route(
            "/groups",
            get(handlers::group::list_groups).post(handlers::group::create_group),
        )
        .route(
            "/groups/:group_id/sessions",
            get(handlers::group::list_group_sessions).post(handlers::group::create_group_session),
        )
        .route(
            "/groups/:group_id/sessions/:session_id",
            get(handlers::group::get_group_session)
                .put(handlers::group::rename_group_session)
                .delete(handlers::group::delete_group_session),
        )
        .route(
            "/groups/:group_id/sessions/:session_id/messages",
            post(handlers::group::add_group_message),
        )
        // LLM proxy
        .route("/llm/process", post(handlers::llm::process))
        // Admin routes
        .route(
            "/admin/users",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route("/admin/is-admin", get(handlers::admin::is_admin));

    Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_layer))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
