use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::llm::LlmGateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Application configuration
    pub config: Arc<Config>,
    /// Upstream LLM gateway (stubbed out in tests)
    pub llm: Arc<dyn LlmGateway>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: DatabaseConnection, config: Config, llm: Arc<dyn LlmGateway>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            llm,
        }
    }
}
