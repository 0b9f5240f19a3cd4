//! LLM proxy handler
//!
//! Authenticated passthrough to the hosted workflow endpoint. The raw
//! provider JSON is returned unchanged; reply extraction for chat turns
//! happens once, server-side, in the orchestrator.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::error::AppResult;
use crate::llm::TurnPayload;
use crate::state::AppState;

/// POST /api/llm/process
pub async fn process(
    State(state): State<AppState>,
    Json(payload): Json<TurnPayload>,
) -> AppResult<Json<Value>> {
    let body = state.llm.process(&payload).await?;
    Ok(Json(body))
}
