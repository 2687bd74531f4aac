//! Prompt-in, text-out endpoints, one per task.
//!
//! The prompt is used as-is: callers that want trend enrichment or the
//! go-to-market wrapping compose it themselves (or use `/tasks/:task`).

use axum::extract::State;
use axum::routing::{post, MethodRouter};
use axum::Json;
use serde::Deserialize;

use copilot_core::TaskKind;

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
}

/// Normalized model output as a plain-text body.
async fn generate_text(
    state: AppState,
    task: TaskKind,
    request: PromptRequest,
) -> Result<String, ApiError> {
    let text = state
        .pipeline
        .generate_text(task, &request.prompt, request.model.as_deref())
        .await?;
    Ok(text)
}

/// `POST` route serving `task`.
pub fn endpoint(task: TaskKind) -> MethodRouter<AppState> {
    post(
        move |State(state): State<AppState>, Json(request): Json<PromptRequest>| async move {
            generate_text(state, task, request).await
        },
    )
}
