//! Full pipeline runs: `POST /tasks/:task`.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use copilot_core::TaskKind;

use crate::pipeline::{RunOptions, TaskRun};
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct RunTaskRequest {
    /// Raw idea text; trend enrichment and wrapping are applied server-side.
    pub idea: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub save_to_notes: bool,
    #[serde(default)]
    pub database_id: Option<String>,
}

pub async fn run_task(
    State(state): State<AppState>,
    Path(task): Path<String>,
    Json(request): Json<RunTaskRequest>,
) -> Result<Json<TaskRun>, ApiError> {
    let task: TaskKind = task.parse()?;

    let options = RunOptions {
        save_to_notes: request.save_to_notes,
        database_id: request.database_id,
    };

    let run = state
        .pipeline
        .run(task, &request.idea, request.model.as_deref(), options)
        .await?;

    Ok(Json(run))
}
