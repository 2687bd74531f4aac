//! Model discovery handler.
//!
//! Lists the selectable models so clients can offer the choice, and shows
//! which of them are already loaded in this process.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use copilot_core::defaults;
use copilot_inference::ChatTemplate;

use crate::AppState;

/// A single selectable model.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    /// Selector used in request bodies ("zephyr", "mistral").
    pub selector: String,
    /// Hosted model identifier.
    pub model_id: String,
    pub max_context: usize,
    pub compute_tier: String,
    pub template: ChatTemplate,
    /// Whether the model has been loaded by this process.
    pub loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct ListModelsResponse {
    pub models: Vec<ModelInfo>,
    /// Selector used when a request names none.
    pub default: String,
}

pub async fn list_models(State(state): State<AppState>) -> Json<ListModelsResponse> {
    let gateway = state.pipeline.gateway();

    let models = gateway
        .registry()
        .models()
        .into_iter()
        .map(|config| ModelInfo {
            selector: config.selector.clone(),
            model_id: config.model_id.clone(),
            max_context: config.max_context,
            compute_tier: config.compute_tier.clone(),
            template: config.template,
            loaded: gateway.cache().is_loaded(&config.model_id),
        })
        .collect();

    Json(ListModelsResponse {
        models,
        default: defaults::MODEL_SELECTOR.to_string(),
    })
}
