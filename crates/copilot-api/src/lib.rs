//! # copilot-api
//!
//! HTTP surface of startup-copilot.
//!
//! - `POST /generate-workflow`, `/validate-idea`, `/business-case`,
//!   `/pitch-deck`, `/gtm-strategy`: prompt in, normalized text out
//! - `POST /tasks/:task`: full pipeline with trend enrichment and optional save
//! - `GET /models`, `GET /health`

pub mod error;
pub mod handlers;
pub mod pipeline;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use copilot_core::{Result, TaskKind};
use copilot_inference::InferenceGateway;
use copilot_notes::PersistenceRelay;
use copilot_trends::GoogleTrendsClient;

pub use error::ApiError;
pub use pipeline::{RunOptions, TaskPipeline, TaskRun};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TaskPipeline>,
}

impl AppState {
    pub fn new(pipeline: TaskPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Build every collaborator from environment variables.
    ///
    /// Fails when `NOTION_TOKEN` is missing.
    pub fn from_env() -> Result<Self> {
        let notes = PersistenceRelay::from_env()?;
        let trends = GoogleTrendsClient::from_env()?;
        let gateway = InferenceGateway::from_env();

        Ok(Self::new(TaskPipeline::new(
            Arc::new(gateway),
            Arc::new(trends),
            Arc::new(notes),
        )))
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Assemble the router with tracing, request-id and CORS layers.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/models", get(handlers::models::list_models))
        .route("/tasks/:task", post(handlers::tasks::run_task));

    for task in TaskKind::ALL {
        router = router.route(task.endpoint(), handlers::generate::endpoint(task));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT]),
        )
        .with_state(state)
}
