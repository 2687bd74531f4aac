//! In-memory generation backend and model loader for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use copilot_inference::mock::{MockBackend, MockLoader};
//! use copilot_inference::{InferenceGateway, ModelRegistry};
//!
//! let backend = MockBackend::new("HuggingFaceH4/zephyr-7b-beta")
//!     .with_response("## Workflow\n1. Collect leads");
//! let loader = Arc::new(MockLoader::new(backend.clone()));
//! let gateway = InferenceGateway::new(ModelRegistry::new(), loader);
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use copilot_core::{
    Error, GenerationParams, Result, TextGenerationBackend, WhitespaceTokenizer,
};

use crate::cache::LoadedModel;
use crate::loader::ModelLoader;
use crate::model_config::ModelConfig;

/// One recorded generation call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub inputs: String,
    pub params: GenerationParams,
}

/// Backend that echoes the prompt (when asked to) followed by a fixed response.
#[derive(Clone)]
pub struct MockBackend {
    model: String,
    response: String,
    latency_ms: u64,
    fail_with: Option<String>,
    token_count: Option<usize>,
    tokenize_fails: bool,
    healthy: bool,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockBackend {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            response: "Mock response".to_string(),
            latency_ms: 0,
            fail_with: None,
            token_count: None,
            tokenize_fails: false,
            healthy: true,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the generated continuation.
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = response.into();
        self
    }

    /// Delay every generation call.
    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Fail every generation call with an inference error.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(message.into());
        self
    }

    /// Report `count` tokens for every prompt, as an endpoint tokenizer would.
    pub fn with_token_count(mut self, count: usize) -> Self {
        self.token_count = Some(count);
        self
    }

    /// Fail every tokenization call.
    pub fn with_tokenize_failure(mut self) -> Self {
        self.tokenize_fails = true;
        self
    }

    /// Report the endpoint as unhealthy.
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// All recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Rendered prompt of the most recent call.
    pub fn last_inputs(&self) -> Option<String> {
        self.calls().last().map(|c| c.inputs.clone())
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }
}

#[async_trait]
impl TextGenerationBackend for MockBackend {
    async fn generate_text(&self, inputs: &str, params: &GenerationParams) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                inputs: inputs.to_string(),
                params: *params,
            });
        }

        if self.latency_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.latency_ms)).await;
        }

        if let Some(ref message) = self.fail_with {
            return Err(Error::Inference(message.clone()));
        }

        if params.return_full_text {
            Ok(format!("{}{}", inputs, self.response))
        } else {
            Ok(self.response.clone())
        }
    }

    async fn count_tokens(&self, _inputs: &str) -> Result<Option<usize>> {
        if self.tokenize_fails {
            return Err(Error::Inference("Tokenization failed".into()));
        }
        Ok(self.token_count)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.healthy)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Loader handing out one shared [`MockBackend`] with a whitespace tokenizer.
pub struct MockLoader {
    backend: MockBackend,
    loads: AtomicUsize,
    fail_loads: bool,
}

impl MockLoader {
    pub fn new(backend: MockBackend) -> Self {
        Self {
            backend,
            loads: AtomicUsize::new(0),
            fail_loads: false,
        }
    }

    /// Fail every load attempt.
    pub fn failing(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    /// Number of load attempts so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for MockLoader {
    async fn load(&self, config: &ModelConfig) -> Result<LoadedModel> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        if self.fail_loads || !self.backend.health_check().await? {
            return Err(Error::Inference(format!(
                "Model endpoint unavailable: {}",
                config.model_id
            )));
        }

        Ok(LoadedModel {
            config: config.clone(),
            tokenizer: Arc::new(WhitespaceTokenizer),
            backend: Arc::new(self.backend.clone()),
        })
    }
}
