//! Process-wide cache of loaded models.
//!
//! Each model is loaded at most once per process. Concurrent first requests
//! for the same key wait on one in-flight load instead of starting their own;
//! a failed load leaves the slot empty so the next request retries.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use copilot_core::{Error, Result, TextGenerationBackend, Tokenizer};

use crate::model_config::ModelConfig;

/// A model ready for generation: its configuration, tokenizer and endpoint.
pub struct LoadedModel {
    pub config: ModelConfig,
    /// Local fallback used when the endpoint cannot tokenize.
    pub tokenizer: Arc<dyn Tokenizer>,
    pub backend: Arc<dyn TextGenerationBackend>,
}

impl LoadedModel {
    /// Prompt token count and the name of whatever produced it.
    ///
    /// The endpoint's own tokenizer is authoritative; the local tokenizer is
    /// used only when the endpoint reports no count or the call fails.
    pub async fn count_prompt_tokens(&self, rendered: &str) -> (usize, &str) {
        match self.backend.count_tokens(rendered).await {
            Ok(Some(count)) => (count, "endpoint"),
            Ok(None) => (self.tokenizer.count_tokens(rendered), self.tokenizer.name()),
            Err(e) => {
                warn!(
                    model = %self.config.model_id,
                    error = %e,
                    fallback = self.tokenizer.name(),
                    "Endpoint tokenization failed, using local tokenizer"
                );
                (self.tokenizer.count_tokens(rendered), self.tokenizer.name())
            }
        }
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("model_id", &self.config.model_id)
            .field("tokenizer", &self.tokenizer.name())
            .field("backend", &self.backend.model_name())
            .finish()
    }
}

type Slot = Arc<OnceCell<Arc<LoadedModel>>>;

/// Single-flight cache keyed by model identifier.
#[derive(Default)]
pub struct ModelCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached model for `key`, loading it with `load` on first use.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<Arc<LoadedModel>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<LoadedModel>>,
    {
        let slot = self.slot(key)?;

        if let Some(model) = slot.get() {
            debug!(model = key, "Model cache hit");
            return Ok(Arc::clone(model));
        }

        let model = slot
            .get_or_try_init(|| async {
                info!(model = key, "Loading model");
                load().await.map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(model))
    }

    /// Whether `key` has a loaded model.
    pub fn is_loaded(&self, key: &str) -> bool {
        self.slots
            .lock()
            .map(|slots| slots.get(key).is_some_and(|slot| slot.initialized()))
            .unwrap_or(false)
    }

    /// Identifiers of all loaded models, sorted.
    pub fn loaded_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .slots
            .lock()
            .map(|slots| {
                slots
                    .iter()
                    .filter(|(_, slot)| slot.initialized())
                    .map(|(key, _)| key.clone())
                    .collect()
            })
            .unwrap_or_default();
        keys.sort();
        keys
    }

    fn slot(&self, key: &str) -> Result<Slot> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| Error::Internal("Model cache lock poisoned".into()))?;
        Ok(Arc::clone(slots.entry(key.to_string()).or_default()))
    }
}
