//! Static model configuration.
//!
//! Maps the client-facing model selector ("zephyr", "mistral") to the hosted
//! model identifier, its context window and the compute tier it is served
//! on. Built once at startup and read-only afterwards.

use std::collections::HashMap;

use serde::Serialize;

use copilot_core::{defaults, Error, Result};

use crate::chat_template::ChatTemplate;

/// Configuration of one selectable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelConfig {
    /// Client-facing selector.
    pub selector: String,
    /// Hosted model identifier (also the model cache key).
    pub model_id: String,
    /// Maximum context length in tokens (prompt + generation).
    pub max_context: usize,
    /// GPU class the model is served on.
    pub compute_tier: String,
    /// Prompt format.
    pub template: ChatTemplate,
}

/// Registry of selectable models.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: HashMap<String, ModelConfig>,
}

impl ModelRegistry {
    /// Create a registry with the two hosted instruct models.
    pub fn new() -> Self {
        let mut models = HashMap::new();

        models.insert(
            "zephyr".to_string(),
            ModelConfig {
                selector: "zephyr".to_string(),
                model_id: "HuggingFaceH4/zephyr-7b-beta".to_string(),
                max_context: defaults::MODEL_CONTEXT_TOKENS,
                compute_tier: "H100".to_string(),
                template: ChatTemplate::Zephyr,
            },
        );

        models.insert(
            "mistral".to_string(),
            ModelConfig {
                selector: "mistral".to_string(),
                model_id: "mistralai/Mistral-7B-Instruct-v0.2".to_string(),
                max_context: defaults::MODEL_CONTEXT_TOKENS,
                compute_tier: "H100".to_string(),
                template: ChatTemplate::Mistral,
            },
        );

        Self { models }
    }

    /// Create a registry from explicit configurations.
    pub fn from_configs(configs: impl IntoIterator<Item = ModelConfig>) -> Self {
        Self {
            models: configs
                .into_iter()
                .map(|c| (c.selector.clone(), c))
                .collect(),
        }
    }

    /// Look up a selector. Unknown selectors are a configuration error; there is no fallback.
    pub fn resolve(&self, selector: &str) -> Result<&ModelConfig> {
        self.models
            .get(selector)
            .ok_or_else(|| Error::Config(format!("Unknown model selector: {}", selector)))
    }

    /// All configured models, sorted by selector.
    pub fn models(&self) -> Vec<&ModelConfig> {
        let mut models: Vec<&ModelConfig> = self.models.values().collect();
        models.sort_by(|a, b| a.selector.cmp(&b.selector));
        models
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
