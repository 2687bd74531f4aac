//! Inference gateway.
//!
//! Resolves the model, renders the task's conversation with the model's chat
//! template, sizes the generation budget from the remaining context window
//! and calls the hosted endpoint under the task's time limit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use copilot_core::{
    defaults, Error, GenerationParams, GenerationResult, Result, TaskKind, TaskRequest,
};

use crate::cache::{LoadedModel, ModelCache};
use crate::chat_template::ChatMessage;
use crate::compose::compose;
use crate::loader::{HostedModelLoader, ModelLoader};
use crate::model_config::ModelRegistry;
use crate::normalize::normalize;
use crate::tasks::task_spec;

/// Generated-token budget for a prompt of `prompt_tokens` in a `max_context` window.
///
/// `min(MAX_NEW_TOKENS, max(max_context - prompt_tokens, 1))`; never zero,
/// even when the prompt already fills or overflows the window.
pub fn max_new_tokens(max_context: usize, prompt_tokens: usize) -> usize {
    max_context
        .saturating_sub(prompt_tokens)
        .clamp(defaults::MIN_NEW_TOKENS, defaults::MAX_NEW_TOKENS)
}

/// Entry point for every generation.
pub struct InferenceGateway {
    registry: ModelRegistry,
    cache: ModelCache,
    loader: Arc<dyn ModelLoader>,
}

impl InferenceGateway {
    pub fn new(registry: ModelRegistry, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            registry,
            cache: ModelCache::new(),
            loader,
        }
    }

    /// Built-in models served behind `INFERENCE_BASE_URL`.
    pub fn from_env() -> Self {
        Self::new(ModelRegistry::new(), Arc::new(HostedModelLoader::from_env()))
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Resolve a selector and return its loaded model, loading it on first use.
    pub async fn load(&self, selector: &str) -> Result<Arc<LoadedModel>> {
        let config = self.registry.resolve(selector)?;
        let loader = Arc::clone(&self.loader);
        self.cache
            .get_or_load(&config.model_id, || async move { loader.load(config).await })
            .await
    }

    /// Generate raw text for an already composed prompt.
    ///
    /// The returned text is the full decoded output, prompt echo and special
    /// tokens included; pass it through [`normalize`] before showing it.
    #[instrument(skip(self, prompt), fields(subsystem = "inference", component = "gateway", op = "generate", task = %task, model = %selector, prompt_len = prompt.len()))]
    pub async fn generate(&self, task: TaskKind, prompt: &str, selector: &str) -> Result<String> {
        let start = Instant::now();
        let spec = task_spec(task);
        let model = self.load(selector).await?;

        let messages = [
            ChatMessage::system(spec.system_prompt),
            ChatMessage::user(prompt),
        ];
        let rendered = model.config.template.render(&messages);

        let (prompt_tokens, counted_by) = model.count_prompt_tokens(&rendered).await;
        let params =
            GenerationParams::with_budget(max_new_tokens(model.config.max_context, prompt_tokens));
        debug!(
            prompt_tokens,
            max_new_tokens = params.max_new_tokens,
            tokenizer = counted_by,
            "Token budget computed"
        );

        let limit = Duration::from_secs(spec.timeout_secs);
        let raw = tokio::time::timeout(limit, model.backend.generate_text(&rendered, &params))
            .await
            .map_err(|_| {
                Error::Inference(format!(
                    "Generation for {} timed out after {}s",
                    task, spec.timeout_secs
                ))
            })??;

        let elapsed = start.elapsed().as_millis() as u64;
        info!(
            response_len = raw.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > defaults::SLOW_GENERATION_MS {
            warn!(
                duration_ms = elapsed,
                prompt_len = prompt.len(),
                slow = true,
                "Slow generation operation"
            );
        }

        Ok(raw)
    }

    /// Compose, generate and normalize one request.
    pub async fn run(&self, request: &TaskRequest) -> Result<GenerationResult> {
        let prompt = compose(
            request.task,
            &request.prompt,
            request.trend_context.as_deref(),
        );
        let raw = self.generate(request.task, &prompt, &request.model).await?;
        let normalized = normalize(&raw);
        Ok(GenerationResult { raw, normalized })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBackend, MockLoader};

    fn gateway(backend: MockBackend) -> (InferenceGateway, Arc<MockLoader>) {
        let loader = Arc::new(MockLoader::new(backend));
        let gateway = InferenceGateway::new(ModelRegistry::new(), loader.clone());
        (gateway, loader)
    }

    #[test]
    fn test_budget_near_full_window() {
        assert_eq!(max_new_tokens(4096, 4090), 6);
    }

    #[test]
    fn test_budget_never_zero() {
        assert_eq!(max_new_tokens(4096, 4096), 1);
        assert_eq!(max_new_tokens(4096, 5000), 1);
    }

    #[test]
    fn test_budget_capped() {
        assert_eq!(max_new_tokens(4096, 10), 1024);
        assert_eq!(max_new_tokens(4096, 3072), 1024);
        assert_eq!(max_new_tokens(4096, 3073), 1023);
    }

    #[tokio::test]
    async fn test_generate_renders_system_and_user() {
        let backend = MockBackend::new("HuggingFaceH4/zephyr-7b-beta");
        let (gateway, _) = gateway(backend.clone());

        gateway
            .generate(TaskKind::BusinessCase, "Dog walking app", "zephyr")
            .await
            .unwrap();

        let inputs = backend.last_inputs().unwrap();
        let spec = task_spec(TaskKind::BusinessCase);
        assert_eq!(
            inputs,
            format!(
                "<|system|>\n{}</s>\n<|user|>\nDog walking app</s>\n<|assistant|>\n",
                spec.system_prompt
            )
        );
    }

    #[tokio::test]
    async fn test_generate_uses_fixed_sampling_policy() {
        let backend = MockBackend::new("m");
        let (gateway, _) = gateway(backend.clone());

        gateway
            .generate(TaskKind::Workflow, "idea", "mistral")
            .await
            .unwrap();

        let call = &backend.calls()[0];
        assert!(call.inputs.starts_with("<s>[INST] "));
        assert_eq!(call.params.temperature, 0.5);
        assert_eq!(call.params.top_p, 0.9);
        assert!(!call.params.do_sample);
        assert_eq!(call.params.max_new_tokens, 1024);
    }

    #[tokio::test]
    async fn test_unknown_selector_is_config_error() {
        let (gateway, loader) = gateway(MockBackend::new("m"));
        let err = gateway
            .generate(TaskKind::Workflow, "idea", "gpt-9")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(loader.load_count(), 0);
    }

    #[tokio::test]
    async fn test_model_loaded_once() {
        let (gateway, loader) = gateway(MockBackend::new("m"));
        for task in TaskKind::ALL {
            gateway.generate(task, "idea", "zephyr").await.unwrap();
        }
        assert_eq!(loader.load_count(), 1);
        assert!(gateway.cache().is_loaded("HuggingFaceH4/zephyr-7b-beta"));
    }

    #[tokio::test]
    async fn test_returns_raw_text_with_echo() {
        let backend = MockBackend::new("m").with_response("## Workflow\n1. Go");
        let (gateway, _) = gateway(backend);
        let raw = gateway
            .generate(TaskKind::Workflow, "idea", "zephyr")
            .await
            .unwrap();
        assert!(raw.starts_with("<|system|>"));
        assert!(raw.ends_with("## Workflow\n1. Go"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_limit_enforced() {
        let backend = MockBackend::new("m").with_latency_ms(301_000);
        let (gateway, _) = gateway(backend);
        let err = gateway
            .generate(TaskKind::PitchDeck, "idea", "zephyr")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
        assert!(err.to_string().contains("timed out after 300s"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_workflow_gets_longer_time_limit() {
        let backend = MockBackend::new("m").with_latency_ms(400_000);
        let (gateway, _) = gateway(backend);
        assert!(gateway
            .generate(TaskKind::Workflow, "idea", "zephyr")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_run_composes_and_normalizes() {
        let backend = MockBackend::new("m").with_response("Sure!\n## Workflow\n1. Intake");
        let (gateway, _) = gateway(backend.clone());

        let request = TaskRequest::new(TaskKind::GtmStrategy, "Vegan bakery", None)
            .with_trend_context("Google Trends Insight for 'Vegan bakery':");
        let result = gateway.run(&request).await.unwrap();

        assert_eq!(result.normalized, "## Workflow\n1. Intake");
        let inputs = backend.last_inputs().unwrap();
        assert!(inputs.contains(
            "Generate a detailed Go-To-Market strategy for the prompt'Vegan bakery'.\n\nTrends Data:\nGoogle Trends Insight"
        ));
    }

    #[tokio::test]
    async fn test_budget_uses_endpoint_token_count() {
        let idea = "1234567890".repeat(300);

        for reported in [10, 3000, 3073, 3500, 4090, 4095] {
            let backend = MockBackend::new("m").with_token_count(reported);
            let (gateway, _) = gateway(backend.clone());

            gateway
                .generate(TaskKind::BusinessCase, &idea, "mistral")
                .await
                .unwrap();

            let max_context = gateway.registry().resolve("mistral").unwrap().max_context;
            let budget = backend.calls()[0].params.max_new_tokens;
            assert!(
                reported + budget <= max_context,
                "{} prompt tokens + {} new tokens overflow {}",
                reported,
                budget,
                max_context
            );
        }
    }

    #[tokio::test]
    async fn test_budget_for_long_digit_prompt() {
        let backend = MockBackend::new("m").with_token_count(3073);
        let (gateway, _) = gateway(backend.clone());

        gateway
            .generate(TaskKind::BusinessCase, &"1234567890".repeat(300), "mistral")
            .await
            .unwrap();

        assert_eq!(backend.calls()[0].params.max_new_tokens, 1023);
    }

    #[tokio::test]
    async fn test_unhealthy_endpoint_is_not_cached() {
        let backend = MockBackend::new("m").unhealthy();
        let (gateway, loader) = gateway(backend.clone());

        for _ in 0..2 {
            let err = gateway
                .generate(TaskKind::Workflow, "idea", "zephyr")
                .await
                .unwrap_err();
            assert!(err.to_string().contains("Model endpoint unavailable"));
        }

        assert_eq!(loader.load_count(), 2);
        assert!(!gateway.cache().is_loaded("HuggingFaceH4/zephyr-7b-beta"));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_load_surfaces_as_inference_error() {
        let loader = Arc::new(MockLoader::new(MockBackend::new("m")).failing());
        let gateway = InferenceGateway::new(ModelRegistry::new(), loader.clone());

        let err = gateway
            .generate(TaskKind::PitchDeck, "idea", "mistral")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Inference(_)));
        assert!(gateway.cache().loaded_keys().is_empty());
        assert_eq!(loader.load_count(), 1);
    }
}
