//! Task pipeline: trends, compose, generate, normalize, save.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, instrument};

use copilot_core::{Error, Result, TaskKind, TaskRequest, TrendsProvider};
use copilot_inference::{task_spec, InferenceGateway};
use copilot_notes::PersistenceRelay;
use copilot_trends::summarize_trends;

/// Turn escaped line breaks left in model output into real ones.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Options of one pipeline run beyond the idea and the model.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub save_to_notes: bool,
    /// Target database; the configured default is used when absent.
    pub database_id: Option<String>,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRun {
    pub task: TaskKind,
    pub model: String,
    pub output: String,
    /// Completion message of the task.
    pub status: String,
    /// Trend summary appended to the prompt, if one was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_page_id: Option<String>,
}

/// Wires the trends source, the inference gateway and the note relay together.
pub struct TaskPipeline {
    gateway: Arc<InferenceGateway>,
    trends: Arc<dyn TrendsProvider>,
    notes: Arc<PersistenceRelay>,
}

impl TaskPipeline {
    pub fn new(
        gateway: Arc<InferenceGateway>,
        trends: Arc<dyn TrendsProvider>,
        notes: Arc<PersistenceRelay>,
    ) -> Self {
        Self {
            gateway,
            trends,
            notes,
        }
    }

    pub fn gateway(&self) -> &InferenceGateway {
        &self.gateway
    }

    /// Generate for an already composed prompt and return display-ready text.
    pub async fn generate_text(
        &self,
        task: TaskKind,
        prompt: &str,
        model: Option<&str>,
    ) -> Result<String> {
        let request = TaskRequest::new(task, prompt, model);
        let raw = self
            .gateway
            .generate(task, &request.prompt, &request.model)
            .await?;
        Ok(unescape_newlines(&copilot_inference::normalize(&raw)))
    }

    /// Run the whole pipeline for a raw idea.
    ///
    /// The model selector is checked first. Trend-enriched tasks then look up
    /// a trend summary; a no-data result
    /// leaves the prompt unchanged. Saving happens only after a successful
    /// generation and writes the same text that is returned.
    #[instrument(skip(self, idea, options), fields(subsystem = "api", component = "pipeline", op = "run", task = %task, idea_len = idea.len()))]
    pub async fn run(
        &self,
        task: TaskKind,
        idea: &str,
        model: Option<&str>,
        options: RunOptions,
    ) -> Result<TaskRun> {
        if idea.trim().is_empty() {
            return Err(Error::InvalidInput("Idea must not be empty".into()));
        }

        let start = Instant::now();
        let spec = task_spec(task);
        let mut request = TaskRequest::new(task, idea, model);

        // Unknown selectors fail before any outbound call
        self.gateway.registry().resolve(&request.model)?;

        if spec.trend_enriched {
            let report = summarize_trends(self.trends.as_ref(), idea).await?;
            if let Some(text) = report.enrichment_text() {
                request = request.with_trend_context(text);
            }
        }

        let result = self.gateway.run(&request).await?;
        let output = unescape_newlines(&result.normalized);

        let saved_page_id = if options.save_to_notes {
            let saved = self
                .notes
                .save(spec.note_title, &output, options.database_id.as_deref())
                .await?;
            Some(saved.id)
        } else {
            None
        };

        info!(
            model = %request.model,
            response_len = output.len(),
            enriched = request.trend_context.is_some(),
            saved = saved_page_id.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "{}",
            spec.completion_message
        );

        Ok(TaskRun {
            task,
            model: request.model,
            output,
            status: spec.completion_message.to_string(),
            trends: request.trend_context,
            saved_page_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_newlines() {
        assert_eq!(unescape_newlines("a\\nb\\n\\nc"), "a\nb\n\nc");
        assert_eq!(unescape_newlines("already\nreal"), "already\nreal");
    }
}
