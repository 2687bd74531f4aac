//! Data model shared across startup-copilot crates.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::Error;

// =============================================================================
// TASKS
// =============================================================================

/// The five document kinds the copilot can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    /// Automation workflow for the idea.
    Workflow,
    /// Market validation of the idea.
    ValidateIdea,
    /// Business case / venture analysis.
    BusinessCase,
    /// Investor pitch deck outline.
    PitchDeck,
    /// Go-to-market strategy.
    GtmStrategy,
}

impl TaskKind {
    /// Every task kind, in presentation order.
    pub const ALL: [TaskKind; 5] = [
        TaskKind::Workflow,
        TaskKind::ValidateIdea,
        TaskKind::BusinessCase,
        TaskKind::PitchDeck,
        TaskKind::GtmStrategy,
    ];

    /// Stable slug used in URLs and logs.
    pub fn slug(&self) -> &'static str {
        match self {
            TaskKind::Workflow => "workflow",
            TaskKind::ValidateIdea => "validate-idea",
            TaskKind::BusinessCase => "business-case",
            TaskKind::PitchDeck => "pitch-deck",
            TaskKind::GtmStrategy => "gtm-strategy",
        }
    }

    /// Path of the prompt-in/text-out endpoint serving this task.
    pub fn endpoint(&self) -> &'static str {
        match self {
            TaskKind::Workflow => "/generate-workflow",
            TaskKind::ValidateIdea => "/validate-idea",
            TaskKind::BusinessCase => "/business-case",
            TaskKind::PitchDeck => "/pitch-deck",
            TaskKind::GtmStrategy => "/gtm-strategy",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TaskKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_start_matches('/').to_lowercase();
        match normalized.as_str() {
            "workflow" | "generate-workflow" => Ok(TaskKind::Workflow),
            "validate-idea" | "validation" => Ok(TaskKind::ValidateIdea),
            "business-case" => Ok(TaskKind::BusinessCase),
            "pitch-deck" => Ok(TaskKind::PitchDeck),
            "gtm-strategy" | "gtm" => Ok(TaskKind::GtmStrategy),
            _ => Err(Error::InvalidInput(format!("Unknown task: {}", s))),
        }
    }
}

/// One user submission, fully resolved before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRequest {
    pub task: TaskKind,
    /// Free-text idea description as typed by the user.
    pub prompt: String,
    /// Model selector ("zephyr", "mistral").
    pub model: String,
    /// Trend summary text used for enrichment, if any.
    pub trend_context: Option<String>,
}

impl TaskRequest {
    /// Build a request; a missing or blank model falls back to the default selector.
    pub fn new(task: TaskKind, prompt: impl Into<String>, model: Option<&str>) -> Self {
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(defaults::MODEL_SELECTOR);
        Self {
            task,
            prompt: prompt.into(),
            model: model.to_string(),
            trend_context: None,
        }
    }

    /// Attach trend context.
    pub fn with_trend_context(mut self, context: impl Into<String>) -> Self {
        self.trend_context = Some(context.into());
        self
    }
}

/// Raw model output and its normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub raw: String,
    pub normalized: String,
}

// =============================================================================
// GENERATION PARAMETERS
// =============================================================================

/// Decoding parameters sent to a text-generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_new_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub do_sample: bool,
    /// Echo the prompt in front of the generated text.
    pub return_full_text: bool,
}

impl GenerationParams {
    /// Fixed sampling policy with the given token budget.
    pub fn with_budget(max_new_tokens: usize) -> Self {
        Self {
            max_new_tokens,
            ..Self::default()
        }
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_new_tokens: defaults::MAX_NEW_TOKENS,
            temperature: defaults::TEMPERATURE,
            top_p: defaults::TOP_P,
            do_sample: defaults::DO_SAMPLE,
            return_full_text: true,
        }
    }
}

// =============================================================================
// TRENDS
// =============================================================================

/// One interest-over-time observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSample {
    pub date: NaiveDate,
    /// Relative interest, 0-100.
    pub value: u32,
}

// =============================================================================
// NOTES
// =============================================================================

/// A page about to be written to the note store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRecord {
    pub title: String,
    /// Body text, already cut to [`defaults::NOTE_CONTENT_LIMIT`] characters.
    pub content: String,
    pub database_id: String,
}

impl NoteRecord {
    /// Build a record, truncating the content to the store's block limit.
    pub fn new(
        title: impl Into<String>,
        content: &str,
        database_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: truncate_chars(content, defaults::NOTE_CONTENT_LIMIT),
            database_id: database_id.into(),
        }
    }
}

/// Identity of a page created in the note store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedNote {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// One property column of a note-store database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseProperty {
    pub name: String,
    /// Property type as reported by the store ("title", "rich_text", ...).
    pub kind: String,
}

/// Property layout of a note-store database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    pub id: String,
    pub properties: Vec<DatabaseProperty>,
}

impl DatabaseSchema {
    /// Name of the property of kind `title`, if the database has one.
    pub fn title_property(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.kind == "title")
            .map(|p| p.name.as_str())
    }
}

/// Keep the first `limit` characters (Unicode scalar values) of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
