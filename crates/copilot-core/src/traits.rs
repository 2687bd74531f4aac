//! Trait definitions for the external collaborators.
//!
//! Each external system (hosted model endpoint, trends source, note store)
//! is reached through one of these traits so the pipeline can be exercised
//! against in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{DatabaseSchema, GenerationParams, NoteRecord, SavedNote, TrendSample};

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for raw text generation against one hosted model.
///
/// The backend receives an already rendered prompt (chat template applied)
/// and returns the decoded text verbatim, special tokens included.
#[async_trait]
pub trait TextGenerationBackend: Send + Sync {
    /// Generate text for a rendered prompt.
    async fn generate_text(&self, inputs: &str, params: &GenerationParams) -> Result<String>;

    /// Count the tokens of a rendered prompt with the served model's own
    /// tokenizer.
    ///
    /// `Ok(None)` means the endpoint cannot tokenize; callers then fall back
    /// to a local approximation.
    async fn count_tokens(&self, _inputs: &str) -> Result<Option<usize>> {
        Ok(None)
    }

    /// Check if the endpoint is available and responding.
    async fn health_check(&self) -> Result<bool>;

    /// Get the model name being served.
    fn model_name(&self) -> &str;
}

// =============================================================================
// TRENDS TRAITS
// =============================================================================

/// Source of interest-over-time series.
#[async_trait]
pub trait TrendsProvider: Send + Sync {
    /// Fetch the interest-over-time series for one keyword, oldest first.
    ///
    /// An empty vector means the source holds no data for the keyword.
    async fn interest_over_time(&self, keyword: &str) -> Result<Vec<TrendSample>>;
}

// =============================================================================
// NOTE STORE TRAITS
// =============================================================================

/// Write-only access to a database-backed note store.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Retrieve the property layout of a database.
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseSchema>;

    /// Create one page in `record.database_id`, setting `title_property` to the title.
    async fn create_page(&self, record: &NoteRecord, title_property: &str) -> Result<SavedNote>;
}
