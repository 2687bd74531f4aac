//! Local token counting for context-budget management.
//!
//! Hosted endpoints count prompts with the served model's own vocabulary
//! (see `TextGenerationBackend::count_tokens`). The tokenizers here are the
//! fallback for endpoints that cannot tokenize, and `WhitespaceTokenizer` is
//! a deterministic stand-in for tests.

use crate::error::{Error, Result};

/// Trait for tokenization operations.
///
/// Implementations must be thread-safe: one instance is shared by every
/// request that targets the same model.
pub trait Tokenizer: Send + Sync {
    /// Count the number of tokens in the given text.
    fn count_tokens(&self, text: &str) -> usize;

    /// Get the name/identifier of this tokenizer.
    fn name(&self) -> &str;
}

/// Tiktoken-based tokenizer implementation.
///
/// Llama-family vocabularies are not bundled, so `cl100k_base` is only an
/// approximation of the 7B instruct models' sentencepiece counts. It
/// undercounts digit runs (one token per digit there, up to three per token
/// here), so budgets derived from it are not guaranteed to fit the window.
pub struct TiktokenTokenizer {
    bpe: tiktoken_rs::CoreBPE,
    name: String,
}

impl TiktokenTokenizer {
    /// Create a `cl100k_base` tokenizer.
    pub fn cl100k() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| Error::Internal(format!("Failed to initialize cl100k_base: {}", e)))?;

        Ok(Self {
            bpe,
            name: "cl100k_base".to_string(),
        })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Counts whitespace-separated pieces. Deterministic, for tests and dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn name(&self) -> &str {
        "whitespace"
    }
}
