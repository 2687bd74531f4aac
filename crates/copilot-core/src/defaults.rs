//! Centralized default constants for startup-copilot.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// GENERATION
// =============================================================================

/// Upper bound on generated tokens per call, regardless of remaining context.
pub const MAX_NEW_TOKENS: usize = 1024;

/// Lower bound on generated tokens per call. Never request zero.
pub const MIN_NEW_TOKENS: usize = 1;

/// Sampling temperature.
pub const TEMPERATURE: f32 = 0.5;

/// Nucleus sampling mass.
pub const TOP_P: f32 = 0.9;

/// Stochastic sampling flag. Disabled: decoding is greedy-style.
pub const DO_SAMPLE: bool = false;

/// Context window of the hosted 7B instruct models.
pub const MODEL_CONTEXT_TOKENS: usize = 4096;

/// Model selector used when a request does not name one.
pub const MODEL_SELECTOR: &str = "zephyr";

// =============================================================================
// INFERENCE ENDPOINT
// =============================================================================

/// Default base URL for the hosted text-generation endpoints.
pub const INFERENCE_URL: &str = "http://127.0.0.1:8080";

/// Time limit for a generation call (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 300;

/// Time limit for workflow generation, which produces the longest documents.
pub const WORKFLOW_GEN_TIMEOUT_SECS: u64 = 600;

/// Time limit for endpoint health checks (seconds).
pub const HEALTH_TIMEOUT_SECS: u64 = 5;

/// Time limit for endpoint tokenization calls (seconds).
pub const TOKENIZE_TIMEOUT_SECS: u64 = 10;

/// Generations slower than this are logged with `slow = true`.
pub const SLOW_GENERATION_MS: u64 = 30_000;

// =============================================================================
// TRENDS
// =============================================================================

/// Default trends API base.
pub const TRENDS_URL: &str = "https://trends.google.com";

/// Host language sent to the trends API.
pub const TRENDS_HOST_LANGUAGE: &str = "en-US";

/// Timezone offset (minutes) sent to the trends API.
pub const TRENDS_TZ_OFFSET: i32 = 330;

/// Interest-over-time window.
pub const TRENDS_TIMEFRAME: &str = "today 12-m";

/// Trends category (0 = all categories).
pub const TRENDS_CATEGORY: u32 = 0;

/// Trends region ("" = worldwide).
pub const TRENDS_GEO: &str = "";

/// Trends search property ("" = web search).
pub const TRENDS_PROPERTY: &str = "";

/// Number of most recent samples echoed in the summary.
pub const TRENDS_RECENT_SAMPLES: usize = 4;

/// Maximum number of words kept in a derived keyword.
pub const KEYWORD_MAX_WORDS: usize = 6;

/// Time limit for each trends round trip (seconds).
pub const TRENDS_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// NOTE STORE
// =============================================================================

/// Default note-store API base.
pub const NOTION_URL: &str = "https://api.notion.com/v1";

/// Note-store API version header value.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Hard limit on characters in one rich-text block of the note store.
pub const NOTE_CONTENT_LIMIT: usize = 2000;

/// Time limit for note-store calls (seconds).
pub const NOTION_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// SERVER
// =============================================================================

/// Default listen host.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Default listen port.
pub const SERVER_PORT: u16 = 3000;
