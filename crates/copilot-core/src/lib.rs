//! # copilot-core
//!
//! Core types, traits, and abstractions for startup-copilot.
//!
//! This crate provides the data model shared by every other crate (task
//! kinds, trend summaries, note records), the backend traits the external
//! collaborators are reached through, and the common error type.

pub mod defaults;
pub mod error;
pub mod models;
pub mod tokenizer;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use tokenizer::*;
pub use traits::*;
