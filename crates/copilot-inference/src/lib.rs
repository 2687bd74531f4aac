//! # copilot-inference
//!
//! Everything between a composed prompt and the text shown to the user.
//!
//! This crate provides:
//! - The declarative task table (system instruction, enrichment, wrapping)
//! - The prompt composer
//! - Model configuration and chat templates for the hosted instruct models
//! - A single-flight model cache
//! - The inference gateway (token budget, sampling policy, time limits)
//! - The output normalizer
//! - A Text-Generation-Inference compatible HTTP backend
//!
//! # Example
//!
//! ```rust,no_run
//! use copilot_inference::{normalize, InferenceGateway};
//! use copilot_core::TaskKind;
//!
//! #[tokio::main]
//! async fn main() {
//!     let gateway = InferenceGateway::from_env();
//!     let raw = gateway
//!         .generate(TaskKind::Workflow, "A CRM for dog groomers", "zephyr")
//!         .await
//!         .unwrap();
//!     println!("{}", normalize(&raw));
//! }
//! ```

pub mod cache;
pub mod chat_template;
pub mod compose;
pub mod gateway;
pub mod loader;
pub mod model_config;
pub mod normalize;
pub mod tasks;
pub mod tgi;

// In-memory generation backend for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use copilot_core::*;

pub use cache::{LoadedModel, ModelCache};
pub use chat_template::{ChatMessage, ChatTemplate};
pub use compose::compose;
pub use gateway::{max_new_tokens, InferenceGateway};
pub use loader::{HostedModelLoader, ModelLoader};
pub use model_config::{ModelConfig, ModelRegistry};
pub use normalize::normalize;
pub use tasks::{task_spec, PromptWrapping, TaskSpec, TASKS};
pub use tgi::{TgiBackend, TgiConfig};
