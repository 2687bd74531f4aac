//! # copilot-notes
//!
//! Saves generated documents as pages in a Notion database.
//!
//! [`NotionClient`] speaks the Notion REST API; [`PersistenceRelay`] resolves
//! the target database, finds its title column and writes one page per save.

pub mod notion;
pub mod relay;

pub use notion::{NotionClient, NotionConfig};
pub use relay::PersistenceRelay;
