//! Persistence relay: one generated document in, one note page out.

use std::sync::Arc;

use tracing::{info, instrument};

use copilot_core::{Error, NoteRecord, NoteStore, Result, SavedNote};

use crate::notion::NotionClient;

/// Writes generated documents to a note-store database.
///
/// Each call writes a new page. There is no deduplication, so retrying a
/// save after a timeout can leave two pages with the same content.
pub struct PersistenceRelay {
    store: Arc<dyn NoteStore>,
    default_database_id: Option<String>,
}

impl PersistenceRelay {
    pub fn new(store: Arc<dyn NoteStore>, default_database_id: Option<String>) -> Self {
        Self {
            store,
            default_database_id: default_database_id.filter(|id| !id.trim().is_empty()),
        }
    }

    /// Notion-backed relay from environment variables.
    ///
    /// - `NOTION_TOKEN`: required, see [`NotionClient::from_env`]
    /// - `NOTION_DATABASE_ID1`: optional default database id
    pub fn from_env() -> Result<Self> {
        let client = NotionClient::from_env()?;
        Ok(Self::new(
            Arc::new(client),
            std::env::var("NOTION_DATABASE_ID1").ok(),
        ))
    }

    pub fn default_database_id(&self) -> Option<&str> {
        self.default_database_id.as_deref()
    }

    /// Pick the explicit id when non-empty, else the configured default.
    fn resolve_database_id(&self, database_id: Option<&str>) -> Result<String> {
        database_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or(self.default_database_id.as_deref())
            .map(str::to_string)
            .ok_or_else(|| Error::Config("Missing Notion database id".into()))
    }

    /// Save `content` under `title`, truncated to the first 2000 characters.
    #[instrument(skip(self, content), fields(subsystem = "notes", component = "relay", op = "save", title = %title, content_len = content.len()))]
    pub async fn save(
        &self,
        title: &str,
        content: &str,
        database_id: Option<&str>,
    ) -> Result<SavedNote> {
        let database_id = self.resolve_database_id(database_id)?;

        let schema = self.store.retrieve_database(&database_id).await?;
        let title_property = schema.title_property().ok_or_else(|| {
            Error::Config(format!(
                "No title property found in Notion database {}",
                database_id
            ))
        })?;

        let record = NoteRecord::new(title, content, database_id);
        let saved = self.store.create_page(&record, title_property).await?;

        info!(
            database_id = %record.database_id,
            page_id = %saved.id,
            "Note saved"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use copilot_core::{DatabaseProperty, DatabaseSchema};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        title_kind: &'static str,
        pages: Mutex<Vec<(NoteRecord, String)>>,
        lookups: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NoteStore for MemoryStore {
        async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseSchema> {
            self.lookups.lock().unwrap().push(database_id.to_string());
            Ok(DatabaseSchema {
                id: database_id.to_string(),
                properties: vec![
                    DatabaseProperty {
                        name: "Status".into(),
                        kind: "select".into(),
                    },
                    DatabaseProperty {
                        name: "Idea".into(),
                        kind: self.title_kind.into(),
                    },
                ],
            })
        }

        async fn create_page(&self, record: &NoteRecord, title_property: &str) -> Result<SavedNote> {
            let mut pages = self.pages.lock().unwrap();
            pages.push((record.clone(), title_property.to_string()));
            Ok(SavedNote {
                id: format!("page-{}", pages.len()),
                url: None,
            })
        }
    }

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore {
            title_kind: "title",
            ..MemoryStore::default()
        })
    }

    #[tokio::test]
    async fn test_save_uses_title_property_and_truncates() {
        let store = store();
        let relay = PersistenceRelay::new(store.clone(), Some("default-db".into()));

        let content = "a".repeat(2500);
        let saved = relay.save("Business Case", &content, None).await.unwrap();
        assert_eq!(saved.id, "page-1");

        let pages = store.pages.lock().unwrap();
        let (record, title_property) = &pages[0];
        assert_eq!(title_property, "Idea");
        assert_eq!(record.title, "Business Case");
        assert_eq!(record.database_id, "default-db");
        assert_eq!(record.content, "a".repeat(2000));
    }

    #[tokio::test]
    async fn test_explicit_database_id_wins() {
        let store = store();
        let relay = PersistenceRelay::new(store.clone(), Some("default-db".into()));
        relay.save("t", "c", Some("user-db")).await.unwrap();
        assert_eq!(store.lookups.lock().unwrap().as_slice(), ["user-db"]);
    }

    #[tokio::test]
    async fn test_blank_database_id_falls_back_to_default() {
        let store = store();
        let relay = PersistenceRelay::new(store.clone(), Some("default-db".into()));
        relay.save("t", "c", Some("   ")).await.unwrap();
        assert_eq!(store.lookups.lock().unwrap().as_slice(), ["default-db"]);
    }

    #[tokio::test]
    async fn test_missing_database_id_is_config_error() {
        let store = store();
        let relay = PersistenceRelay::new(store.clone(), Some(String::new()));
        let err = relay.save("t", "c", None).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(store.lookups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_title_property_is_config_error() {
        let store = Arc::new(MemoryStore {
            title_kind: "rich_text",
            ..MemoryStore::default()
        });
        let relay = PersistenceRelay::new(store.clone(), Some("db".into()));
        let err = relay.save("t", "c", None).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(store.pages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_saves_create_separate_pages() {
        let store = store();
        let relay = PersistenceRelay::new(store.clone(), Some("db".into()));
        relay.save("t", "same", None).await.unwrap();
        let second = relay.save("t", "same", None).await.unwrap();
        assert_eq!(second.id, "page-2");
        assert_eq!(store.pages.lock().unwrap().len(), 2);
    }
}
