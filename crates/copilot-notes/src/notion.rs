//! Notion REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use copilot_core::{
    defaults, DatabaseProperty, DatabaseSchema, Error, NoteRecord, NoteStore, Result, SavedNote,
};

/// Configuration for the Notion API.
#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub base_url: String,
    /// Integration token.
    pub token: String,
    /// Value of the `Notion-Version` header.
    pub api_version: String,
    pub timeout_seconds: u64,
}

impl NotionConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: defaults::NOTION_URL.to_string(),
            token: token.into(),
            api_version: defaults::NOTION_VERSION.to_string(),
            timeout_seconds: defaults::NOTION_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DatabaseResponse {
    id: String,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct NotionErrorResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Notion API client implementing [`NoteStore`].
pub struct NotionClient {
    client: Client,
    config: NotionConfig,
}

impl NotionClient {
    pub fn new(config: NotionConfig) -> Result<Self> {
        if config.token.trim().is_empty() {
            return Err(Error::Config("Notion token is empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::NoteStore(format!("Failed to create HTTP client: {}", e)))?;

        info!("Initializing Notion client: url={}", config.base_url);
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    ///
    /// - `NOTION_TOKEN`: integration token (required)
    /// - `NOTION_BASE_URL`: API base (default `https://api.notion.com/v1`)
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("NOTION_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("Missing required Notion credentials: NOTION_TOKEN is not set".into())
            })?;

        let mut config = NotionConfig::new(token);
        if let Ok(base_url) = std::env::var("NOTION_BASE_URL") {
            config.base_url = base_url;
        }
        Self::new(config)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.config.token))
            .header("Notion-Version", &self.config.api_version)
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = req
            .send()
            .await
            .map_err(|e| Error::NoteStore(format!("Request failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<NotionErrorResponse>(&body) {
            Ok(err) if !err.message.is_empty() => format!("{} ({})", err.message, err.code),
            _ => body,
        };
        Err(Error::NoteStore(format!(
            "Notion returned {}: {}",
            status, detail
        )))
    }
}

/// Request body for creating one page with a title and a single paragraph.
fn page_body(record: &NoteRecord, title_property: &str) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        title_property.to_string(),
        json!({ "title": [{ "text": { "content": record.title } }] }),
    );

    json!({
        "parent": { "database_id": record.database_id },
        "properties": properties,
        "children": [{
            "object": "block",
            "type": "paragraph",
            "paragraph": {
                "rich_text": [{ "type": "text", "text": { "content": record.content } }]
            }
        }]
    })
}

#[async_trait]
impl NoteStore for NotionClient {
    #[instrument(skip(self), fields(subsystem = "notes", component = "notion", op = "retrieve_database", database_id = %database_id))]
    async fn retrieve_database(&self, database_id: &str) -> Result<DatabaseSchema> {
        let path = format!("/databases/{}", sanitize_id(database_id));
        let response = self.send(self.request(reqwest::Method::GET, &path)).await?;

        let database: DatabaseResponse = response
            .json()
            .await
            .map_err(|e| Error::NoteStore(format!("Failed to parse response: {}", e)))?;

        let properties = database
            .properties
            .into_iter()
            .map(|(name, value)| DatabaseProperty {
                name,
                kind: value
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect();

        Ok(DatabaseSchema {
            id: database.id,
            properties,
        })
    }

    #[instrument(skip(self, record), fields(subsystem = "notes", component = "notion", op = "create_page", database_id = %record.database_id, content_len = record.content.len()))]
    async fn create_page(&self, record: &NoteRecord, title_property: &str) -> Result<SavedNote> {
        let response = self
            .send(
                self.request(reqwest::Method::POST, "/pages")
                    .json(&page_body(record, title_property)),
            )
            .await?;

        let page: SavedNote = response
            .json()
            .await
            .map_err(|e| Error::NoteStore(format!("Failed to parse response: {}", e)))?;

        debug!(page_id = %page.id, "Page created");
        Ok(page)
    }
}

/// Database ids are UUIDs with or without dashes; other characters are dropped.
fn sanitize_id(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}
