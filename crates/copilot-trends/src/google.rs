//! Google Trends interest-over-time client.
//!
//! The public site has no documented API; this follows the same three calls
//! the web UI makes:
//! 1. `GET /?geo=US` to obtain session cookies
//! 2. `GET /trends/api/explore` to obtain the TIMESERIES widget token
//! 3. `GET /trends/api/widgetdata/multiline` to read the series
//!
//! Both API responses carry an anti-hijacking prefix before the JSON body.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

use copilot_core::{defaults, Error, Result, TrendSample, TrendsProvider};

const EXPLORE_PATH: &str = "/trends/api/explore";
const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";
const TIMESERIES_WIDGET: &str = "TIMESERIES";

/// Query settings for the interest-over-time lookup.
#[derive(Debug, Clone)]
pub struct GoogleTrendsConfig {
    pub base_url: String,
    pub host_language: String,
    /// Timezone offset in minutes, as the web UI sends it.
    pub tz_offset: i32,
    pub timeframe: String,
    pub category: u32,
    /// Empty for worldwide.
    pub geo: String,
    /// Empty for web search.
    pub property: String,
    pub timeout_seconds: u64,
}

impl Default for GoogleTrendsConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::TRENDS_URL.to_string(),
            host_language: defaults::TRENDS_HOST_LANGUAGE.to_string(),
            tz_offset: defaults::TRENDS_TZ_OFFSET,
            timeframe: defaults::TRENDS_TIMEFRAME.to_string(),
            category: defaults::TRENDS_CATEGORY,
            geo: defaults::TRENDS_GEO.to_string(),
            property: defaults::TRENDS_PROPERTY.to_string(),
            timeout_seconds: defaults::TRENDS_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    request: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: Timeline,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    /// Unix seconds, as a string.
    time: String,
    #[serde(default)]
    value: Vec<u32>,
}

/// Client for the Google Trends web endpoints.
pub struct GoogleTrendsClient {
    client: Client,
    config: GoogleTrendsConfig,
}

impl GoogleTrendsClient {
    pub fn new(config: GoogleTrendsConfig) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Trends(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables.
    ///
    /// - `TRENDS_BASE_URL`: trends site root (default `https://trends.google.com`)
    pub fn from_env() -> Result<Self> {
        let config = GoogleTrendsConfig {
            base_url: std::env::var("TRENDS_BASE_URL")
                .unwrap_or_else(|_| defaults::TRENDS_URL.to_string()),
            ..GoogleTrendsConfig::default()
        };
        Self::new(config)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn api_url(&self, path: &str, req: &serde_json::Value, token: Option<&str>) -> String {
        let mut url = format!(
            "{}?hl={}&tz={}&req={}",
            self.url(path),
            urlencoding::encode(&self.config.host_language),
            self.config.tz_offset,
            urlencoding::encode(&req.to_string())
        );
        if let Some(token) = token {
            url.push_str("&token=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }

    async fn prime_cookies(&self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/?geo=US", self.config.base_url.trim_end_matches('/')))
            .send()
            .await
            .map_err(|e| Error::Trends(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Cookie priming returned non-success status");
        }
        Ok(())
    }

    async fn get_api<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Trends(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Trends(format!(
                "Google Trends returned {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Trends(format!("Failed to read response: {}", e)))?;
        parse_prefixed_json(&body)
    }

    fn explore_request(&self, keyword: &str) -> serde_json::Value {
        json!({
            "comparisonItem": [{
                "keyword": keyword,
                "time": self.config.timeframe,
                "geo": self.config.geo,
            }],
            "category": self.config.category,
            "property": self.config.property,
        })
    }
}

/// Strip the anti-hijacking prefix and parse the JSON that follows.
fn parse_prefixed_json<T: DeserializeOwned>(body: &str) -> Result<T> {
    let start = body
        .find('{')
        .ok_or_else(|| Error::Trends("Response carried no JSON object".into()))?;
    serde_json::from_str(&body[start..])
        .map_err(|e| Error::Trends(format!("Failed to parse response: {}", e)))
}

fn to_samples(points: Vec<TimelinePoint>) -> Vec<TrendSample> {
    points
        .into_iter()
        .filter_map(|point| {
            let value = *point.value.first()?;
            let secs: i64 = point.time.parse().ok()?;
            let date = DateTime::from_timestamp(secs, 0)?.date_naive();
            Some(TrendSample { date, value })
        })
        .collect()
}

#[async_trait]
impl TrendsProvider for GoogleTrendsClient {
    #[instrument(skip(self), fields(subsystem = "trends", component = "google_trends", op = "interest_over_time", keyword = %keyword))]
    async fn interest_over_time(&self, keyword: &str) -> Result<Vec<TrendSample>> {
        self.prime_cookies().await?;

        let explore_url = self.api_url(EXPLORE_PATH, &self.explore_request(keyword), None);
        let explore: ExploreResponse = self.get_api(&explore_url).await?;

        let widget = explore
            .widgets
            .into_iter()
            .find(|w| w.id == TIMESERIES_WIDGET)
            .ok_or_else(|| Error::Trends("Explore response had no TIMESERIES widget".into()))?;

        let multiline_url = self.api_url(MULTILINE_PATH, &widget.request, Some(&widget.token));
        let series: MultilineResponse = self.get_api(&multiline_url).await?;

        let samples = to_samples(series.default.timeline_data);
        debug!(sample_count = samples.len(), "Interest series fetched");
        Ok(samples)
    }
}
