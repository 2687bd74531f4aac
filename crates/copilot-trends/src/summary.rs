//! Interest-over-time summaries.

use std::fmt;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument};

use copilot_core::{defaults, Result, TrendSample, TrendsProvider};

use crate::keyword::extract_keyword;

/// Statistics over a non-empty 12-month interest series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub keyword: String,
    pub mean: f64,
    pub max: u32,
    /// Date of the first sample reaching `max`.
    pub max_date: NaiveDate,
    pub min: u32,
    /// Date of the first sample reaching `min`.
    pub min_date: NaiveDate,
    /// Last four samples, oldest first.
    pub recent: Vec<u32>,
}

impl TrendSummary {
    /// Summarize a chronological series; `None` when the series is empty.
    pub fn from_samples(keyword: impl Into<String>, samples: &[TrendSample]) -> Option<Self> {
        let first = samples.first()?;

        let mut max = *first;
        let mut min = *first;
        let mut total: u64 = 0;
        for sample in samples {
            if sample.value > max.value {
                max = *sample;
            }
            if sample.value < min.value {
                min = *sample;
            }
            total += u64::from(sample.value);
        }

        let recent_start = samples.len().saturating_sub(defaults::TRENDS_RECENT_SAMPLES);
        Some(Self {
            keyword: keyword.into(),
            mean: total as f64 / samples.len() as f64,
            max: max.value,
            max_date: max.date,
            min: min.value,
            min_date: min.date,
            recent: samples[recent_start..].iter().map(|s| s.value).collect(),
        })
    }
}

impl fmt::Display for TrendSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Google Trends Insight for '{}':", self.keyword)?;
        writeln!(f, "- Average Interest (12 months): {:.2}", self.mean)?;
        writeln!(
            f,
            "- Peak Interest: {:.1} on {}",
            f64::from(self.max),
            self.max_date.format("%Y-%m-%d")
        )?;
        writeln!(
            f,
            "- Lowest Interest: {:.1} on {}",
            f64::from(self.min),
            self.min_date.format("%Y-%m-%d")
        )?;
        writeln!(f, "- Interest Last 4 Weeks: {:?}", self.recent)
    }
}

/// Outcome of a trends lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendReport {
    Summary(TrendSummary),
    /// The source holds no data for the keyword. Not an error.
    NoData { keyword: String },
}

impl TrendReport {
    pub fn keyword(&self) -> &str {
        match self {
            TrendReport::Summary(summary) => &summary.keyword,
            TrendReport::NoData { keyword } => keyword,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, TrendReport::NoData { .. })
    }

    /// Text to append to a prompt; `None` for a no-data result.
    pub fn enrichment_text(&self) -> Option<String> {
        match self {
            TrendReport::Summary(summary) => Some(summary.to_string()),
            TrendReport::NoData { .. } => None,
        }
    }
}

impl fmt::Display for TrendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendReport::Summary(summary) => summary.fmt(f),
            TrendReport::NoData { keyword } => {
                write!(f, "No Google Trends data found for '{}'.", keyword)
            }
        }
    }
}

/// Extract a keyword from `prompt`, fetch its series and summarize it.
///
/// A prompt with no usable keyword yields `NoData` without an outbound call.
/// Transport failures from the provider propagate unchanged.
#[instrument(skip(provider, prompt), fields(subsystem = "trends", component = "summarizer", op = "summarize_trends", prompt_len = prompt.len()))]
pub async fn summarize_trends(provider: &dyn TrendsProvider, prompt: &str) -> Result<TrendReport> {
    let keyword = extract_keyword(prompt);
    if keyword.is_empty() {
        debug!("No keyword in prompt, skipping trends lookup");
        return Ok(TrendReport::NoData { keyword });
    }

    let start = Instant::now();
    let samples = provider.interest_over_time(&keyword).await?;

    let report = match TrendSummary::from_samples(keyword.clone(), &samples) {
        Some(summary) => TrendReport::Summary(summary),
        None => TrendReport::NoData { keyword },
    };

    info!(
        keyword = %report.keyword(),
        sample_count = samples.len(),
        no_data = report.is_no_data(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Trends summary ready"
    );
    Ok(report)
}
