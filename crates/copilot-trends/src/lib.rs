//! # copilot-trends
//!
//! Market-interest context for trend-enriched tasks.
//!
//! A short keyword is cut from the idea text, its 12-month interest series is
//! fetched from Google Trends and reduced to a [`TrendReport`]: either a
//! fixed-format summary or an explicit no-data result. Only a summary is ever
//! used as prompt enrichment.

pub mod google;
pub mod keyword;
pub mod summary;

pub use google::{GoogleTrendsClient, GoogleTrendsConfig};
pub use keyword::extract_keyword;
pub use summary::{summarize_trends, TrendReport, TrendSummary};
