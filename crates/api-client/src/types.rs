// In crates/api-client/src/types.rs

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use core_types::{Interval, Symbol};
use reqwest::Client;
use serde::{Deserialize, Serialize, Serializer};

/// The client for the Yahoo Finance chart API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The persistent HTTP client (carries the timeout and user agent).
    pub http_client: Client,
    /// The base URL of the chart API.
    pub base_url: String,
}

/// Which slice of history to request.
#[derive(Debug, Clone, PartialEq)]
pub enum BarRange {
    /// An explicit `[start, end)` window.
    Between { start: DateTime<Utc>, end: DateTime<Utc> },
    /// A provider-relative period ending now (e.g., "1d", "5d", "1mo").
    Period(String),
}

/// A single bars query.
#[derive(Debug, Clone, PartialEq)]
pub struct BarsRequest {
    pub symbol: Symbol,
    pub interval: Interval,
    pub range: BarRange,
    /// Zone the returned timestamps are converted to.
    pub timezone: Tz,
}

/// Best-effort last traded price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LatestPrice {
    Price(f64),
    Unavailable,
}

impl LatestPrice {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LatestPrice::Price(price) => Some(*price),
            LatestPrice::Unavailable => None,
        }
    }
}

/// Prices go on the wire as plain numbers, the missing case as `"N/A"`.
impl Serialize for LatestPrice {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            LatestPrice::Price(price) => serializer.serialize_f64(*price),
            LatestPrice::Unavailable => serializer.serialize_str("N/A"),
        }
    }
}

// --- Raw chart API response ---

/// Top-level `/v8/finance/chart/{symbol}` body.
#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    /// Unix seconds, one per row. Absent when the provider has no data.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<QuoteColumns>,
}

/// Column-oriented OHLCV arrays, parallel to `ChartResult::timestamp`.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteColumns {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}
