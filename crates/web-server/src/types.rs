// In crates/web-server/src/types.rs

use api_client::LatestPrice;
use core_types::{Interval, Symbol};
use serde::{Deserialize, Serialize};
use strategies::{CrossoverEvent, IndicatorBar, SignalState};

/// Query parameters for `GET /api/data`.
#[derive(Debug, Deserialize)]
pub struct DataParams {
    pub symbol: String,
    // `serde(default = ...)` provides a default value if the param is missing.
    #[serde(default = "default_interval")]
    pub interval: String,
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
    /// IANA zone for the returned timestamps; the configured zone when absent.
    pub timezone: Option<String>,
}

fn default_interval() -> String { Interval::default().as_str().to_string() }

/// Body of `GET /api/data`.
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub symbol: Symbol,
    pub interval: Interval,
    pub timezone: String,
    pub signal: SignalState,
    pub signal_label: &'static str,
    pub events: Vec<CrossoverEvent>,
    pub data: Vec<IndicatorBar>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistEntry {
    pub symbol: Symbol,
    pub price: LatestPrice,
}

/// Body of `GET /api/watchlist`.
#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub watchlist: Vec<WatchlistEntry>,
}
