// In crates/app-config/src/types.rs

use chrono_tz::Tz;
use serde::Deserialize;

use core_types::Symbol;
use strategies::MACrossoverSettings;

use crate::error::{Error, Result};

/// Upper bound for `market_data.lookback_days` (ten years of history).
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

#[derive(Deserialize, Debug, Clone)]
pub struct Settings {
    /// The application's general settings.
    pub app: AppSettings,
    pub server: ServerSettings,
    /// Settings for the market-data provider.
    pub market_data: MarketDataSettings,
    /// Default windows for the crossover strategy.
    #[serde(default)]
    pub strategy: MACrossoverSettings,
    /// The tickers shown on the index page and the watchlist endpoint.
    #[serde(default)]
    pub watchlist: Vec<String>,
}

impl Settings {
    /// Checks everything serde cannot: window ordering, the timezone name, the
    /// lookback range and every watchlist ticker.
    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;
        self.market_data.timezone()?;
        self.market_data.validate_lookback()?;
        self.watchlist()?;
        Ok(())
    }

    pub fn watchlist(&self) -> Result<Vec<Symbol>> {
        self.watchlist
            .iter()
            .map(|raw| Symbol::parse(raw).map_err(Error::from))
            .collect()
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    /// The environment the application is running in (e.g., "development", "production").
    pub environment: String,
    /// The log level for the application.
    pub log_level: String,
}

impl AppSettings {
    /// Development mode exposes internal error detail in HTTP responses.
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct MarketDataSettings {
    /// The REST base URL of the chart API.
    pub base_url: String,
    /// Upper bound for a single outbound request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// IANA name of the zone every bar timestamp is converted to.
    pub timezone: String,
    /// How many days of history `/api/data` requests.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl MarketDataSettings {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| Error::InvalidTimezone(self.timezone.clone()))
    }

    pub fn validate_lookback(&self) -> Result<()> {
        if (1..=MAX_LOOKBACK_DAYS).contains(&self.lookback_days) {
            Ok(())
        } else {
            Err(Error::InvalidLookback { value: self.lookback_days, max: MAX_LOOKBACK_DAYS })
        }
    }
}

/// Helper functions for serde defaults
fn default_timeout_secs() -> u64 { 10 }
fn default_lookback_days() -> i64 { 5 }
fn default_static_dir() -> String { "static".to_string() }
fn default_user_agent() -> String { "Mozilla/5.0 (compatible; ma-signal-server/0.1)".to_string() }
