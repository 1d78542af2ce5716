// In crates/app-config/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load configuration")]
    LoadError(#[from] config::ConfigError),

    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    #[error("lookback_days must be between 1 and {max}, got {value}")]
    InvalidLookback { value: i64, max: i64 },

    #[error("Invalid watchlist entry: {0}")]
    InvalidWatchlist(#[from] core_types::Error),

    #[error("Invalid strategy settings: {0}")]
    InvalidStrategy(#[from] strategies::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
