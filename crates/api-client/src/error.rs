// In crates/api-client/src/error.rs

use thiserror::Error;

/// Everything that can go wrong talking to the provider.
///
/// These never reach the `MarketDataSource` caller: the trait methods log them
/// and fall back to an empty series or an unavailable price.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to build the API client: {0}")]
    ClientBuildError(String),
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(#[from] serde_json::Error),
    #[error("API error: code {code}, msg: {msg}")]
    ApiError { code: String, msg: String },
    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
