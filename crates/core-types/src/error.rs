// In crates/core-types/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Unsupported interval: {0:?}")]
    InvalidInterval(String),
}

pub type Result<T> = std::result::Result<T, Error>;
