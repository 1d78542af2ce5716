// In crates/strategies/src/error.rs

use thiserror::Error;

/// Structurally invalid input to a strategy. Too little history is not an
/// error; strategies report it as a `Hold` with no events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid windows: short_window ({short}) must be positive and smaller than long_window ({long})")]
    InvalidWindows { short: usize, long: usize },

    #[error("Bars are not in ascending timestamp order (first offending index: {index})")]
    OutOfOrder { index: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
