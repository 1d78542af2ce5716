// In crates/strategies/src/types.rs

use core_types::{Bar, Interval, Symbol};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MACrossoverSettings {
    /// Number of trailing closes in the fast average.
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    /// Number of trailing closes in the slow average.
    #[serde(default = "default_long_window")]
    pub long_window: usize,
}

impl MACrossoverSettings {
    pub fn new(short_window: usize, long_window: usize) -> Result<Self> {
        let settings = Self { short_window, long_window };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.short_window == 0 || self.short_window >= self.long_window {
            return Err(Error::InvalidWindows {
                short: self.short_window,
                long: self.long_window,
            });
        }
        Ok(())
    }
}

impl Default for MACrossoverSettings {
    fn default() -> Self {
        Self {
            short_window: default_short_window(),
            long_window: default_long_window(),
        }
    }
}

fn default_short_window() -> usize { 5 }
fn default_long_window() -> usize { 20 }

/// The discrete signal carried by each bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalState {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl SignalState {
    /// Human-readable label shown next to the chart.
    pub fn label(&self) -> &'static str {
        match self {
            SignalState::Buy => "Buy signal",
            SignalState::Sell => "Sell signal",
            SignalState::Hold => "Hold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CrossoverKind {
    Buy,
    Sell,
}

impl CrossoverKind {
    /// The `position_delta` encoding of this crossing.
    pub fn delta(&self) -> i8 {
        match self {
            CrossoverKind::Buy => 1,
            CrossoverKind::Sell => -1,
        }
    }
}

impl From<CrossoverKind> for SignalState {
    fn from(kind: CrossoverKind) -> Self {
        match kind {
            CrossoverKind::Buy => SignalState::Buy,
            CrossoverKind::Sell => SignalState::Sell,
        }
    }
}

/// A detected crossing of the two averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossoverEvent {
    pub bar_index: usize,
    pub kind: CrossoverKind,
}

/// A bar plus the indicator columns computed for it.
///
/// The bar's own fields are flattened so every record serializes as one flat
/// mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBar {
    #[serde(flatten)]
    pub bar: Bar,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    pub signal_state: SignalState,
    pub position_delta: i8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub symbol: Symbol,
    pub interval: Interval,
    pub rows: Vec<IndicatorBar>,
}

/// Everything a strategy produces for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub series: IndicatorSeries,
    pub current_state: SignalState,
    pub events: Vec<CrossoverEvent>,
}
