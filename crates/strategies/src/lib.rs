// In crates/strategies/src/lib.rs

use core_types::BarSeries;

pub mod error;
pub mod ma_crossover;
pub mod types;

pub use error::{Error, Result};
pub use ma_crossover::MACrossover;
pub use types::{
    CrossoverEvent, CrossoverKind, IndicatorBar, IndicatorSeries, MACrossoverSettings,
    SignalReport, SignalState,
};

/// The universal interface for a signal strategy.
///
/// A strategy turns a series of bars into the same series annotated with its
/// indicator columns, a current signal state and the list of transitions that
/// produced it. Strategies are pure: the input is only borrowed and the same
/// input always yields the same report, so one instance can be shared freely
/// between concurrent requests.
pub trait Strategy: Send + Sync {
    /// The name of the strategy.
    fn name(&self) -> &'static str;

    /// Annotates `series` with this strategy's indicators and signals.
    fn compute(&self, series: &BarSeries) -> Result<SignalReport>;
}
