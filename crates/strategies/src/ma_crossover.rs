// In crates/strategies/src/ma_crossover.rs

use crate::types::{
    CrossoverEvent, CrossoverKind, IndicatorBar, IndicatorSeries, MACrossoverSettings,
    SignalReport, SignalState,
};
use crate::{Error, Result, Strategy};
use core_types::BarSeries;
use std::cmp::Ordering;

/// Dual simple-moving-average crossover.
///
/// A BUY fires on the bar where the short average moves from at-or-below the
/// long average to strictly above it; a SELL on the mirror move.
///
/// Detection starts at bar `long_window`. Everything before it counts as "not
/// above", so that first bar emits a BUY when the short average is above the
/// long one and can never emit a SELL. Later bars compare consecutive pairs
/// where both averages are defined.
#[derive(Debug, Clone)]
pub struct MACrossover {
    settings: MACrossoverSettings,
}

impl MACrossover {
    /// Creates a new `MACrossover` strategy instance from its settings.
    pub fn new(settings: MACrossoverSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }
}

impl Strategy for MACrossover {
    fn name(&self) -> &'static str {
        "MACrossover"
    }

    fn compute(&self, series: &BarSeries) -> Result<SignalReport> {
        if let Some(index) = series.first_out_of_order() {
            return Err(Error::OutOfOrder { index });
        }

        let short_window = self.settings.short_window;
        let long_window = self.settings.long_window;

        // 1. Not enough history: every column stays null and the answer is Hold.
        if series.len() < long_window {
            tracing::debug!(
                symbol = %series.symbol,
                bars = series.len(),
                long_window,
                "Not enough bars for the long average; reporting Hold."
            );
            let rows = series
                .bars
                .iter()
                .map(|bar| IndicatorBar {
                    bar: bar.clone(),
                    ma_short: None,
                    ma_long: None,
                    signal_state: SignalState::Hold,
                    position_delta: 0,
                })
                .collect();
            return Ok(SignalReport {
                series: IndicatorSeries {
                    symbol: series.symbol.clone(),
                    interval: series.interval,
                    rows,
                },
                current_state: SignalState::Hold,
                events: Vec::new(),
            });
        }

        // 2. Both averages over the close column.
        let closes = series.closes();
        let ma_short = rolling_mean(&closes, short_window);
        let ma_long = rolling_mean(&closes, long_window);

        // 3. Walk the bars from the detection start, comparing each defined pair
        //    with the previous one.
        let mut current_state = SignalState::Hold;
        let mut events = Vec::new();
        let mut previous: Option<(f64, f64)> = None;
        let mut rows = Vec::with_capacity(series.len());

        for (index, bar) in series.bars.iter().enumerate() {
            let current = ma_short[index].zip(ma_long[index]);
            let crossing = match index.cmp(&long_window) {
                Ordering::Less => None,
                Ordering::Equal => {
                    current.and_then(|(short, long)| (short > long).then_some(CrossoverKind::Buy))
                }
                Ordering::Greater => {
                    previous.zip(current).and_then(|(prev, now)| detect_crossing(prev, now))
                }
            };

            if let Some(kind) = crossing {
                events.push(CrossoverEvent { bar_index: index, kind });
                current_state = kind.into();
            }

            rows.push(IndicatorBar {
                bar: bar.clone(),
                ma_short: ma_short[index],
                ma_long: ma_long[index],
                signal_state: current_state,
                // The event list is the source of truth; the delta is its sign.
                position_delta: crossing.map_or(0, |kind| kind.delta()),
            });
            previous = current;
        }

        tracing::debug!(
            symbol = %series.symbol,
            bars = series.len(),
            events = events.len(),
            state = ?current_state,
            "Computed moving-average crossover signals."
        );

        Ok(SignalReport {
            series: IndicatorSeries {
                symbol: series.symbol.clone(),
                interval: series.interval,
                rows,
            },
            current_state,
            events,
        })
    }
}

/// `previous` and `current` are `(short, long)` pairs from consecutive bars.
fn detect_crossing(previous: (f64, f64), current: (f64, f64)) -> Option<CrossoverKind> {
    let (prev_short, prev_long) = previous;
    let (short, long) = current;

    if prev_short <= prev_long && short > long {
        Some(CrossoverKind::Buy)
    } else if prev_short >= prev_long && short < long {
        Some(CrossoverKind::Sell)
    } else {
        None
    }
}

/// Trailing mean over exactly `window` values ending at each index.
///
/// The mean is `None` until a full window exists and whenever any value in
/// the window is missing or non-finite. Each window is summed on its own so
/// a value only ever influences the means whose window contains it.
fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|index| {
            if index + 1 < window {
                return None;
            }
            let total: Option<f64> = values[index + 1 - window..=index]
                .iter()
                .map(|value| value.filter(|v| v.is_finite()))
                .sum();
            total.map(|sum| sum / window as f64)
        })
        .collect()
}
