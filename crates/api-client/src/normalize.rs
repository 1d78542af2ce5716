// In crates/api-client/src/normalize.rs

use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use core_types::{Bar, BarSeries, Interval, Symbol};

use crate::error::{Error, Result};
use crate::types::{ChartEnvelope, ChartResult, QuoteColumns};

/// Pulls the single result out of a chart body, turning the provider's error
/// object into `Error::ApiError`. `Ok(None)` means "no data".
pub fn extract_result(envelope: ChartEnvelope) -> Result<Option<ChartResult>> {
    if let Some(err) = envelope.chart.error {
        return Err(Error::ApiError {
            code: err.code,
            msg: err.description.unwrap_or_default(),
        });
    }
    Ok(envelope.chart.result.and_then(|results| results.into_iter().next()))
}

/// Flattens the provider's column arrays into one `Bar` per timestamp.
///
/// Timestamps are converted to `timezone`. Non-finite numbers become `None`,
/// rows with no price at all are dropped, and the result is sorted ascending.
pub fn into_bar_series(
    symbol: Symbol,
    interval: Interval,
    timezone: Tz,
    result: ChartResult,
) -> Result<BarSeries> {
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let mut bars = Vec::with_capacity(result.timestamp.len());

    for (row, &seconds) in result.timestamp.iter().enumerate() {
        let instant = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| Error::MalformedResponse(format!("timestamp {} out of range", seconds)))?;

        let bar = Bar {
            timestamp: instant.with_timezone(&timezone).fixed_offset(),
            open: cell(&quote.open, row),
            high: cell(&quote.high, row),
            low: cell(&quote.low, row),
            close: cell(&quote.close, row),
            volume: cell(&quote.volume, row),
        };
        if has_prices(&bar) {
            bars.push(bar);
        }
    }

    if bars.windows(2).any(|pair| pair[1].timestamp < pair[0].timestamp) {
        tracing::debug!(symbol = %symbol, "Provider returned unsorted bars; sorting.");
        bars.sort_by_key(|bar| bar.timestamp);
    }

    Ok(BarSeries::new(symbol, interval, bars))
}

fn cell(column: &[Option<f64>], row: usize) -> Option<f64> {
    column.get(row).copied().flatten().filter(|value| value.is_finite())
}

fn has_prices(bar: &Bar) -> bool {
    bar.open.is_some() || bar.high.is_some() || bar.low.is_some() || bar.close.is_some()
}

impl QuoteColumns {
    /// Last defined close in the columns, if any.
    pub fn last_close(&self) -> Option<f64> {
        self.close.iter().rev().find_map(|value| value.filter(|v| v.is_finite()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const TWO_BARS: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL", "exchangeTimezoneName": "America/New_York", "regularMarketPrice": 190.5},
                "timestamp": [1709303400, 1709303460, 1709303520],
                "indicators": {"quote": [{
                    "open":   [190.0, null, 190.2],
                    "high":   [190.4, null, 190.6],
                    "low":    [189.9, null, 190.1],
                    "close":  [190.1, null, 190.5],
                    "volume": [1200, 0, 900]
                }]}
            }],
            "error": null
        }
    }"#;

    fn parse(body: &str) -> ChartEnvelope {
        serde_json::from_str(body).unwrap()
    }

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    #[test]
    fn flattens_columns_into_rows() {
        let result = extract_result(parse(TWO_BARS)).unwrap().unwrap();
        let series =
            into_bar_series(aapl(), Interval::OneMinute, chrono_tz::America::New_York, result).unwrap();

        // The all-null middle row is dropped.
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars[0].close, Some(190.1));
        assert_eq!(series.bars[1].volume, Some(900.0));
    }

    #[test]
    fn converts_timestamps_to_requested_zone() {
        let result = extract_result(parse(TWO_BARS)).unwrap().unwrap();
        let series =
            into_bar_series(aapl(), Interval::OneMinute, chrono_tz::America::New_York, result).unwrap();

        // 2024-03-01 14:30 UTC is 09:30 in New York (EST, UTC-5).
        let first = series.bars[0].timestamp;
        assert_eq!(first.hour(), 9);
        assert_eq!(first.minute(), 30);
        assert_eq!(first.offset().local_minus_utc(), -5 * 3600);
        assert_eq!(first.timestamp(), 1709303400);
    }

    #[test]
    fn missing_timestamps_mean_empty_series() {
        let body = r#"{"chart": {"result": [{
            "meta": {"symbol": "AAPL"},
            "indicators": {"quote": [{}]}
        }], "error": null}}"#;
        let result = extract_result(parse(body)).unwrap().unwrap();
        let series = into_bar_series(aapl(), Interval::OneDay, Tz::UTC, result).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn provider_error_object_becomes_api_error() {
        let body = r#"{"chart": {"result": null, "error": {
            "code": "Not Found", "description": "No data found, symbol may be delisted"
        }}}"#;
        match extract_result(parse(body)) {
            Err(Error::ApiError { code, msg }) => {
                assert_eq!(code, "Not Found");
                assert!(msg.contains("delisted"));
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn unsorted_rows_are_sorted() {
        let body = r#"{"chart": {"result": [{
            "meta": {"symbol": "AAPL"},
            "timestamp": [1709303460, 1709303400],
            "indicators": {"quote": [{"close": [2.0, 1.0]}]}
        }], "error": null}}"#;
        let result = extract_result(parse(body)).unwrap().unwrap();
        let series = into_bar_series(aapl(), Interval::OneMinute, Tz::UTC, result).unwrap();
        assert_eq!(series.closes(), vec![Some(1.0), Some(2.0)]);
        assert_eq!(series.first_out_of_order(), None);
    }

    #[test]
    fn short_columns_pad_with_none() {
        let body = r#"{"chart": {"result": [{
            "meta": {"symbol": "AAPL"},
            "timestamp": [1709303400, 1709303460],
            "indicators": {"quote": [{"close": [1.0, 2.0], "volume": [10]}]}
        }], "error": null}}"#;
        let result = extract_result(parse(body)).unwrap().unwrap();
        let series = into_bar_series(aapl(), Interval::OneMinute, Tz::UTC, result).unwrap();
        assert_eq!(series.bars[1].volume, None);
        assert_eq!(series.bars[1].close, Some(2.0));
    }

    #[test]
    fn last_close_skips_trailing_nulls() {
        let quote = QuoteColumns {
            close: vec![Some(1.0), Some(2.25), None],
            ..Default::default()
        };
        assert_eq!(quote.last_close(), Some(2.25));
        assert_eq!(QuoteColumns::default().last_close(), None);
    }
}
