// In crates/api-client/src/lib.rs

use std::time::Duration;

use app_config::MarketDataSettings;
use async_trait::async_trait;
use core_types::{BarSeries, Interval, Symbol};

pub mod error;
pub mod normalize;
pub mod types;

// Re-export public types
pub use error::{Error, Result};
pub use types::*;

/// A source of price bars for the signal pipeline.
///
/// Implementations never fail to their caller: provider outages, timeouts and
/// unknown symbols all come back as an empty series or
/// `LatestPrice::Unavailable`, after being logged.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetches the bars described by `request`. Empty when there is no data.
    async fn fetch_bars(&self, request: &BarsRequest) -> BarSeries;

    /// Last traded price for `symbol`, rounded to cents.
    async fn latest_price(&self, symbol: &Symbol) -> LatestPrice;
}

impl ApiClient {
    /// Constructs a new ApiClient from MarketDataSettings.
    pub fn new(settings: &MarketDataSettings) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(ApiClient {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches one chart body and returns its single result, if any.
    ///
    /// This corresponds to the `GET /v8/finance/chart/{symbol}` endpoint.
    async fn fetch_chart(
        &self,
        symbol: &Symbol,
        interval: Interval,
        range: &BarRange,
    ) -> Result<Option<ChartResult>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let mut params: Vec<(&str, String)> = vec![("interval", interval.as_str().to_string())];
        match range {
            BarRange::Between { start, end } => {
                params.push(("period1", start.timestamp().to_string()));
                params.push(("period2", end.timestamp().to_string()));
            }
            BarRange::Period(period) => params.push(("range", period.clone())),
        }

        let response = self
            .http_client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        let text = response.text().await.map_err(Error::RequestFailed)?;

        // The provider returns its error object with 4xx statuses too, so try
        // the body before giving up on the status.
        match serde_json::from_str::<ChartEnvelope>(&text) {
            Ok(envelope) => normalize::extract_result(envelope),
            Err(_) if !status.is_success() => Err(Error::HttpStatus(status.as_u16())),
            Err(e) => Err(Error::DeserializationFailed(e)),
        }
    }

    /// Fetches historical bars, surfacing every provider failure as an error.
    pub async fn try_fetch_bars(&self, request: &BarsRequest) -> Result<BarSeries> {
        let result = self
            .fetch_chart(&request.symbol, request.interval, &request.range)
            .await?;

        match result {
            Some(result) => normalize::into_bar_series(
                request.symbol.clone(),
                request.interval,
                request.timezone,
                result,
            ),
            None => Ok(BarSeries::empty(request.symbol.clone(), request.interval)),
        }
    }

    /// Fetches today's one-minute closes and returns the last one, rounded to cents.
    pub async fn try_latest_price(&self, symbol: &Symbol) -> Result<Option<f64>> {
        let result = self
            .fetch_chart(symbol, Interval::OneMinute, &BarRange::Period("1d".to_string()))
            .await?;

        let last_close = result
            .and_then(|result| result.indicators.quote.into_iter().next())
            .and_then(|quote| quote.last_close());

        Ok(last_close.map(round_to_cents))
    }
}

#[async_trait]
impl MarketDataSource for ApiClient {
    async fn fetch_bars(&self, request: &BarsRequest) -> BarSeries {
        match self.try_fetch_bars(request).await {
            Ok(series) => {
                tracing::info!(
                    symbol = %request.symbol,
                    interval = %request.interval,
                    bars = series.len(),
                    "Fetched bars from provider."
                );
                series
            }
            Err(e) => {
                tracing::warn!(
                    symbol = %request.symbol,
                    interval = %request.interval,
                    error = %e,
                    "Provider request failed; treating as no data."
                );
                BarSeries::empty(request.symbol.clone(), request.interval)
            }
        }
    }

    async fn latest_price(&self, symbol: &Symbol) -> LatestPrice {
        match self.try_latest_price(symbol).await {
            Ok(Some(price)) => LatestPrice::Price(price),
            Ok(None) => {
                tracing::info!(symbol = %symbol, "No recent close available.");
                LatestPrice::Unavailable
            }
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "Latest price lookup failed.");
                LatestPrice::Unavailable
            }
        }
    }
}

fn round_to_cents(price: f64) -> f64 {
    (price * 100.0).round() / 100.0
}

// Free function to allow api_client::new usage
pub fn new(settings: &MarketDataSettings) -> Result<ApiClient> {
    ApiClient::new(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn settings(base_url: &str) -> MarketDataSettings {
        MarketDataSettings {
            base_url: base_url.to_string(),
            timeout_secs: 2,
            timezone: "America/New_York".to_string(),
            lookback_days: 5,
            user_agent: "test-agent".to_string(),
        }
    }

    fn request(symbol: &str) -> BarsRequest {
        let end = Utc::now();
        BarsRequest {
            symbol: Symbol::parse(symbol).unwrap(),
            interval: Interval::FiveMinutes,
            range: BarRange::Between { start: end - ChronoDuration::days(5), end },
            timezone: chrono_tz::America::New_York,
        }
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round_to_cents(190.456), 190.46);
        assert_eq!(round_to_cents(190.454), 190.45);
        assert_eq!(round_to_cents(3.0), 3.0);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ApiClient::new(&settings("https://query1.finance.yahoo.com/")).unwrap();
        assert_eq!(client.base_url, "https://query1.finance.yahoo.com");
    }

    #[test]
    fn latest_price_serializes_number_or_marker() {
        assert_eq!(serde_json::to_value(LatestPrice::Price(12.5)).unwrap(), 12.5);
        assert_eq!(serde_json::to_value(LatestPrice::Unavailable).unwrap(), "N/A");
        assert_eq!(LatestPrice::Unavailable.as_f64(), None);
    }

    #[tokio::test]
    async fn unreachable_provider_yields_empty_series_and_unavailable_price() {
        // Nothing listens on the discard port, so the connection is refused.
        let client = ApiClient::new(&settings("http://127.0.0.1:9")).unwrap();
        let req = request("AAPL");

        assert!(client.try_fetch_bars(&req).await.is_err());

        let series = client.fetch_bars(&req).await;
        assert!(series.is_empty());
        assert_eq!(series.symbol, req.symbol);
        assert_eq!(series.interval, Interval::FiveMinutes);

        let price = client.latest_price(&req.symbol).await;
        assert_eq!(price, LatestPrice::Unavailable);
    }

    #[tokio::test]
    #[ignore]
    async fn fetches_live_bars_from_yahoo() {
        let client = ApiClient::new(&settings("https://query1.finance.yahoo.com")).unwrap();
        let series = client.try_fetch_bars(&request("AAPL")).await.unwrap();

        assert!(!series.is_empty(), "Expected AAPL bars over the last five days");
        assert_eq!(series.first_out_of_order(), None);
        assert!(client.try_latest_price(&series.symbol).await.unwrap().is_some());
    }
}
