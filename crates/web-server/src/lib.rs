// In crates/web-server/src/lib.rs

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use api_client::{BarRange, BarsRequest, LatestPrice, MarketDataSource};
use app_config::Settings;
use app_config::types::ServerSettings;
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use chrono_tz::Tz;
use core_types::{Interval, Symbol};
use strategies::{MACrossover, MACrossoverSettings, Strategy};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir};
use types::{DataParams, DataResponse, WatchlistEntry, WatchlistResponse};

pub mod error;
pub mod page;
pub mod types;

// Re-export our custom error type for convenience.
pub use error::{Error, Result};

/// Upper bound for one watchlist price lookup, on top of the client's own timeout.
const PRICE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);

/// The shared application state that is available to all API handlers.
///
/// Everything in it is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn MarketDataSource>,
    /// Windows used when a request does not override them.
    pub strategy: MACrossoverSettings,
    pub watchlist: Arc<Vec<Symbol>>,
    /// Zone bar timestamps are converted to by default.
    pub timezone: Tz,
    pub lookback_days: i64,
    /// Put raw internal error text in 500 responses (development only).
    pub expose_internal_errors: bool,
    pub static_dir: String,
}

impl AppState {
    /// Builds the state from loaded settings and an injected data source.
    pub fn from_settings(
        source: Arc<dyn MarketDataSource>,
        settings: &Settings,
    ) -> app_config::Result<Self> {
        Ok(Self {
            source,
            strategy: settings.strategy,
            watchlist: Arc::new(settings.watchlist()?),
            timezone: settings.market_data.timezone()?,
            lookback_days: settings.market_data.lookback_days,
            expose_internal_errors: settings.app.is_development(),
            static_dir: settings.server.static_dir.clone(),
        })
    }
}

/// Creates the main application router with all routes and middleware.
///
/// # Arguments
///
/// * `app_state`: The shared `AppState` containing the data source and watchlist.
///
/// # Returns
///
/// The configured `axum::Router`.
pub fn create_router(app_state: AppState) -> Router {
    // Define a CORS layer so the page can also be served from elsewhere during development.
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let expose = app_state.expose_internal_errors;
    let catch_panic = CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
        panic_response(panic, expose)
    });

    // Define the API sub-router
    let api_router = Router::new()
        .route("/data", get(data_handler))
        .route("/watchlist", get(watchlist_handler));

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_check_handler))
        .nest("/api", api_router)
        .nest_service("/static", ServeDir::new(&app_state.static_dir))
        .layer(catch_panic)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// A simple health check handler.
async fn health_check_handler() -> &'static str {
    "OK"
}

/// The handler for `GET /`.
async fn index_handler(State(state): State<AppState>) -> Html<String> {
    Html(page::render_index(&state.watchlist, state.timezone.name()))
}

/// The handler for `GET /api/data`.
///
/// Fetches recent bars for one symbol, runs the crossover strategy over them
/// and returns every annotated bar plus the current signal.
async fn data_handler(
    State(state): State<AppState>,
    params: std::result::Result<Query<DataParams>, QueryRejection>,
) -> Result<Json<DataResponse>> {
    let Query(params) = params.map_err(|rejection| Error::InvalidInput(rejection.body_text()))?;

    // 1. Validate everything before touching the network.
    let symbol = Symbol::parse(&params.symbol)?;
    let interval: Interval = params.interval.parse()?;
    let windows = MACrossoverSettings {
        short_window: params.short_window.unwrap_or(state.strategy.short_window),
        long_window: params.long_window.unwrap_or(state.strategy.long_window),
    };
    let strategy = MACrossover::new(windows)?;
    let timezone = match params.timezone.as_deref() {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| Error::InvalidInput(format!("Unknown timezone: {}", name)))?,
        None => state.timezone,
    };

    // 2. Fetch. An empty series covers both "no data" and "provider down".
    let end = Utc::now();
    let request = BarsRequest {
        symbol: symbol.clone(),
        interval,
        range: BarRange::Between {
            start: end - chrono::Duration::days(state.lookback_days),
            end,
        },
        timezone,
    };
    let series = state.source.fetch_bars(&request).await;
    if series.is_empty() {
        tracing::warn!(symbol = %symbol, interval = %interval, "No bars available.");
        return Err(Error::NotFound(format!(
            "No data found for {} at interval {}",
            symbol, interval
        )));
    }

    // 3. Compute.
    let report = strategy.compute(&series)?;
    tracing::info!(
        symbol = %symbol,
        interval = %interval,
        bars = report.series.rows.len(),
        events = report.events.len(),
        signal = ?report.current_state,
        "Served signal data."
    );

    Ok(Json(DataResponse {
        symbol,
        interval,
        timezone: timezone.name().to_string(),
        signal: report.current_state,
        signal_label: report.current_state.label(),
        events: report.events,
        data: report.series.rows,
    }))
}

/// The handler for `GET /api/watchlist`.
///
/// Looks every symbol up concurrently. A lookup that fails, hangs or panics
/// only turns its own entry into "N/A".
async fn watchlist_handler(State(state): State<AppState>) -> Json<WatchlistResponse> {
    let lookups = state.watchlist.iter().cloned().map(|symbol| {
        let source = Arc::clone(&state.source);
        let task_symbol = symbol.clone();
        let handle = tokio::spawn(async move {
            tokio::time::timeout(PRICE_LOOKUP_TIMEOUT, source.latest_price(&task_symbol)).await
        });

        async move {
            let price = match handle.await {
                Ok(Ok(price)) => price,
                Ok(Err(_elapsed)) => {
                    tracing::warn!(symbol = %symbol, "Latest price lookup timed out.");
                    LatestPrice::Unavailable
                }
                Err(e) => {
                    tracing::error!(symbol = %symbol, error = %e, "Latest price task failed.");
                    LatestPrice::Unavailable
                }
            };
            tracing::debug!(symbol = %symbol, ?price, "Watchlist price.");
            WatchlistEntry { symbol, price }
        }
    });

    let watchlist = futures::future::join_all(lookups).await;
    Json(WatchlistResponse { watchlist })
}

/// Turns a handler panic into a 500, hiding the payload outside development.
fn panic_response(panic: Box<dyn Any + Send + 'static>, expose: bool) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    };
    Error::internal(detail, expose).into_response()
}

/// The main entry point for running the web server.
///
/// This function sets up the TCP listener and serves the application router.
/// It will run forever until the process is terminated.
pub async fn run(settings: ServerSettings, app_state: AppState) -> Result<()> {
    let app = create_router(app_state);

    let address = format!("{}:{}", settings.host, settings.port);
    tracing::info!("Web server listening on {}", address);

    let listener = TcpListener::bind(&address).await.map_err(Error::ServerBindError)?;

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(Error::ServerError)?;

    Ok(())
}
