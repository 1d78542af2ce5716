// In app/src/main.rs

use std::sync::Arc;

use anyhow::Result;
use api_client::{ApiClient, BarRange, BarsRequest, MarketDataSource};
use app_config::Settings;
use chrono::Utc;
use clap::{Parser, Subcommand};
use futures::future::join_all;
use core_types::{Interval, Symbol};
use strategies::{MACrossover, Strategy};
use tracing_subscriber::prelude::*;
use web_server::AppState;

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = "Moving-average crossover signals for an equity watchlist.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs the web server (the default when no subcommand is given).
    Serve,

    /// Computes the current signal for one symbol and prints it as JSON.
    Signal {
        /// The ticker to analyse (e.g., "AAPL").
        #[arg(short, long)]
        symbol: String,

        /// The bar interval (e.g., "1m", "5m", "1d").
        #[arg(short, long, default_value = "1m")]
        interval: String,
    },

    /// Prints the latest price of every watchlist symbol.
    Watchlist,
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings()?;
    init_tracing(&settings);

    tracing::info!(environment = %settings.app.environment, "Starting signal server application");

    let client = api_client::new(&settings.market_data)?;

    // Match on the parsed command and call the appropriate handler.
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(settings, client).await?,
        Commands::Signal { symbol, interval } => {
            handle_signal(&settings, &client, &symbol, &interval).await?
        }
        Commands::Watchlist => handle_watchlist(&settings, &client).await?,
    }

    Ok(())
}

/// Installs the fmt subscriber, filtered at the configured level.
fn init_tracing(settings: &Settings) {
    let level = settings
        .app
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_filter(tracing_subscriber::filter::Targets::new()
            .with_target("hyper", tracing::Level::WARN) // Connection-level chatter
            .with_target("reqwest", tracing::Level::WARN)
            .with_default(level));
    tracing_subscriber::registry().with(fmt_layer).init();
}

// --- "Serve" Subcommand Logic ---

/// Wires the provider client into the web server and runs it until terminated.
async fn run_server(settings: Settings, client: ApiClient) -> Result<()> {
    let source: Arc<dyn MarketDataSource> = Arc::new(client);
    let app_state = AppState::from_settings(source, &settings)?;

    tracing::info!(
        symbols = app_state.watchlist.len(),
        timezone = %app_state.timezone,
        short_window = app_state.strategy.short_window,
        long_window = app_state.strategy.long_window,
        "Application state ready."
    );

    web_server::run(settings.server, app_state).await?;
    Ok(())
}

// --- "Signal" Subcommand Logic ---

async fn handle_signal(
    settings: &Settings,
    client: &ApiClient,
    symbol: &str,
    interval: &str,
) -> Result<()> {
    let symbol = Symbol::parse(symbol)?;
    let interval: Interval = interval.parse()?;
    let strategy = MACrossover::new(settings.strategy)?;

    let end = Utc::now();
    let request = BarsRequest {
        symbol: symbol.clone(),
        interval,
        range: BarRange::Between {
            start: end - chrono::Duration::days(settings.market_data.lookback_days),
            end,
        },
        timezone: settings.market_data.timezone()?,
    };

    // Surface the provider error here; there is no HTTP layer to translate it.
    let series = client.try_fetch_bars(&request).await?;
    if series.is_empty() {
        anyhow::bail!("No data found for {} at interval {}", symbol, interval);
    }

    let report = strategy.compute(&series)?;
    let summary = serde_json::json!({
        "symbol": symbol,
        "interval": interval,
        "strategy": strategy.name(),
        "signal": report.current_state,
        "signal_label": report.current_state.label(),
        "events": report.events,
        "last_bar": report.series.rows.last(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

// --- "Watchlist" Subcommand Logic ---

async fn handle_watchlist(settings: &Settings, client: &ApiClient) -> Result<()> {
    let watchlist = settings.watchlist()?;
    let prices = join_all(watchlist.iter().map(|symbol| client.latest_price(symbol))).await;

    println!("{:<10} {:>12}", "SYMBOL", "PRICE");
    for (symbol, price) in watchlist.iter().zip(prices) {
        let shown = price
            .as_f64()
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "N/A".to_string());
        println!("{:<10} {:>12}", symbol, shown);
    }
    Ok(())
}
