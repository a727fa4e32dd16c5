//! CLI entry point for the traincatch board.
//!
//! Provides subcommands for a one-shot feed check, a terminal board that
//! follows the refresh loops, and an HTTP server exposing the board and the
//! embedded countdown page.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bytes::Bytes;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use traincatch::arrivals::upcoming_arrivals;
use traincatch::board::Board;
use traincatch::config::{
    AdvisoryConfig, DEFAULT_FEED_URL, DEFAULT_ROUTE_ID, DEFAULT_STATION, DEFAULT_STOP_ID,
    RefreshConfig, StopConfig,
};
use traincatch::fetch::{ApiKeyStyle, FeedSource, HttpSource};
use traincatch::parser::parse_feed;
use traincatch::scheduler::Scheduler;
use traincatch::server;
use traincatch::snapshot::FeedSnapshot;

#[derive(Parser)]
#[command(name = "traincatch")]
#[command(about = "Leave-now advisor for a single subway stop", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the feed once and print the board as JSON
    Check {
        /// Path to file or URL to fetch (defaults to the configured feed URL)
        #[arg(value_name = "FILE_OR_URL")]
        source: Option<String>,

        #[command(flatten)]
        feed: FeedArgs,

        /// Fetch timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
    },
    /// Run the refresh loops and print the board to the terminal
    Watch {
        #[command(flatten)]
        feed: FeedArgs,

        #[command(flatten)]
        refresh: RefreshArgs,
    },
    /// Run the refresh loops and serve the board over HTTP
    Serve {
        #[command(flatten)]
        feed: FeedArgs,

        #[command(flatten)]
        refresh: RefreshArgs,

        /// Address to bind the board server on
        #[arg(long, default_value = "127.0.0.1:5001")]
        addr: String,
    },
}

#[derive(clap::Args)]
struct FeedArgs {
    /// Trip-update feed URL
    #[arg(long, default_value = DEFAULT_FEED_URL)]
    feed: String,

    /// Route to match, e.g. "A"
    #[arg(long, default_value = DEFAULT_ROUTE_ID)]
    route: String,

    /// Stop to match, e.g. "A03S"
    #[arg(long, default_value = DEFAULT_STOP_ID)]
    stop: String,

    /// Display label for the stop
    #[arg(long, default_value = DEFAULT_STATION)]
    station: String,

    /// Minutes to walk from home to the platform
    #[arg(long, default_value_t = 10)]
    walk_minutes: i64,

    /// Platform waits under this many minutes mean "leave now"
    #[arg(long, default_value_t = 4)]
    comfortable_wait: i64,

    /// Platform waits under this many minutes are not catchable
    #[arg(long, default_value_t = 1)]
    min_wait: i64,

    /// How to send the FEED_API_KEY env value, if set
    #[arg(long, value_enum, default_value_t = ApiKeyStyle::Header)]
    api_key_style: ApiKeyStyle,
}

impl FeedArgs {
    fn stop_config(&self) -> StopConfig {
        StopConfig {
            feed_url: self.feed.clone(),
            route_id: self.route.clone(),
            stop_id: self.stop.clone(),
            station: self.station.clone(),
        }
    }

    fn advisory_config(&self) -> AdvisoryConfig {
        AdvisoryConfig {
            walk_minutes: self.walk_minutes,
            comfortable_wait_minutes: self.comfortable_wait,
            min_platform_wait_minutes: self.min_wait,
        }
    }

    fn api_key(&self) -> Option<(ApiKeyStyle, String)> {
        std::env::var("FEED_API_KEY")
            .ok()
            .map(|key| (self.api_key_style, key))
    }
}

#[derive(clap::Args)]
struct RefreshArgs {
    /// Seconds between feed fetches
    #[arg(long, default_value_t = 30)]
    data_refresh_secs: u64,

    /// Seconds between board recomputes
    #[arg(long, default_value_t = 1)]
    display_refresh_secs: u64,

    /// Fetch timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

impl RefreshArgs {
    fn refresh_config(&self) -> RefreshConfig {
        RefreshConfig {
            data_refresh: Duration::from_secs(self.data_refresh_secs),
            display_refresh: Duration::from_secs(self.display_refresh_secs),
            fetch_timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/traincatch.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("traincatch.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            source,
            feed,
            timeout_secs,
        } => check(source, feed, Duration::from_secs(timeout_secs)).await,
        Commands::Watch { feed, refresh } => watch(feed, refresh).await,
        Commands::Serve {
            feed,
            refresh,
            addr,
        } => {
            let (stop, advisory, refresh) = validated(&feed, &refresh)?;
            let scheduler = Scheduler::start(live_source(&feed, &stop, refresh)?, stop, advisory, refresh);
            server::serve(&addr, scheduler.boards()).await
        }
    }
}

/// One-shot: read the feed, extract, advise, print the board as pretty JSON.
async fn check(source: Option<String>, feed: FeedArgs, timeout: Duration) -> Result<()> {
    let stop = feed.stop_config();
    let advisory = feed.advisory_config();
    stop.validate()?;
    advisory.validate()?;

    let source = source.unwrap_or_else(|| stop.feed_url.clone());
    let bytes = fetch_once(&source, timeout, feed.api_key()).await?;
    let now = Utc::now();
    let message = parse_feed(&bytes)?;
    let arrivals = upcoming_arrivals(&message, &stop.route_id, &stop.stop_id, now);
    let snapshot = FeedSnapshot::fresh(arrivals, now);
    let board = Board::compose(&snapshot, now, &stop, &advisory);

    println!("{}", serde_json::to_string_pretty(&board)?);
    info!(board = %board.render_line(), "Check complete");
    Ok(())
}

/// Follows the board channel and reprints whenever the rendered line changes.
async fn watch(feed: FeedArgs, refresh: RefreshArgs) -> Result<()> {
    let (stop, advisory, refresh) = validated(&feed, &refresh)?;
    let scheduler = Scheduler::start(live_source(&feed, &stop, refresh)?, stop, advisory, refresh);

    let mut boards = scheduler.boards();
    let mut last_line = String::new();
    loop {
        boards.changed().await?;
        let line = boards.borrow_and_update().render_line();
        if line != last_line {
            println!("{line}");
            last_line = line;
        }
    }
}

fn validated(
    feed: &FeedArgs,
    refresh: &RefreshArgs,
) -> Result<(StopConfig, AdvisoryConfig, RefreshConfig)> {
    let stop = feed.stop_config();
    let advisory = feed.advisory_config();
    let refresh = refresh.refresh_config();
    stop.validate()?;
    advisory.validate()?;
    refresh.validate()?;
    Ok((stop, advisory, refresh))
}

fn live_source(
    feed: &FeedArgs,
    stop: &StopConfig,
    refresh: RefreshConfig,
) -> Result<Arc<dyn FeedSource>> {
    let mut http = HttpSource::new(stop.feed_url.clone(), refresh.fetch_timeout)?;
    if let Some((style, key)) = feed.api_key() {
        info!(style = ?style, "Feed API key attached from FEED_API_KEY");
        http = http.with_api_key(style, key);
    }
    Ok(Arc::new(http))
}

/// Loads feed bytes from a local file path or fetches them over HTTP.
#[tracing::instrument(skip(api_key), fields(source = %source))]
async fn fetch_once(
    source: &str,
    timeout: Duration,
    api_key: Option<(ApiKeyStyle, String)>,
) -> Result<Bytes> {
    let bytes = if source.starts_with("http") {
        let mut http = HttpSource::new(source.to_string(), timeout)?;
        if let Some((style, key)) = api_key {
            http = http.with_api_key(style, key);
        }
        http.fetch().await?
    } else {
        Bytes::from(std::fs::read(source)?)
    };
    Ok(bytes)
}
