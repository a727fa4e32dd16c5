//! Process-wide configuration: which feed/stop to watch, advisory
//! thresholds, and refresh cadences. Set once at startup, never mutated.

use std::time::Duration;

use anyhow::{Result, bail};

/// MTA A/C/E trip-update feed.
pub const DEFAULT_FEED_URL: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-ace";
pub const DEFAULT_ROUTE_ID: &str = "A";
pub const DEFAULT_STOP_ID: &str = "A03S";
pub const DEFAULT_STATION: &str = "181 St";

/// Which feed to read and which platform the rider is heading for.
#[derive(Debug, Clone)]
pub struct StopConfig {
    pub feed_url: String,
    pub route_id: String,
    pub stop_id: String,
    /// Human label for the stop, used on the board and in detail text.
    pub station: String,
}

impl Default for StopConfig {
    fn default() -> Self {
        StopConfig {
            feed_url: DEFAULT_FEED_URL.to_string(),
            route_id: DEFAULT_ROUTE_ID.to_string(),
            stop_id: DEFAULT_STOP_ID.to_string(),
            station: DEFAULT_STATION.to_string(),
        }
    }
}

impl StopConfig {
    pub fn validate(&self) -> Result<()> {
        if self.feed_url.is_empty() {
            bail!("feed url must not be empty");
        }
        if self.route_id.is_empty() {
            bail!("route id must not be empty");
        }
        if self.stop_id.is_empty() {
            bail!("stop id must not be empty");
        }
        Ok(())
    }
}

/// Thresholds for the leave/wait decision, all in minutes.
#[derive(Debug, Clone, Copy)]
pub struct AdvisoryConfig {
    /// Door-to-platform walk time.
    pub walk_minutes: i64,
    /// Platform waits under this are short enough to leave for right away.
    pub comfortable_wait_minutes: i64,
    /// Platform waits under this mean the train cannot safely be caught.
    pub min_platform_wait_minutes: i64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        AdvisoryConfig {
            walk_minutes: 10,
            comfortable_wait_minutes: 4,
            min_platform_wait_minutes: 1,
        }
    }
}

impl AdvisoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.walk_minutes < 0 {
            bail!("walk minutes must not be negative");
        }
        if self.comfortable_wait_minutes < self.min_platform_wait_minutes {
            bail!("comfortable platform wait must be at least the minimum viable wait");
        }
        Ok(())
    }
}

/// The two refresh cadences plus the fetch deadline.
#[derive(Debug, Clone, Copy)]
pub struct RefreshConfig {
    /// How often the feed is re-fetched and re-extracted.
    pub data_refresh: Duration,
    /// How often the board is recomputed from the current snapshot.
    pub display_refresh: Duration,
    /// Hard deadline on a single feed request.
    pub fetch_timeout: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            data_refresh: Duration::from_secs(30),
            display_refresh: Duration::from_secs(1),
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

impl RefreshConfig {
    pub fn validate(&self) -> Result<()> {
        if self.data_refresh.is_zero() {
            bail!("data refresh interval must be positive");
        }
        if self.display_refresh.is_zero() {
            bail!("display refresh interval must be positive");
        }
        if self.fetch_timeout.is_zero() {
            bail!("fetch timeout must be positive");
        }
        Ok(())
    }
}
