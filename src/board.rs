//! The board: everything a display needs for one tick, in one payload.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::advisory::{Advice, advise, display_minutes};
use crate::config::{AdvisoryConfig, StopConfig};
use crate::snapshot::FeedSnapshot;

/// One display-adjusted countdown entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arrival {
    pub minutes: i64,
}

/// Snapshot + instant, rendered: display countdowns, last-capture
/// timestamp, the advisory, and the last refresh failure if any. The same
/// shape is serialized for the HTTP API and printed for the terminal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    /// Sorted ascending, decayed by time since capture, floored at zero.
    pub arrivals: Vec<Arrival>,
    /// Local wall-clock time of the last successful capture.
    pub updated: String,
    pub walk_minutes: i64,
    pub route: String,
    pub station: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub advice: Advice,
}

impl Board {
    pub fn compose(
        snapshot: &FeedSnapshot,
        now: DateTime<Utc>,
        stop: &StopConfig,
        advisory: &AdvisoryConfig,
    ) -> Board {
        Board {
            arrivals: display_minutes(snapshot, now)
                .into_iter()
                .map(|minutes| Arrival { minutes })
                .collect(),
            updated: snapshot
                .captured_at
                .with_timezone(&Local)
                .format("%-I:%M:%S %p")
                .to_string(),
            walk_minutes: advisory.walk_minutes,
            route: stop.route_id.clone(),
            station: stop.station.clone(),
            error: snapshot.error.clone(),
            advice: advise(snapshot, now, advisory, &stop.station),
        }
    }

    /// Countdown label for one entry; anything under a minute is "now".
    pub fn countdown_label(minutes: i64) -> String {
        if minutes < 1 {
            "now".to_string()
        } else {
            format!("{minutes} min")
        }
    }

    /// Compact one-line rendering for the terminal watcher.
    pub fn render_line(&self) -> String {
        let trains = if self.arrivals.is_empty() {
            "no upcoming arrivals".to_string()
        } else {
            self.arrivals
                .iter()
                .map(|a| Self::countdown_label(a.minutes))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut line = format!(
            "[{}] {} @ {}: {}",
            self.updated, self.route, self.station, trains
        );
        if let Some(headline) = self.advice.headline() {
            line.push_str(" | ");
            line.push_str(&headline);
        }
        if let Some(err) = &self.error {
            line.push_str(" | feed error: ");
            line.push_str(err);
        }
        line
    }
}
