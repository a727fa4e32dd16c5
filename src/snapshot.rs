//! The unit of state shared between the data and display refresh loops.

use chrono::{DateTime, Utc};

/// One extraction result: upcoming arrival offsets in whole minutes, the
/// instant they were captured, and the failure (if any) of the last refresh.
///
/// Snapshots are immutable once published; each data refresh replaces the
/// current one wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    /// Minutes until each upcoming arrival at capture time, sorted ascending.
    pub arrivals: Vec<i64>,
    /// When the arrivals were extracted.
    pub captured_at: DateTime<Utc>,
    /// Short description of the last fetch or parse failure. When set,
    /// `arrivals` and `captured_at` still describe the last successful
    /// refresh.
    pub error: Option<String>,
}

impl FeedSnapshot {
    /// Empty placeholder published before the first refresh completes.
    pub fn startup(now: DateTime<Utc>) -> Self {
        FeedSnapshot {
            arrivals: Vec::new(),
            captured_at: now,
            error: None,
        }
    }

    pub fn fresh(arrivals: Vec<i64>, captured_at: DateTime<Utc>) -> Self {
        FeedSnapshot {
            arrivals,
            captured_at,
            error: None,
        }
    }

    /// Failure snapshot: retains the previous arrivals and capture instant,
    /// so countdowns keep decaying from the last good data, and attaches the
    /// error for the board to surface.
    pub fn failed(previous: &FeedSnapshot, error: String) -> Self {
        FeedSnapshot {
            arrivals: previous.arrivals.clone(),
            captured_at: previous.captured_at,
            error: Some(error),
        }
    }
}
