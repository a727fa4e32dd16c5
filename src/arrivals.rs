//! Reduces a GTFS Realtime feed to upcoming arrivals for one route/stop pair.

use chrono::{DateTime, Utc};

use crate::gtfs_rt::FeedMessage;

/// Walks the feed and returns whole minutes until each upcoming arrival of
/// `route_id` trains at `stop_id`, sorted ascending.
///
/// Matching is exact on both identifiers. Per stop-time update the arrival
/// time wins when present and non-zero, with the departure time as fallback.
/// Entries with no usable time, or a time at or before `reference`, are
/// dropped. Minutes are truncating division, so a train 119 seconds out
/// counts as 1 minute and one 59 seconds out counts as 0.
pub fn upcoming_arrivals(
    feed: &FeedMessage,
    route_id: &str,
    stop_id: &str,
    reference: DateTime<Utc>,
) -> Vec<i64> {
    let now = reference.timestamp();
    let mut arrivals = Vec::new();

    for entity in &feed.entity {
        if let Some(update) = &entity.trip_update {
            if update.trip.route_id.as_deref() != Some(route_id) {
                continue;
            }
            for stop_time in &update.stop_time_update {
                if stop_time.stop_id.as_deref() != Some(stop_id) {
                    continue;
                }
                let arrival = stop_time.arrival.as_ref().and_then(|ev| ev.time).unwrap_or(0);
                let time = if arrival != 0 {
                    arrival
                } else {
                    stop_time.departure.as_ref().and_then(|ev| ev.time).unwrap_or(0)
                };
                if time == 0 || time <= now {
                    continue;
                }
                arrivals.push((time - now) / 60);
            }
        }
    }

    arrivals.sort_unstable();
    arrivals
}
