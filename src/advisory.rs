//! The leave-now / wait-at-home decision engine.
//!
//! Works purely on a [`FeedSnapshot`] and the current instant: arrival
//! offsets decay by the fractional minutes elapsed since capture, so the
//! answer stays honest between data refreshes without refetching anything.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::AdvisoryConfig;
use crate::snapshot::FeedSnapshot;

/// The recommendation for one instant. Recomputed on every display tick,
/// never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advice {
    /// A train is catchable with a short platform wait: leave now.
    Go {
        leave_in_minutes: i64,
        platform_wait_minutes: i64,
        detail: String,
    },
    /// The first catchable train is far enough out to stay home a while.
    Wait {
        wait_at_home_minutes: i64,
        detail: String,
    },
    /// Nothing to act on: no data, every train too imminent to catch, or
    /// the last refresh failed.
    None,
}

impl Advice {
    /// Board headline, mirroring the countdown page. `None` renders as an
    /// empty slot rather than a headline.
    pub fn headline(&self) -> Option<String> {
        match self {
            Advice::Go { .. } => Some("YES, leave now".to_string()),
            Advice::Wait {
                wait_at_home_minutes,
                ..
            } => Some(format!("NO, wait {wait_at_home_minutes} min")),
            Advice::None => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Advice::Go { detail, .. } | Advice::Wait { detail, .. } => Some(detail),
            Advice::None => None,
        }
    }
}

/// Minutes since the snapshot was captured, fractional.
fn elapsed_minutes(snapshot: &FeedSnapshot, now: DateTime<Utc>) -> f64 {
    (now - snapshot.captured_at).num_milliseconds() as f64 / 60_000.0
}

/// Display countdowns for the snapshot as of `now`: each stored offset
/// reduced by the elapsed time, rounded to nearest, floored at zero.
///
/// Extraction truncates; display rounds. The two are intentionally
/// different and must stay that way.
pub fn display_minutes(snapshot: &FeedSnapshot, now: DateTime<Utc>) -> Vec<i64> {
    let elapsed = elapsed_minutes(snapshot, now);
    snapshot
        .arrivals
        .iter()
        .map(|&m| ((m as f64 - elapsed).round() as i64).max(0))
        .collect()
}

/// Picks the first catchable train and turns it into a recommendation.
///
/// Scanning the sorted offsets ascending: an entry whose platform wait
/// (minutes to arrival, minus elapsed time, minus the walk) falls below the
/// minimum viable wait is uncatchable and skipped. The first survivor
/// decides: a platform wait under the comfortable threshold means GO, any
/// longer wait means staying home for the difference. No survivor, an empty
/// snapshot, or a snapshot carrying an error all yield [`Advice::None`].
pub fn advise(
    snapshot: &FeedSnapshot,
    now: DateTime<Utc>,
    config: &AdvisoryConfig,
    station: &str,
) -> Advice {
    if snapshot.error.is_some() {
        return Advice::None;
    }

    let elapsed = elapsed_minutes(snapshot, now);
    for &m in &snapshot.arrivals {
        let adjusted = m as f64 - elapsed;
        let platform_wait = adjusted - config.walk_minutes as f64;
        if platform_wait < config.min_platform_wait_minutes as f64 {
            continue;
        }

        let train_min = adjusted.round() as i64;
        let wait_min = platform_wait.round() as i64;
        let detail = format!(
            "The next train is in {train_min} min. With a {walk} minute walk to the \
             {station} stop, you will need to wait {wait_min} min on the platform.",
            walk = config.walk_minutes,
        );

        if platform_wait < config.comfortable_wait_minutes as f64 {
            return Advice::Go {
                leave_in_minutes: train_min,
                platform_wait_minutes: wait_min,
                detail,
            };
        }
        return Advice::Wait {
            wait_at_home_minutes: (platform_wait - config.comfortable_wait_minutes as f64).round()
                as i64,
            detail,
        };
    }

    Advice::None
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: i64 = 1_700_000_000;

    #[test]
    fn test_skips_uncatchable_then_goes() {
        // 3 min train is missed by the 10 min walk; 12 min train leaves a
        // 2 min platform wait, short enough to leave right away.
        let snap = snap_at(vec![3, 12, 25], T);
        let advice = advise(&snap, at(T), &config(), "181 St");

        assert_eq!(
            advice,
            Advice::Go {
                leave_in_minutes: 12,
                platform_wait_minutes: 2,
                detail: "The next train is in 12 min. With a 10 minute walk to the \
                         181 St stop, you will need to wait 2 min on the platform."
                    .to_string(),
            }
        );
        assert_eq!(advice.headline().as_deref(), Some("YES, leave now"));
    }

    #[test]
    fn test_long_platform_wait_means_wait_at_home() {
        let snap = snap_at(vec![20], T);
        let advice = advise(&snap, at(T), &config(), "181 St");

        match &advice {
            Advice::Wait {
                wait_at_home_minutes,
                detail,
            } => {
                assert_eq!(*wait_at_home_minutes, 6);
                assert!(detail.contains("The next train is in 20 min"));
                assert!(detail.contains("wait 10 min on the platform"));
            }
            other => panic!("expected Wait, got {other:?}"),
        }
        assert_eq!(advice.headline().as_deref(), Some("NO, wait 6 min"));
    }

    #[test]
    fn test_all_trains_too_imminent() {
        let snap = snap_at(vec![5], T);
        assert_eq!(advise(&snap, at(T), &config(), "181 St"), Advice::None);
    }

    #[test]
    fn test_empty_snapshot() {
        let snap = snap_at(vec![], T);
        assert_eq!(advise(&snap, at(T), &config(), "181 St"), Advice::None);
        assert!(display_minutes(&snap, at(T)).is_empty());
    }

    #[test]
    fn test_error_snapshot_never_advises() {
        let good = snap_at(vec![12, 25], T);
        let bad = FeedSnapshot::failed(&good, "feed unavailable".to_string());
        assert_eq!(advise(&bad, at(T), &config(), "181 St"), Advice::None);
        // The stale countdowns still display while the error is up.
        assert_eq!(display_minutes(&bad, at(T)), vec![12, 25]);
    }

    #[test]
    fn test_display_decays_with_elapsed_time() {
        let snap = snap_at(vec![12], T);
        let now = at(T + 120);
        assert_eq!(display_minutes(&snap, now), vec![10]);
        // With a 10 min walk the adjusted 10 min arrival leaves no platform
        // wait at all, so the advisory drops it.
        assert_eq!(advise(&snap, now, &config(), "181 St"), Advice::None);
    }

    #[test]
    fn test_advisory_uses_elapsed_time() {
        // Fresh: 14 min out, platform wait 4, stay home 0 min.
        // Two minutes later the same train is a GO.
        let snap = snap_at(vec![14], T);
        match advise(&snap, at(T), &config(), "181 St") {
            Advice::Wait {
                wait_at_home_minutes,
                ..
            } => assert_eq!(wait_at_home_minutes, 0),
            other => panic!("expected Wait, got {other:?}"),
        }
        match advise(&snap, at(T + 120), &config(), "181 St") {
            Advice::Go {
                leave_in_minutes,
                platform_wait_minutes,
                ..
            } => {
                assert_eq!(leave_in_minutes, 12);
                assert_eq!(platform_wait_minutes, 2);
            }
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn test_fractional_elapsed_rounds_to_nearest() {
        // 24 s elapsed: 13 - 0.4 = 12.6, platform wait 2.6. Display and
        // advisory both round, unlike extraction which truncates.
        let snap = snap_at(vec![13], T);
        let now = DateTime::from_timestamp(T + 24, 0).unwrap();

        assert_eq!(display_minutes(&snap, now), vec![13]);
        match advise(&snap, now, &config(), "181 St") {
            Advice::Go {
                leave_in_minutes,
                platform_wait_minutes,
                ..
            } => {
                assert_eq!(leave_in_minutes, 13);
                assert_eq!(platform_wait_minutes, 3);
            }
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn test_platform_wait_of_exactly_one_is_viable() {
        let snap = snap_at(vec![11], T);
        match advise(&snap, at(T), &config(), "181 St") {
            Advice::Go {
                leave_in_minutes,
                platform_wait_minutes,
                ..
            } => {
                assert_eq!(leave_in_minutes, 11);
                assert_eq!(platform_wait_minutes, 1);
            }
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn test_just_under_minimum_wait_is_skipped() {
        // 30 s after capture an 11 min train leaves a 0.5 min platform
        // wait, below the viable minimum.
        let snap = snap_at(vec![11], T);
        let now = DateTime::from_timestamp(T + 30, 0).unwrap();
        assert_eq!(advise(&snap, now, &config(), "181 St"), Advice::None);
    }

    #[test]
    fn test_display_never_below_zero() {
        let snap = snap_at(vec![1], T);
        let now = at(T + 240);
        assert_eq!(display_minutes(&snap, now), vec![0]);
    }

    #[test]
    fn test_idempotent_for_fixed_inputs() {
        let snap = snap_at(vec![3, 12, 25], T);
        let now = at(T + 90);
        let cfg = config();

        assert_eq!(
            advise(&snap, now, &cfg, "181 St"),
            advise(&snap, now, &cfg, "181 St")
        );
        assert_eq!(display_minutes(&snap, now), display_minutes(&snap, now));
    }

    #[test]
    fn test_thresholds_come_from_config() {
        let cfg = AdvisoryConfig {
            walk_minutes: 2,
            comfortable_wait_minutes: 8,
            min_platform_wait_minutes: 3,
        };
        let snap = snap_at(vec![4, 9], T);

        // 4 min train: platform wait 2, under the 3 min minimum. The 9 min
        // train waits 7, under the comfortable 8, so it is a GO.
        match advise(&snap, at(T), &cfg, "181 St") {
            Advice::Go {
                leave_in_minutes,
                platform_wait_minutes,
                ..
            } => {
                assert_eq!(leave_in_minutes, 9);
                assert_eq!(platform_wait_minutes, 7);
            }
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn test_advice_serializes_with_kind_tag() {
        let advice = Advice::Wait {
            wait_at_home_minutes: 6,
            detail: "detail".to_string(),
        };
        let json = serde_json::to_value(&advice).unwrap();
        assert_eq!(json["kind"], "wait");
        assert_eq!(json["wait_at_home_minutes"], 6);

        let json = serde_json::to_value(Advice::None).unwrap();
        assert_eq!(json["kind"], "none");
    }

    // Helper functions for tests

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn snap_at(arrivals: Vec<i64>, secs: i64) -> FeedSnapshot {
        FeedSnapshot::fresh(arrivals, at(secs))
    }

    fn config() -> AdvisoryConfig {
        AdvisoryConfig::default()
    }
}
