//! The two refresh loops and the snapshot cell they share.
//!
//! The data loop owns the only write path: fetch, parse, extract, publish a
//! whole new [`FeedSnapshot`]. The display loop turns whatever snapshot is
//! current into a [`Board`] on its own faster cadence, so countdowns decay
//! smoothly between fetches without touching the network.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

use crate::arrivals::upcoming_arrivals;
use crate::board::Board;
use crate::config::{AdvisoryConfig, RefreshConfig, StopConfig};
use crate::error::FeedError;
use crate::fetch::FeedSource;
use crate::parser::parse_feed;
use crate::snapshot::FeedSnapshot;

pub type SnapshotReceiver = watch::Receiver<Arc<FeedSnapshot>>;
pub type BoardReceiver = watch::Receiver<Arc<Board>>;

/// Handle on the running refresh loops.
///
/// Subscribers read through the watch channels; only the data loop ever
/// writes a snapshot. `shutdown` aborts both loops at once. Without it the
/// loops wind down on their own once every receiver is gone.
pub struct Scheduler {
    snapshots: SnapshotReceiver,
    boards: BoardReceiver,
    data_task: JoinHandle<()>,
    display_task: JoinHandle<()>,
}

impl Scheduler {
    /// Spawns the data and display loops. The first data tick fires
    /// immediately, so a snapshot from the live feed is usually available
    /// within one fetch round-trip of startup.
    pub fn start(
        source: Arc<dyn FeedSource>,
        stop: StopConfig,
        advisory: AdvisoryConfig,
        refresh: RefreshConfig,
    ) -> Scheduler {
        let started_at = Utc::now();
        let (snapshot_tx, snapshots) =
            watch::channel(Arc::new(FeedSnapshot::startup(started_at)));
        let (board_tx, boards) = watch::channel(Arc::new(Board::compose(
            &snapshots.borrow(),
            started_at,
            &stop,
            &advisory,
        )));

        let data_stop = stop.clone();
        let data_task = tokio::spawn(async move {
            let mut ticker = interval(refresh.data_refresh);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let captured_at = Utc::now();
                let next = match refresh_once(source.as_ref(), &data_stop, captured_at).await {
                    Ok(arrivals) => {
                        info!(
                            route = %data_stop.route_id,
                            stop = %data_stop.stop_id,
                            arrivals = arrivals.len(),
                            "Feed refreshed"
                        );
                        FeedSnapshot::fresh(arrivals, captured_at)
                    }
                    Err(e) => {
                        warn!(error = %e, "Feed refresh failed, keeping last good data");
                        FeedSnapshot::failed(&snapshot_tx.borrow(), e.to_string())
                    }
                };
                if snapshot_tx.send(Arc::new(next)).is_err() {
                    break;
                }
            }
        });

        let display_snapshots = snapshots.clone();
        let display_task = tokio::spawn(async move {
            let mut ticker = interval(refresh.display_refresh);

            loop {
                ticker.tick().await;
                let snapshot = display_snapshots.borrow().clone();
                let board = Board::compose(&snapshot, Utc::now(), &stop, &advisory);
                if board_tx.send(Arc::new(board)).is_err() {
                    break;
                }
            }
        });

        Scheduler {
            snapshots,
            boards,
            data_task,
            display_task,
        }
    }

    /// A receiver over published snapshots, starting from the current one.
    pub fn snapshots(&self) -> SnapshotReceiver {
        self.snapshots.clone()
    }

    /// A receiver over rendered boards, starting from the current one.
    pub fn boards(&self) -> BoardReceiver {
        self.boards.clone()
    }

    /// Aborts both loops. In-flight fetches are cancelled, not awaited.
    pub fn shutdown(&self) {
        self.data_task.abort();
        self.display_task.abort();
    }
}

/// One data refresh: fetch, parse, extract.
async fn refresh_once(
    source: &dyn FeedSource,
    stop: &StopConfig,
    reference: DateTime<Utc>,
) -> Result<Vec<i64>, FeedError> {
    let bytes = source.fetch().await?;
    debug!(bytes = bytes.len(), "Feed bytes received, parsing");
    let feed = parse_feed(&bytes)?;
    Ok(upcoming_arrivals(
        &feed,
        &stop.route_id,
        &stop.stop_id,
        reference,
    ))
}
