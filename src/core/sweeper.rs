//! The expiry sweeper job.
//!
//! It runs on a fixed interval and removes the peers that have stopped
//! announcing, then drops the swarms that have stayed empty past the grace
//! period. Pruning takes the same per-entry lock as the announce path, so a
//! sweep and an in-flight announce never interleave on the same swarm.
use std::sync::Arc;

use swarm_tracker_configuration::Core;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core::Tracker;

/// It starts the cleanup job, returning its handle.
///
/// The job holds only a weak reference to the tracker, so it finishes on its
/// own once the tracker is dropped.
#[must_use]
pub fn start_job(config: &Core, tracker: &Arc<Tracker>) -> JoinHandle<()> {
    let weak_tracker = Arc::downgrade(tracker);
    let interval = config.inactive_peer_cleanup_interval;

    tokio::spawn(async move {
        let interval = std::time::Duration::from_secs(interval);
        let mut interval = tokio::time::interval(interval);

        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Stopping the torrent cleanup job..");
                    break;
                }
                _ = interval.tick() => {
                    if let Some(tracker) = weak_tracker.upgrade() {
                        debug!("Cleaning up inactive peers and peerless torrents..");
                        tracker.cleanup_torrents();
                    } else {
                        break;
                    }
                }
            }
        }
    })
}
