//! Tracker domain services.
//!
//! - [Torrent services](crate::core::services::torrent): read-only snapshots
//!   of the swarm state for the observability layer.
//! - The [`tracker_factory`] that builds a tracker with its dependencies.
pub mod torrent;

use swarm_tracker_configuration::Configuration;

use crate::core::{events, Tracker};

/// It returns a new tracker building its dependencies.
#[must_use]
pub fn tracker_factory(config: &Configuration) -> Tracker {
    let (event_sender, event_repository) = if config.core.tracker_usage_statistics {
        let (sender, repository) = events::Keeper::new_active_instance();
        (Some(sender), repository)
    } else {
        (None, events::Repo::new())
    };

    Tracker::new(config, None, event_sender, event_repository)
}
