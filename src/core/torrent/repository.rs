//! The swarm registry: one torrent entry per info-hash.
//!
//! The registry is a sharded concurrent map ([`DashMap`]) of entries, each
//! entry behind its own mutex. Announces for different torrents proceed fully
//! in parallel while announces for the same torrent serialize on the entry
//! lock. Registry-level mutations (creating and dropping entries) hold the
//! shard write lock, so a conditional removal can never detach an entry while
//! an announce is mutating it.
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use swarm_tracker_configuration::TrackerPolicy;
use swarm_tracker_primitives::announce_event::AnnounceEvent;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::pagination::Pagination;
use swarm_tracker_primitives::peer;
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;
use swarm_tracker_primitives::torrent_metrics::TorrentsMetrics;
use swarm_tracker_primitives::DurationSinceUnixEpoch;

use super::entry::{Entry, PeerTransition};
use crate::CurrentClock;
use swarm_tracker_clock::clock::Time;

/// A torrent entry shared between the announce path and the sweeper.
pub type EntryMutexStd = Arc<Mutex<Entry>>;

/// The in-memory torrents repository.
#[derive(Default, Debug)]
pub struct Torrents {
    torrents: DashMap<InfoHash, EntryMutexStd>,
}

impl Torrents {
    /// It applies an announce to the torrent entry, creating it when absent,
    /// and returns the applied transition together with the swarm statistics
    /// after the mutation.
    ///
    /// A `stopped` event never creates an entry: stopping a peer the tracker
    /// has no record of is a no-op with zeroed statistics.
    ///
    /// # Panics
    ///
    /// Will panic if the entry mutex is poisoned.
    pub fn upsert_peer_and_get_stats(&self, info_hash: &InfoHash, peer: &peer::Peer) -> (PeerTransition, SwarmMetadata) {
        if peer.event == AnnounceEvent::Stopped {
            return match self.get(info_hash) {
                Some(entry) => {
                    let mut entry = entry.lock().expect("it should get the entry lock");
                    let transition = entry.upsert_peer(peer);
                    (transition, entry.get_stats())
                }
                None => (PeerTransition::None, SwarmMetadata::zeroed()),
            };
        }

        // The map entry guard is held across the mutation so a concurrent
        // conditional removal cannot detach this entry in between.
        let entry = self.torrents.entry(*info_hash).or_default();
        let mut guard = entry.lock().expect("it should get the entry lock");
        let transition = guard.upsert_peer(peer);
        let stats = guard.get_stats();
        drop(guard);
        drop(entry);

        (transition, stats)
    }

    /// It returns the torrent entry for a given info-hash. Never creates one.
    #[must_use]
    pub fn get(&self, key: &InfoHash) -> Option<EntryMutexStd> {
        let maybe_entry = self.torrents.get(key);
        maybe_entry.map(|entry| entry.clone())
    }

    /// It returns the swarm statistics for a given info-hash, without creating
    /// an entry for unknown torrents.
    ///
    /// # Panics
    ///
    /// Will panic if the entry mutex is poisoned.
    #[must_use]
    pub fn get_swarm_metadata(&self, info_hash: &InfoHash) -> Option<SwarmMetadata> {
        self.torrents
            .get(info_hash)
            .map(|entry| entry.lock().expect("it should get the entry lock").get_stats())
    }

    /// It calculates and returns the aggregate swarm metrics.
    ///
    /// # Panics
    ///
    /// Will panic if an entry mutex is poisoned.
    #[must_use]
    pub fn get_metrics(&self) -> TorrentsMetrics {
        let mut metrics = TorrentsMetrics::default();

        for entry in &self.torrents {
            let stats = entry.value().lock().expect("it should get the entry lock").get_stats();
            metrics.seeders += u64::from(stats.complete);
            metrics.completed += u64::from(stats.downloaded);
            metrics.leechers += u64::from(stats.incomplete);
            metrics.torrents += 1;
        }

        metrics
    }

    /// It returns a page of torrent entries for the observability layer.
    #[must_use]
    pub fn get_paginated(&self, pagination: Option<&Pagination>) -> Vec<(InfoHash, EntryMutexStd)> {
        match pagination {
            Some(pagination) => self
                .torrents
                .iter()
                .skip(usize::try_from(pagination.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(pagination.limit).unwrap_or(usize::MAX))
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
            None => self
                .torrents
                .iter()
                .map(|entry| (*entry.key(), entry.value().clone()))
                .collect(),
        }
    }

    /// The number of torrents in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.torrents.len()
    }

    /// Returns true when the registry holds no torrents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.torrents.is_empty()
    }

    /// It removes the peers that have not announced within `current_cutoff`
    /// from every swarm.
    ///
    /// # Panics
    ///
    /// Will panic if an entry mutex is poisoned.
    pub fn remove_inactive_peers(&self, current_cutoff: DurationSinceUnixEpoch) {
        for entry in &self.torrents {
            entry
                .value()
                .lock()
                .expect("it should get the entry lock")
                .remove_inactive_peers(current_cutoff);
        }
    }

    /// It removes the torrents that have been empty past the grace period.
    ///
    /// The emptiness check runs under the entry lock inside the removal
    /// predicate, so an announce re-populating the swarm either completes
    /// before the check or waits until the entry has been detached and then
    /// recreates it.
    ///
    /// # Panics
    ///
    /// Will panic if an entry mutex is poisoned.
    pub fn remove_peerless_torrents(&self, policy: &TrackerPolicy) {
        let now = CurrentClock::now();
        let grace_period = Duration::from_secs(u64::from(policy.peerless_torrent_grace_period));

        self.torrents.retain(|_, entry| {
            !entry
                .lock()
                .expect("it should get the entry lock")
                .is_removable(now, grace_period)
        });
    }
}
