//! The torrent entry: all the information about one torrent in the tracker.
//!
//! The entry keeps the swarm (the peer list) together with the denormalized
//! seeder and leecher counters and the historical number of completed
//! downloads. Counters are adjusted on every mutation so reading the swarm
//! statistics is O(1).
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rand::seq::IteratorRandom;
use swarm_tracker_primitives::announce_event::AnnounceEvent;
use swarm_tracker_primitives::peer;
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;
use swarm_tracker_primitives::DurationSinceUnixEpoch;

use crate::CurrentClock;
use swarm_tracker_clock::clock::Time;

/// The swarm transition applied by an announce.
///
/// The tracker emits one lifecycle event per applied transition, so the entry
/// reports what actually happened instead of what the client claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerTransition {
    /// A previously unknown peer joined the swarm.
    Started,
    /// A known peer refreshed its state.
    Updated,
    /// A known peer became a seeder. This is the only transition that
    /// increments the historical downloads counter.
    Completed,
    /// A known peer left the swarm.
    Stopped,
    /// The announce was a no-op (a `stopped` event for an unknown peer).
    None,
}

/// A data structure containing all the information about a torrent in the tracker.
///
/// This is the tracker entry for a given torrent and contains the swarm data,
/// that's the list of all the peers trying to download the same torrent.
/// The tracker keeps one entry like this for every torrent.
#[derive(Clone, Debug, Default)]
pub struct Entry {
    /// The swarm: a network of peers that are all trying to download the
    /// torrent associated to this entry. Keyed by the peer socket address, so
    /// a client that restarts with a new peer id but the same IP and port
    /// replaces its previous registration.
    peers: PeerList,
    /// The number of peers that have ever completed downloading the torrent
    /// associated to this entry. Monotonic, never decremented when a seeder
    /// leaves.
    downloaded: u32,
    /// Number of peers in the swarm with nothing left to download.
    seeders: u32,
    /// Number of peers in the swarm still downloading.
    leechers: u32,
    /// When the peer list last became empty. Empty entries are only dropped
    /// after a grace period, so scrape stats survive brief churn.
    emptied_at: Option<DurationSinceUnixEpoch>,
}

#[derive(Clone, Debug, Default)]
struct PeerList {
    peers: std::collections::BTreeMap<SocketAddr, Arc<peer::Peer>>,
}

impl PeerList {
    fn len(&self) -> usize {
        self.peers.len()
    }

    fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    fn insert(&mut self, value: Arc<peer::Peer>) -> Option<Arc<peer::Peer>> {
        self.peers.insert(value.peer_addr, value)
    }

    fn remove(&mut self, key: &SocketAddr) -> Option<Arc<peer::Peer>> {
        self.peers.remove(key)
    }

    fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&SocketAddr, &mut Arc<peer::Peer>) -> bool,
    {
        self.peers.retain(f);
    }

    fn get_peers(&self, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        match limit {
            Some(limit) => self.peers.values().take(limit).cloned().collect(),
            None => self.peers.values().cloned().collect(),
        }
    }

    /// Returns a uniform-random sample of peers for the given client.
    ///
    /// The client itself is filtered out. Peers sharing the client's address
    /// family are preferred; the sample is padded with peers from the other
    /// family only when the preferred family cannot fill it. Random selection
    /// keeps late-joining peers visible under load.
    fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        let Some(limit) = limit else {
            return self
                .peers
                .values()
                .filter(|peer| peer.peer_addr != *client)
                .cloned()
                .collect();
        };

        let mut rng = rand::thread_rng();

        let mut sample: Vec<Arc<peer::Peer>> = self
            .peers
            .values()
            .filter(|peer| peer.peer_addr != *client && peer.peer_addr.is_ipv4() == client.is_ipv4())
            .cloned()
            .choose_multiple(&mut rng, limit);

        if sample.len() < limit {
            let padding = self
                .peers
                .values()
                .filter(|peer| peer.peer_addr != *client && peer.peer_addr.is_ipv4() != client.is_ipv4())
                .cloned()
                .choose_multiple(&mut rng, limit - sample.len());
            sample.extend(padding);
        }

        sample
    }
}

impl Entry {
    /// It returns the swarm metadata (statistics) as a struct:
    ///
    /// `(downloaded, complete, incomplete)`
    #[must_use]
    pub fn get_stats(&self) -> SwarmMetadata {
        SwarmMetadata {
            downloaded: self.downloaded,
            complete: self.seeders,
            incomplete: self.leechers,
        }
    }

    /// Returns true if the peer list is empty.
    #[must_use]
    pub fn peers_is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Returns the number of peers in the swarm.
    #[must_use]
    pub fn get_peers_len(&self) -> usize {
        self.peers.len()
    }

    /// Get all swarm peers, optionally limiting the result.
    #[must_use]
    pub fn get_peers(&self, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        self.peers.get_peers(limit)
    }

    /// It returns a random list of peers for a given client, filtering out
    /// the client itself and preferring peers with its address family.
    #[must_use]
    pub fn get_peers_for_client(&self, client: &SocketAddr, limit: Option<usize>) -> Vec<Arc<peer::Peer>> {
        self.peers.get_peers_for_client(client, limit)
    }

    /// It updates a peer and returns the transition that was applied to the
    /// swarm.
    ///
    /// The seeder and leecher counters are kept in sync with the peer list on
    /// every path, and the historical downloads counter increases exactly once
    /// per peer: on its first transition from leecher to seeder. A peer that
    /// joins the swarm as a seeder does not increase it, because the tracker
    /// did not witness that download.
    pub fn upsert_peer(&mut self, peer: &peer::Peer) -> PeerTransition {
        if peer.event == AnnounceEvent::Stopped {
            return match self.peers.remove(&peer.peer_addr) {
                Some(previous) => {
                    self.drop_from_counters(previous.is_seeder());
                    self.mark_emptied_if_empty();
                    PeerTransition::Stopped
                }
                // Stopping a peer the tracker never saw is a no-op.
                None => PeerTransition::None,
            };
        }

        let is_seeder = peer.is_seeder();

        match self.peers.insert(Arc::new(*peer)) {
            None => {
                if is_seeder {
                    self.seeders += 1;
                } else {
                    self.leechers += 1;
                }
                self.emptied_at = None;
                PeerTransition::Started
            }
            Some(previous) => {
                let was_seeder = previous.is_seeder();

                if was_seeder == is_seeder {
                    return PeerTransition::Updated;
                }

                self.drop_from_counters(was_seeder);

                if is_seeder {
                    self.seeders += 1;
                    self.downloaded += 1;
                    PeerTransition::Completed
                } else {
                    // A seeder went back to downloading (restarted with data
                    // missing). The historical counter is not touched.
                    self.leechers += 1;
                    PeerTransition::Updated
                }
            }
        }
    }

    /// It removes the peers from the swarm that have not been updated for more
    /// than `current_cutoff` seconds, adjusting the counters exactly as an
    /// implicit `stopped` event would.
    pub fn remove_inactive_peers(&mut self, current_cutoff: DurationSinceUnixEpoch) {
        let mut removed_seeders: u32 = 0;
        let mut removed_leechers: u32 = 0;

        self.peers.retain(|_, peer| {
            if peer.updated > current_cutoff {
                return true;
            }
            if peer.is_seeder() {
                removed_seeders += 1;
            } else {
                removed_leechers += 1;
            }
            false
        });

        self.seeders = self
            .seeders
            .checked_sub(removed_seeders)
            .expect("seeder counter diverged from the peer list");
        self.leechers = self
            .leechers
            .checked_sub(removed_leechers)
            .expect("leecher counter diverged from the peer list");

        if removed_seeders + removed_leechers > 0 {
            self.mark_emptied_if_empty();
        }
    }

    /// Returns true when the entry has been empty for longer than the grace
    /// period and can be dropped from the registry.
    #[must_use]
    pub fn is_removable(&self, now: DurationSinceUnixEpoch, grace_period: Duration) -> bool {
        if !self.peers.is_empty() {
            return false;
        }

        match self.emptied_at {
            Some(emptied_at) => now.checked_sub(emptied_at).is_some_and(|elapsed| elapsed >= grace_period),
            // An entry that never held a peer has nothing worth keeping.
            None => true,
        }
    }

    fn drop_from_counters(&mut self, was_seeder: bool) {
        if was_seeder {
            self.seeders = self.seeders.checked_sub(1).expect("seeder counter diverged from the peer list");
        } else {
            self.leechers = self
                .leechers
                .checked_sub(1)
                .expect("leecher counter diverged from the peer list");
        }
    }

    fn mark_emptied_if_empty(&mut self) {
        if self.peers.is_empty() {
            self.emptied_at = Some(CurrentClock::now());
        }
    }
}
