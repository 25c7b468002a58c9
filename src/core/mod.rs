//! The domain layer tracker service.
//!
//! Its main responsibility is to handle the `announce` and `scrape` requests.
//! It owns the swarm registry (the in-memory torrents repository) and applies
//! the announce state machine to it.
//!
//! The tracker is not responsible for handling the network layer. Transport
//! front ends decode raw requests, hand protocol-neutral values to the
//! tracker, and encode the returned data in their wire format.
//!
//! ## Announces
//!
//! An announce is processed in this order:
//!
//! 1. The optional [`AccessPolicy`](crate::core::policy::AccessPolicy)
//!    predicate is awaited. A denial rejects the announce with the policy's
//!    reason before anything is mutated.
//! 2. The request is validated: negative byte counters are rejected, again
//!    before anything is mutated.
//! 3. The event is applied atomically to the swarm entry. The entry keeps the
//!    seeder and leecher counters in sync with the peer list on every path,
//!    and counts historical completions exactly once per witnessed download.
//! 4. The response is built with the swarm statistics and a random sample of
//!    other peers in the swarm, preferring the requester's address family.
//! 5. One lifecycle event is emitted per applied mutation, fire-and-forget.
//!
//! A `stopped` announce for a peer the tracker never saw is a no-op success,
//! and emits no event.
//!
//! ## Scrapes
//!
//! A scrape returns, for each requested info-hash, the number of seeders
//! (`complete`), leechers (`incomplete`) and historical completed downloads
//! (`downloaded`). Torrents the tracker does not know are reported zeroed and
//! are never created as a side effect.
//!
//! ## Cleanup
//!
//! The [`sweeper`](crate::core::sweeper) job periodically calls
//! [`Tracker::cleanup_torrents`] to prune peers that have stopped announcing
//! and to drop swarms that have stayed empty past the grace period.
pub mod error;
pub mod events;
pub mod policy;
pub mod services;
pub mod sweeper;
pub mod torrent;

use std::collections::HashMap;
use std::net::IpAddr;
use std::panic::Location;
use std::sync::Arc;
use std::time::Duration;

use derive_more::Constructor;
use swarm_tracker_configuration::{AnnouncePolicy, Configuration, TrackerPolicy, TORRENT_PEERS_LIMIT};
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::peer;
use swarm_tracker_primitives::swarm_metadata::SwarmMetadata;
use swarm_tracker_primitives::torrent_metrics::TorrentsMetrics;
use tracing::debug;

use self::error::Error;
use self::policy::AccessPolicy;
use self::torrent::{PeerTransition, Torrents};
use crate::CurrentClock;
use swarm_tracker_clock::clock::Time;

/// The domain layer tracker service.
pub struct Tracker {
    announce_policy: AnnouncePolicy,
    policy: TrackerPolicy,
    /// The in-memory torrents repository.
    pub torrents: Arc<Torrents>,
    access_policy: Option<Box<dyn AccessPolicy>>,
    event_sender: Option<Box<dyn events::Sender>>,
    event_repository: events::Repo,
}

/// How many peers the announcing client wants in the response.
///
/// Defaults to 50 when the client does not ask for a specific amount, and is
/// always clamped to the tracker-wide maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeersWanted {
    value: usize,
}

impl PeersWanted {
    const DEFAULT: usize = 50;

    /// The client wants a specific amount of peers, clamped to the maximum.
    #[must_use]
    pub fn only(limit: u32) -> Self {
        let wanted = usize::try_from(limit).map_or(TORRENT_PEERS_LIMIT, |limit| limit.min(TORRENT_PEERS_LIMIT));

        Self { value: wanted }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.value
    }
}

impl Default for PeersWanted {
    fn default() -> Self {
        Self { value: Self::DEFAULT }
    }
}

impl From<i32> for PeersWanted {
    fn from(value: i32) -> Self {
        match u32::try_from(value) {
            Ok(peers_wanted) => Self::only(peers_wanted),
            // Negative means the client leaves the amount to the tracker.
            Err(_) => Self::default(),
        }
    }
}

/// Structure that holds the data returned by the `announce` request.
#[derive(Clone, Debug, PartialEq, Constructor, Default)]
pub struct AnnounceData {
    /// The list of peers that are downloading the same torrent.
    /// It excludes the peer that made the request.
    pub peers: Vec<Arc<peer::Peer>>,
    /// Swarm statistics
    pub stats: SwarmMetadata,
    pub policy: AnnouncePolicy,
}

/// Structure that holds the data returned by the `scrape` request.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct ScrapeData {
    /// A map of infohashes and swarm metadata for each torrent.
    pub files: HashMap<InfoHash, SwarmMetadata>,
}

impl ScrapeData {
    /// Creates a new empty `ScrapeData` with no files (torrents).
    #[must_use]
    pub fn empty() -> Self {
        let files: HashMap<InfoHash, SwarmMetadata> = HashMap::new();
        Self { files }
    }

    /// Creates a new `ScrapeData` with zeroed metadata for each torrent.
    #[must_use]
    pub fn zeroed(info_hashes: &[InfoHash]) -> Self {
        let mut scrape_data = Self::empty();

        for info_hash in info_hashes {
            scrape_data.add_file(info_hash, SwarmMetadata::zeroed());
        }

        scrape_data
    }

    /// Adds a torrent to the `ScrapeData`.
    pub fn add_file(&mut self, info_hash: &InfoHash, swarm_metadata: SwarmMetadata) {
        self.files.insert(*info_hash, swarm_metadata);
    }
}

impl Tracker {
    /// `Tracker` constructor.
    #[must_use]
    pub fn new(
        config: &Configuration,
        access_policy: Option<Box<dyn AccessPolicy>>,
        event_sender: Option<Box<dyn events::Sender>>,
        event_repository: events::Repo,
    ) -> Tracker {
        Tracker {
            announce_policy: config.core.announce_policy,
            policy: config.core.tracker_policy,
            torrents: Arc::default(),
            access_policy,
            event_sender,
            event_repository,
        }
    }

    #[must_use]
    pub fn get_announce_policy(&self) -> AnnouncePolicy {
        self.announce_policy
    }

    /// It handles an announce request.
    ///
    /// BEP 03: [The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html).
    ///
    /// # Errors
    ///
    /// Will return `Error::AnnounceDenied` when the configured access policy
    /// rejects the announce, and `Error::MalformedRequest` when the request
    /// carries negative byte counters. Neither error mutates any state.
    pub async fn announce(
        &self,
        info_hash: &InfoHash,
        peer: &mut peer::Peer,
        remote_client_ip: &IpAddr,
        peers_wanted: &PeersWanted,
    ) -> Result<AnnounceData, Error> {
        self.authorize(info_hash, peer).await?;

        Self::validate(peer)?;

        debug!("Before: {peer:?}");
        peer.change_ip(remote_client_ip);
        debug!("After: {peer:?}");

        let (transition, stats) = self.torrents.upsert_peer_and_get_stats(info_hash, peer);

        let peers = self.get_torrent_peers_for_peer(info_hash, peer, peers_wanted);

        self.send_lifecycle_event(transition, info_hash, peer).await;

        Ok(AnnounceData {
            peers,
            stats,
            policy: self.get_announce_policy(),
        })
    }

    /// It handles a scrape request.
    ///
    /// BEP 48: [Tracker Protocol Extension: Scrape](https://www.bittorrent.org/beps/bep_0048.html).
    #[must_use]
    pub fn scrape(&self, info_hashes: &[InfoHash]) -> ScrapeData {
        let mut scrape_data = ScrapeData::empty();

        for info_hash in info_hashes {
            scrape_data.add_file(info_hash, self.get_swarm_metadata(info_hash));
        }

        scrape_data
    }

    /// It returns the data for a `scrape` response, without creating entries
    /// for unknown torrents.
    fn get_swarm_metadata(&self, info_hash: &InfoHash) -> SwarmMetadata {
        self.torrents.get_swarm_metadata(info_hash).unwrap_or_else(SwarmMetadata::zeroed)
    }

    async fn authorize(&self, info_hash: &InfoHash, peer: &peer::Peer) -> Result<(), Error> {
        let Some(access_policy) = &self.access_policy else {
            return Ok(());
        };

        access_policy
            .authorize(info_hash, peer)
            .await
            .map_err(|denied| Error::AnnounceDenied {
                reason: denied.reason,
                location: Location::caller(),
            })
    }

    fn validate(peer: &peer::Peer) -> Result<(), Error> {
        if peer.uploaded.0 < 0 || peer.downloaded.0 < 0 || peer.left.0 < 0 {
            return Err(Error::MalformedRequest {
                message: "negative byte counters".to_owned(),
                location: Location::caller(),
            });
        }

        Ok(())
    }

    fn get_torrent_peers_for_peer(
        &self,
        info_hash: &InfoHash,
        peer: &peer::Peer,
        peers_wanted: &PeersWanted,
    ) -> Vec<Arc<peer::Peer>> {
        match self.torrents.get(info_hash) {
            None => vec![],
            Some(entry) => entry
                .lock()
                .expect("it should get the entry lock")
                .get_peers_for_client(&peer.peer_addr, Some(peers_wanted.limit())),
        }
    }

    async fn send_lifecycle_event(&self, transition: PeerTransition, info_hash: &InfoHash, peer: &peer::Peer) {
        let event = match transition {
            PeerTransition::Started => events::Event::Started {
                info_hash: *info_hash,
                peer_addr: peer.peer_addr,
            },
            PeerTransition::Updated => events::Event::Updated {
                info_hash: *info_hash,
                peer_addr: peer.peer_addr,
            },
            PeerTransition::Completed => events::Event::Completed {
                info_hash: *info_hash,
                peer_addr: peer.peer_addr,
            },
            PeerTransition::Stopped => events::Event::Stopped {
                info_hash: *info_hash,
                peer_addr: peer.peer_addr,
            },
            PeerTransition::None => return,
        };

        if let Some(event_sender) = &self.event_sender {
            // Fire and forget: delivery failure never affects the swarm state.
            drop(event_sender.send_event(event).await);
        }
    }

    /// It calculates and returns the general [`TorrentsMetrics`].
    #[must_use]
    pub fn get_torrents_metrics(&self) -> TorrentsMetrics {
        self.torrents.get_metrics()
    }

    /// It returns the lifecycle event metrics.
    pub async fn get_event_metrics(&self) -> tokio::sync::RwLockReadGuard<'_, events::Metrics> {
        self.event_repository.get_metrics().await
    }

    /// Remove inactive peers and (optionally) peerless torrents.
    ///
    /// Inactive peers are pruned exactly as an implicit `stopped` event would
    /// remove them, keeping the swarm counters in sync.
    pub fn cleanup_torrents(&self) {
        let current_cutoff =
            CurrentClock::now_sub(&Duration::from_secs(u64::from(self.policy.max_peer_timeout))).unwrap_or_default();

        self.torrents.remove_inactive_peers(current_cutoff);

        if self.policy.remove_peerless_torrents {
            self.torrents.remove_peerless_torrents(&self.policy);
        }
    }
}
