//! Core tracker domain services.
//!
//! There are two services:
//!
//! - [`get_torrent_info`]: it returns all the data about one torrent.
//! - [`get_torrents`]: it returns data about some torrents in bulk excluding the peer list.
//!
//! Both return owned snapshots: callers can never mutate the swarm state
//! through the returned values.
use std::sync::Arc;

use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::pagination::Pagination;
use swarm_tracker_primitives::peer::Peer;

use crate::core::Tracker;

/// It contains all the information the tracker has about a torrent
#[derive(Debug, PartialEq)]
pub struct Info {
    /// The infohash of the torrent this data is related to
    pub info_hash: InfoHash,
    /// The total number of seeders for this torrent. Peers that actively serve a full copy of the torrent data
    pub seeders: u64,
    /// The total number of peers that have ever completed downloading this torrent
    pub completed: u64,
    /// The total number of leechers for this torrent. Peers that are actively downloading this torrent
    pub leechers: u64,
    /// The swarm: the list of peers that are actively trying to download or serving this torrent
    pub peers: Option<Vec<Peer>>,
}

/// It contains only part of the information the tracker has about a torrent
///
/// It contains the same data as [Info] but without the list of peers in the swarm.
#[derive(Debug, PartialEq, Clone)]
pub struct BasicInfo {
    /// The infohash of the torrent this data is related to
    pub info_hash: InfoHash,
    /// The total number of seeders for this torrent. Peers that actively serve a full copy of the torrent data
    pub seeders: u64,
    /// The total number of peers that have ever completed downloading this torrent
    pub completed: u64,
    /// The total number of leechers for this torrent. Peers that are actively downloading this torrent
    pub leechers: u64,
}

/// It returns all the information the tracker has about one torrent in a [Info] struct.
///
/// # Panics
///
/// Will panic if the entry mutex is poisoned.
#[must_use]
pub fn get_torrent_info(tracker: &Arc<Tracker>, info_hash: &InfoHash) -> Option<Info> {
    let torrent_entry = tracker.torrents.get(info_hash)?;

    let entry = torrent_entry.lock().expect("it should get the entry lock");

    let stats = entry.get_stats();
    let peers = entry.get_peers(None);

    drop(entry);

    let peers = Some(peers.iter().map(|peer| **peer).collect());

    Some(Info {
        info_hash: *info_hash,
        seeders: u64::from(stats.complete),
        completed: u64::from(stats.downloaded),
        leechers: u64::from(stats.incomplete),
        peers,
    })
}

/// It returns all the information the tracker has about multiple torrents in a
/// [`BasicInfo`] struct, excluding the peer list.
///
/// # Panics
///
/// Will panic if an entry mutex is poisoned.
#[must_use]
pub fn get_torrents(tracker: &Arc<Tracker>, pagination: &Pagination) -> Vec<BasicInfo> {
    let mut basic_infos: Vec<BasicInfo> = vec![];

    for (info_hash, torrent_entry) in tracker.torrents.get_paginated(Some(pagination)) {
        let stats = torrent_entry.lock().expect("it should get the entry lock").get_stats();

        basic_infos.push(BasicInfo {
            info_hash,
            seeders: u64::from(stats.complete),
            completed: u64::from(stats.downloaded),
            leechers: u64::from(stats.incomplete),
        });
    }

    basic_infos
}
