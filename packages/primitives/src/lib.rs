//! Primitive types for the swarm tracker.
//!
//! This crate contains the basic data structures shared by the tracker
//! packages: the torrent [`InfoHash`](info_hash::InfoHash), the swarm
//! [`Peer`](peer::Peer) and the aggregate statistics returned by `announce`
//! and `scrape` requests.
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod announce_event;
pub mod info_hash;
pub mod pagination;
pub mod peer;
pub mod swarm_metadata;
pub mod torrent_metrics;

/// Duration since the Unix Epoch.
pub type DurationSinceUnixEpoch = Duration;

/// A number of bytes reported by a peer: uploaded, downloaded or left.
///
/// The UDP tracker protocol ([BEP 15](https://www.bittorrent.org/beps/bep_0015.html))
/// transfers these counters as signed 64-bit integers, so the tracker keeps
/// them signed too and treats negative values as malformed input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NumberOfBytes(pub i64);

/// The IP version used by a peer: IPv4 or IPv6.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum IPVersion {
    IPv4,
    IPv6,
}
