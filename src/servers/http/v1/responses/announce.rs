//! `Announce` response for the HTTP tracker.
//!
//! The two standard forms of an announce response are [`Normal`] and
//! [`Compact`].
//!
//! _"To reduce the size of tracker responses and to reduce memory and
//! computational requirements in trackers, trackers may return peers as a
//! packed string rather than as a bencoded list."_
//!
//! Refer to the official BEPs for more information:
//!
//! - [BEP 03: The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
//! - [BEP 23: Tracker Returns Compact Peer Lists](https://www.bittorrent.org/beps/bep_0023.html)
//! - [BEP 07: IPv6 Tracker Extension](https://www.bittorrent.org/beps/bep_0007.html)
use std::net::IpAddr;
use std::sync::Arc;

use serde::Serialize;
use serde_bytes::ByteBuf;
use swarm_tracker_primitives::peer;

use crate::core::AnnounceData;

/// The `Normal` (non-compact) form: the peer list is a bencoded list of
/// dictionaries.
#[derive(Serialize, Debug, PartialEq)]
pub struct Normal {
    pub complete: u32,
    pub incomplete: u32,
    pub interval: u32,
    #[serde(rename = "min interval")]
    pub interval_min: u32,
    pub peers: Vec<NormalPeer>,
}

impl From<AnnounceData> for Normal {
    fn from(data: AnnounceData) -> Self {
        Self {
            complete: data.stats.complete,
            incomplete: data.stats.incomplete,
            interval: data.policy.interval,
            interval_min: data.policy.interval_min,
            peers: data.peers.iter().map(|peer| NormalPeer::from(peer.as_ref())).collect(),
        }
    }
}

impl Normal {
    /// # Panics
    ///
    /// Will panic if the response cannot be bencoded.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        serde_bencode::to_bytes(&self).expect("it should be a bencodable response")
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct NormalPeer {
    pub ip: IpAddr,
    /// The raw 20-byte peer ID.
    #[serde(rename = "peer id")]
    pub peer_id: ByteBuf,
    pub port: u16,
}

impl From<&peer::Peer> for NormalPeer {
    fn from(peer: &peer::Peer) -> Self {
        Self {
            ip: peer.peer_addr.ip(),
            peer_id: ByteBuf::from(peer.peer_id.0.to_vec()),
            port: peer.peer_addr.port(),
        }
    }
}

/// The `Compact` form: peers are packed byte strings, 6 bytes per IPv4 peer
/// in `peers` and 18 bytes per IPv6 peer in `peers6`, big-endian and without
/// padding. This form does not carry peer IDs.
#[derive(Serialize, Debug, PartialEq)]
pub struct Compact {
    pub complete: u32,
    pub incomplete: u32,
    pub interval: u32,
    #[serde(rename = "min interval")]
    pub interval_min: u32,
    pub peers: ByteBuf,
    pub peers6: ByteBuf,
}

impl From<AnnounceData> for Compact {
    fn from(data: AnnounceData) -> Self {
        let (peers, peers6) = pack_peers(&data.peers);

        Self {
            complete: data.stats.complete,
            incomplete: data.stats.incomplete,
            interval: data.policy.interval,
            interval_min: data.policy.interval_min,
            peers,
            peers6,
        }
    }
}

impl Compact {
    /// # Panics
    ///
    /// Will panic if the response cannot be bencoded.
    #[must_use]
    pub fn body(&self) -> Vec<u8> {
        serde_bencode::to_bytes(&self).expect("it should be a bencodable response")
    }
}

fn pack_peers(peers: &[Arc<peer::Peer>]) -> (ByteBuf, ByteBuf) {
    let mut peers_v4: Vec<u8> = vec![];
    let mut peers_v6: Vec<u8> = vec![];

    for peer in peers {
        match peer.peer_addr.ip() {
            IpAddr::V4(ip) => {
                peers_v4.extend_from_slice(&ip.octets());
                peers_v4.extend_from_slice(&peer.peer_addr.port().to_be_bytes());
            }
            IpAddr::V6(ip) => {
                peers_v6.extend_from_slice(&ip.octets());
                peers_v6.extend_from_slice(&peer.peer_addr.port().to_be_bytes());
            }
        }
    }

    (ByteBuf::from(peers_v4), ByteBuf::from(peers_v6))
}
