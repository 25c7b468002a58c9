//! Logic to extract the domain peer from the announce request.
use std::net::{IpAddr, SocketAddr};

use swarm_tracker_clock::clock::Time;
use swarm_tracker_primitives::{peer, NumberOfBytes};

use crate::servers::udp::request::AnnounceRequest;
use crate::CurrentClock;

/// It builds a `Peer` from the announce request.
///
/// The peer IP is the source address of the packet, not the IP the client
/// claims in the request. The peer port is the one the client announces, as
/// the source port of the packet is usually ephemeral.
#[must_use]
pub fn from_request(announce_request: &AnnounceRequest, peer_ip: &IpAddr) -> peer::Peer {
    peer::Peer {
        peer_id: announce_request.peer_id,
        peer_addr: SocketAddr::new(*peer_ip, announce_request.port),
        updated: CurrentClock::now(),
        uploaded: NumberOfBytes(announce_request.bytes_uploaded),
        downloaded: NumberOfBytes(announce_request.bytes_downloaded),
        left: NumberOfBytes(announce_request.bytes_left),
        event: announce_request.event,
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use swarm_tracker_primitives::announce_event::AnnounceEvent;
    use swarm_tracker_primitives::peer;

    use super::from_request;
    use crate::servers::udp::request::AnnounceRequest;

    fn sample_announce_request() -> AnnounceRequest {
        AnnounceRequest {
            connection_id: 1,
            transaction_id: 2,
            info_hash: "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse().unwrap(),
            peer_id: peer::Id(*b"-qB00000000000000001"),
            bytes_downloaded: 100,
            bytes_left: 200,
            bytes_uploaded: 300,
            event: AnnounceEvent::Started,
            ip_address: 0,
            key: 0,
            peers_wanted: 50,
            port: 8080,
        }
    }

    #[test]
    fn it_should_use_the_packet_source_ip_and_the_announced_port() {
        let remote_ip = IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1));

        let peer = from_request(&sample_announce_request(), &remote_ip);

        assert_eq!(peer.peer_addr, SocketAddr::new(remote_ip, 8080));
    }

    #[test]
    fn it_should_copy_the_byte_counters_and_the_event() {
        let remote_ip = IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1));

        let peer = from_request(&sample_announce_request(), &remote_ip);

        assert_eq!(peer.downloaded.0, 100);
        assert_eq!(peer.left.0, 200);
        assert_eq!(peer.uploaded.0, 300);
        assert_eq!(peer.event, AnnounceEvent::Started);
    }
}
