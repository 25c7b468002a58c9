//! UDP packet handlers.
//!
//! The entry point is [`handle_packet`]: it decodes the raw payload, gates
//! `announce` and `scrape` requests through the connection cookie, delegates
//! to the tracker and encodes the result. Every failure is mapped to a BEP 15
//! error packet carrying the transaction ID when it could be recovered from
//! the packet, and zero otherwise.
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tracing::debug;

use crate::core::{PeersWanted, Tracker};
use crate::servers::udp::connection_cookie;
use crate::servers::udp::error::Error;
use crate::servers::udp::peer_builder;
use crate::servers::udp::request::{AnnounceRequest, ConnectRequest, Request, ScrapeRequest};
use crate::servers::udp::response::{
    AnnounceResponse, ConnectResponse, ErrorResponse, Response, ResponsePeer, ScrapeResponse, TorrentScrapeStatistics,
};

/// It handles a raw UDP packet and returns the response packet to send back.
///
/// It never fails: errors become BEP 15 error responses.
pub async fn handle_packet(payload: &[u8], remote_addr: SocketAddr, tracker: &Arc<Tracker>) -> Response {
    debug!("Handling {} bytes from {remote_addr}", payload.len());

    let response = match Request::parse(payload) {
        Ok(request) => match handle_request(request, remote_addr, tracker).await {
            Ok(response) => response,
            Err((error, transaction_id)) => handle_error(&error, transaction_id),
        },
        Err(parse_error) => handle_error(&Error::from(parse_error), recovered_transaction_id(payload)),
    };

    debug!("Response for {remote_addr}: {response:?}");

    response
}

/// It dispatches the request to the matching handler.
///
/// # Errors
///
/// Will return the handler error together with the transaction ID the error
/// response must carry.
pub async fn handle_request(
    request: Request,
    remote_addr: SocketAddr,
    tracker: &Arc<Tracker>,
) -> Result<Response, (Error, i32)> {
    match request {
        Request::Connect(connect_request) => Ok(handle_connect(remote_addr, &connect_request)),
        Request::Announce(announce_request) => {
            let transaction_id = announce_request.transaction_id;
            handle_announce(remote_addr, &announce_request, tracker)
                .await
                .map_err(|error| (error, transaction_id))
        }
        Request::Scrape(scrape_request) => {
            let transaction_id = scrape_request.transaction_id;
            handle_scrape(remote_addr, &scrape_request, tracker).map_err(|error| (error, transaction_id))
        }
    }
}

/// It issues a connection ID for the client.
#[must_use]
pub fn handle_connect(remote_addr: SocketAddr, request: &ConnectRequest) -> Response {
    let connection_id = connection_cookie::make(&remote_addr);

    Response::Connect(ConnectResponse {
        transaction_id: request.transaction_id,
        connection_id,
    })
}

/// It handles an announce request, applying the event to the swarm.
///
/// # Errors
///
/// Will return an error when the connection ID is not valid or when the
/// tracker rejects the announce.
pub async fn handle_announce(
    remote_addr: SocketAddr,
    request: &AnnounceRequest,
    tracker: &Arc<Tracker>,
) -> Result<Response, Error> {
    connection_cookie::check(&remote_addr, request.connection_id)?;

    let mut peer = peer_builder::from_request(request, &remote_addr.ip());
    let peers_wanted = PeersWanted::from(request.peers_wanted);

    let announce_data = tracker
        .announce(&request.info_hash, &mut peer, &remote_addr.ip(), &peers_wanted)
        .await?;

    // UDP compact peer lists are IPv4-only.
    let peers = announce_data
        .peers
        .iter()
        .filter_map(|peer| match peer.peer_addr.ip() {
            IpAddr::V4(ip_address) => Some(ResponsePeer {
                ip_address,
                port: peer.peer_addr.port(),
            }),
            IpAddr::V6(_) => None,
        })
        .collect();

    Ok(Response::AnnounceIpv4(AnnounceResponse {
        transaction_id: request.transaction_id,
        interval: announce_data.policy.interval,
        leechers: announce_data.stats.incomplete,
        seeders: announce_data.stats.complete,
        peers,
    }))
}

/// It handles a scrape request. Unknown torrents are reported zeroed.
///
/// # Errors
///
/// Will return an error when the connection ID is not valid.
pub fn handle_scrape(remote_addr: SocketAddr, request: &ScrapeRequest, tracker: &Arc<Tracker>) -> Result<Response, Error> {
    connection_cookie::check(&remote_addr, request.connection_id)?;

    let scrape_data = tracker.scrape(&request.info_hashes);

    let torrent_stats = request
        .info_hashes
        .iter()
        .map(|info_hash| {
            let stats = scrape_data.files.get(info_hash).copied().unwrap_or_default();

            TorrentScrapeStatistics {
                seeders: stats.complete,
                completed: stats.downloaded,
                leechers: stats.incomplete,
            }
        })
        .collect();

    Ok(Response::Scrape(ScrapeResponse {
        transaction_id: request.transaction_id,
        torrent_stats,
    }))
}

fn handle_error(error: &Error, transaction_id: i32) -> Response {
    debug!("Request error: {error}");

    Response::Error(ErrorResponse {
        transaction_id,
        message: error.to_string(),
    })
}

fn recovered_transaction_id(payload: &[u8]) -> i32 {
    if payload.len() < 16 {
        return 0;
    }

    let mut buf = [0u8; 4];
    buf.copy_from_slice(&payload[12..16]);
    i32::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Arc;

    use swarm_tracker_primitives::announce_event::AnnounceEvent;
    use swarm_tracker_primitives::info_hash::InfoHash;
    use swarm_tracker_primitives::peer;
    use swarm_tracker_test_helpers::configuration;

    use super::{handle_announce, handle_connect, handle_packet, handle_scrape};
    use crate::core::{events, Tracker};
    use crate::servers::udp::connection_cookie;
    use crate::servers::udp::request::{AnnounceRequest, ConnectRequest, ScrapeRequest};
    use crate::servers::udp::response::Response;
    use crate::servers::udp::PROTOCOL_ID;

    fn public_tracker() -> Arc<Tracker> {
        Arc::new(Tracker::new(&configuration::ephemeral(), None, None, events::Repo::new()))
    }

    fn remote_addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(126, 0, 0, 1)), 8080)
    }

    fn sample_info_hash() -> InfoHash {
        "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse().unwrap()
    }

    fn announce_request(connection_id: i64) -> AnnounceRequest {
        AnnounceRequest {
            connection_id,
            transaction_id: 42,
            info_hash: sample_info_hash(),
            peer_id: peer::Id(*b"-qB00000000000000001"),
            bytes_downloaded: 0,
            bytes_left: 200,
            bytes_uploaded: 0,
            event: AnnounceEvent::Started,
            ip_address: 0,
            key: 0,
            peers_wanted: 50,
            port: 8080,
        }
    }

    #[test]
    fn a_connect_request_should_be_answered_with_a_connection_id_for_the_client() {
        let response = handle_connect(remote_addr(), &ConnectRequest { transaction_id: 7 });

        let Response::Connect(connect) = response else {
            panic!("expected a connect response");
        };

        assert_eq!(connect.transaction_id, 7);
        assert_eq!(connect.connection_id, connection_cookie::make(&remote_addr()));
    }

    #[tokio::test]
    async fn an_announce_with_a_valid_connection_id_should_register_the_peer() {
        let tracker = public_tracker();

        let connection_id = connection_cookie::make(&remote_addr());

        let response = handle_announce(remote_addr(), &announce_request(connection_id), &tracker)
            .await
            .unwrap();

        let Response::AnnounceIpv4(announce) = response else {
            panic!("expected an announce response");
        };

        assert_eq!(announce.transaction_id, 42);
        assert_eq!(announce.leechers, 1);
        assert_eq!(announce.seeders, 0);
        // The requesting peer is not returned to itself.
        assert_eq!(announce.peers, vec![]);
    }

    #[tokio::test]
    async fn an_announce_with_an_invalid_connection_id_should_be_rejected_without_mutating_the_swarm() {
        let tracker = public_tracker();

        let result = handle_announce(remote_addr(), &announce_request(0), &tracker).await;

        assert!(result.is_err());
        assert!(tracker.torrents.is_empty());
    }

    #[tokio::test]
    async fn a_scrape_request_should_return_zeroed_stats_for_unknown_torrents_in_request_order() {
        let tracker = public_tracker();

        let connection_id = connection_cookie::make(&remote_addr());

        let request = ScrapeRequest {
            connection_id,
            transaction_id: 9,
            info_hashes: vec![sample_info_hash(), InfoHash([0xaa; 20])],
        };

        let response = handle_scrape(remote_addr(), &request, &tracker).unwrap();

        let Response::Scrape(scrape) = response else {
            panic!("expected a scrape response");
        };

        assert_eq!(scrape.transaction_id, 9);
        assert_eq!(scrape.torrent_stats.len(), 2);
        assert_eq!(scrape.torrent_stats[0].seeders, 0);
        assert_eq!(scrape.torrent_stats[0].leechers, 0);
    }

    #[tokio::test]
    async fn an_undersized_packet_should_be_answered_with_an_error_carrying_a_zero_transaction_id() {
        let tracker = public_tracker();

        let response = handle_packet(&[0u8; 3], remote_addr(), &tracker).await;

        let Response::Error(error) = response else {
            panic!("expected an error response");
        };

        assert_eq!(error.transaction_id, 0);
    }

    #[tokio::test]
    async fn an_unknown_action_should_be_answered_with_an_error_carrying_the_transaction_id() {
        let tracker = public_tracker();

        let mut packet = vec![];
        packet.extend_from_slice(&PROTOCOL_ID.to_be_bytes());
        packet.extend_from_slice(&9i32.to_be_bytes());
        packet.extend_from_slice(&77i32.to_be_bytes());

        let response = handle_packet(&packet, remote_addr(), &tracker).await;

        let Response::Error(error) = response else {
            panic!("expected an error response");
        };

        assert_eq!(error.transaction_id, 77);
    }

    #[tokio::test]
    async fn a_connect_announce_flow_should_work_end_to_end() {
        let tracker = public_tracker();

        let connect_response = handle_connect(remote_addr(), &ConnectRequest { transaction_id: 1 });

        let Response::Connect(connect) = connect_response else {
            panic!("expected a connect response");
        };

        let announce_response = handle_announce(remote_addr(), &announce_request(connect.connection_id), &tracker)
            .await
            .unwrap();

        assert!(matches!(announce_response, Response::AnnounceIpv4(_)));
        assert_eq!(tracker.get_torrents_metrics().torrents, 1);
    }
}
