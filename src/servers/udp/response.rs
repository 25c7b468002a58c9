//! BEP 15 response serialization.
//!
//! Packet layouts, all integers big-endian:
//!
//! ```text
//! connect  (16 bytes): action i32 (0), transaction_id i32, connection_id i64
//! announce (20 bytes + 6 per peer): action i32 (1), transaction_id i32,
//!                      interval u32, leechers u32, seeders u32, then
//!                      4-byte IPv4 address and 2-byte port per peer
//! scrape   (8 bytes + 12 per torrent): action i32 (2), transaction_id i32,
//!                      then seeders u32, completed u32, leechers u32 per
//!                      torrent, in request order
//! error    (8 bytes + message): action i32 (3), transaction_id i32, then the
//!                      UTF-8 message without a terminator
//! ```
//!
//! UDP compact peer lists are IPv4-only.
use std::net::Ipv4Addr;

use crate::servers::udp::request::{ACTION_ANNOUNCE, ACTION_CONNECT, ACTION_ERROR, ACTION_SCRAPE};

#[derive(Debug, PartialEq, Eq)]
pub enum Response {
    Connect(ConnectResponse),
    AnnounceIpv4(AnnounceResponse),
    Scrape(ScrapeResponse),
    Error(ErrorResponse),
}

#[derive(Debug, PartialEq, Eq)]
pub struct ConnectResponse {
    pub transaction_id: i32,
    pub connection_id: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct AnnounceResponse {
    pub transaction_id: i32,
    pub interval: u32,
    pub leechers: u32,
    pub seeders: u32,
    pub peers: Vec<ResponsePeer>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ResponsePeer {
    pub ip_address: Ipv4Addr,
    pub port: u16,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ScrapeResponse {
    pub transaction_id: i32,
    /// One entry per requested torrent, in request order.
    pub torrent_stats: Vec<TorrentScrapeStatistics>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct TorrentScrapeStatistics {
    pub seeders: u32,
    pub completed: u32,
    pub leechers: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub transaction_id: i32,
    pub message: String,
}

impl Response {
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packet: Vec<u8> = vec![];

        match self {
            Response::Connect(connect) => {
                packet.extend_from_slice(&ACTION_CONNECT.to_be_bytes());
                packet.extend_from_slice(&connect.transaction_id.to_be_bytes());
                packet.extend_from_slice(&connect.connection_id.to_be_bytes());
            }
            Response::AnnounceIpv4(announce) => {
                packet.extend_from_slice(&ACTION_ANNOUNCE.to_be_bytes());
                packet.extend_from_slice(&announce.transaction_id.to_be_bytes());
                packet.extend_from_slice(&announce.interval.to_be_bytes());
                packet.extend_from_slice(&announce.leechers.to_be_bytes());
                packet.extend_from_slice(&announce.seeders.to_be_bytes());
                for peer in &announce.peers {
                    packet.extend_from_slice(&peer.ip_address.octets());
                    packet.extend_from_slice(&peer.port.to_be_bytes());
                }
            }
            Response::Scrape(scrape) => {
                packet.extend_from_slice(&ACTION_SCRAPE.to_be_bytes());
                packet.extend_from_slice(&scrape.transaction_id.to_be_bytes());
                for stats in &scrape.torrent_stats {
                    packet.extend_from_slice(&stats.seeders.to_be_bytes());
                    packet.extend_from_slice(&stats.completed.to_be_bytes());
                    packet.extend_from_slice(&stats.leechers.to_be_bytes());
                }
            }
            Response::Error(error) => {
                packet.extend_from_slice(&ACTION_ERROR.to_be_bytes());
                packet.extend_from_slice(&error.transaction_id.to_be_bytes());
                packet.extend_from_slice(error.message.as_bytes());
            }
        }

        packet
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::{
        AnnounceResponse, ConnectResponse, ErrorResponse, Response, ResponsePeer, ScrapeResponse, TorrentScrapeStatistics,
    };

    #[test]
    fn a_connect_response_should_be_16_bytes() {
        let response = Response::Connect(ConnectResponse {
            transaction_id: 1,
            connection_id: 2,
        });

        let bytes = response.to_bytes();

        assert_eq!(
            bytes,
            vec![0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2]
        );
    }

    #[test]
    fn an_announce_response_should_pack_6_bytes_per_peer_after_the_20_byte_header() {
        let response = Response::AnnounceIpv4(AnnounceResponse {
            transaction_id: 1,
            interval: 120,
            leechers: 1,
            seeders: 2,
            peers: vec![ResponsePeer {
                ip_address: Ipv4Addr::new(105, 105, 105, 105),
                port: 0x7070,
            }],
        });

        let bytes = response.to_bytes();

        assert_eq!(bytes.len(), 26);
        assert_eq!(
            bytes,
            vec![
                0, 0, 0, 1, // action
                0, 0, 0, 1, // transaction_id
                0, 0, 0, 120, // interval
                0, 0, 0, 1, // leechers
                0, 0, 0, 2, // seeders
                0x69, 0x69, 0x69, 0x69, 0x70, 0x70, // peer
            ]
        );
    }

    #[test]
    fn a_scrape_response_should_pack_12_bytes_per_torrent_after_the_8_byte_header() {
        let response = Response::Scrape(ScrapeResponse {
            transaction_id: 9,
            torrent_stats: vec![
                TorrentScrapeStatistics {
                    seeders: 1,
                    completed: 2,
                    leechers: 3,
                },
                TorrentScrapeStatistics {
                    seeders: 4,
                    completed: 5,
                    leechers: 6,
                },
            ],
        });

        let bytes = response.to_bytes();

        assert_eq!(bytes.len(), 8 + 2 * 12);
        assert_eq!(
            bytes,
            vec![
                0, 0, 0, 2, // action
                0, 0, 0, 9, // transaction_id
                0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, // first torrent
                0, 0, 0, 4, 0, 0, 0, 5, 0, 0, 0, 6, // second torrent
            ]
        );
    }

    #[test]
    fn an_error_response_should_append_the_message_without_a_terminator() {
        let response = Response::Error(ErrorResponse {
            transaction_id: 5,
            message: "bad request".to_string(),
        });

        let bytes = response.to_bytes();

        assert_eq!(&bytes[0..4], &[0, 0, 0, 3]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 5]);
        assert_eq!(&bytes[8..], b"bad request");
    }
}
