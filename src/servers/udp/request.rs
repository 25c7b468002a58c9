//! BEP 15 request parsing.
//!
//! Packet layouts, all integers big-endian:
//!
//! ```text
//! connect  (16 bytes): protocol_id i64, action i32 (0), transaction_id i32
//! announce (98 bytes): connection_id i64, action i32 (1), transaction_id i32,
//!                      info_hash 20, peer_id 20, downloaded i64, left i64,
//!                      uploaded i64, event i32, ip u32, key u32, numwant i32,
//!                      port u16
//! scrape   (16 bytes + 20 per torrent): connection_id i64, action i32 (2),
//!                      transaction_id i32, info_hashes
//! ```
//!
//! Announce packets may carry trailing extension bytes, which are ignored.
use thiserror::Error;

use swarm_tracker_primitives::announce_event::AnnounceEvent;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::peer;

use crate::servers::udp::{MAX_SCRAPE_TORRENTS, PROTOCOL_ID};

pub const ACTION_CONNECT: i32 = 0;
pub const ACTION_ANNOUNCE: i32 = 1;
pub const ACTION_SCRAPE: i32 = 2;
pub const ACTION_ERROR: i32 = 3;

const CONNECT_PACKET_SIZE: usize = 16;
const ANNOUNCE_PACKET_SIZE: usize = 98;
const SCRAPE_HEADER_SIZE: usize = 16;
const INFO_HASH_SIZE: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("packet too short: {len} bytes")]
    UndersizedPacket { len: usize },

    #[error("invalid protocol identifier: {protocol_id:#x}")]
    InvalidProtocolId { protocol_id: i64 },

    #[error("unknown action: {action}")]
    UnknownAction { action: i32 },

    #[error("requested {requested} torrents, the scrape limit is {MAX_SCRAPE_TORRENTS}")]
    TooManyInfoHashes { requested: usize },
}

#[derive(Debug, PartialEq, Eq)]
pub enum Request {
    Connect(ConnectRequest),
    Announce(AnnounceRequest),
    Scrape(ScrapeRequest),
}

#[derive(Debug, PartialEq, Eq)]
pub struct ConnectRequest {
    pub transaction_id: i32,
}

#[derive(Debug, PartialEq, Eq)]
pub struct AnnounceRequest {
    pub connection_id: i64,
    pub transaction_id: i32,
    pub info_hash: InfoHash,
    pub peer_id: peer::Id,
    pub bytes_downloaded: i64,
    pub bytes_left: i64,
    pub bytes_uploaded: i64,
    pub event: AnnounceEvent,
    /// The IP the client claims to announce for. Zero means "use the source
    /// address of the packet", which is also what this tracker always does.
    pub ip_address: u32,
    pub key: u32,
    pub peers_wanted: i32,
    pub port: u16,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ScrapeRequest {
    pub connection_id: i64,
    pub transaction_id: i32,
    pub info_hashes: Vec<InfoHash>,
}

impl Request {
    /// It parses a raw UDP packet into a request.
    ///
    /// # Errors
    ///
    /// Will return a [`ParseError`] when the packet is undersized, carries an
    /// unknown action, a bad magic number or too many scrape targets. It
    /// never panics on malformed input.
    pub fn parse(payload: &[u8]) -> Result<Request, ParseError> {
        if payload.len() < CONNECT_PACKET_SIZE {
            return Err(ParseError::UndersizedPacket { len: payload.len() });
        }

        let action = read_i32(payload, 8);

        match action {
            ACTION_CONNECT => Self::parse_connect(payload),
            ACTION_ANNOUNCE => Self::parse_announce(payload),
            ACTION_SCRAPE => Self::parse_scrape(payload),
            action => Err(ParseError::UnknownAction { action }),
        }
    }

    fn parse_connect(payload: &[u8]) -> Result<Request, ParseError> {
        let protocol_id = read_i64(payload, 0);

        if protocol_id != PROTOCOL_ID {
            return Err(ParseError::InvalidProtocolId { protocol_id });
        }

        Ok(Request::Connect(ConnectRequest {
            transaction_id: read_i32(payload, 12),
        }))
    }

    fn parse_announce(payload: &[u8]) -> Result<Request, ParseError> {
        // Trailing bytes beyond the fixed header are extension data.
        if payload.len() < ANNOUNCE_PACKET_SIZE {
            return Err(ParseError::UndersizedPacket { len: payload.len() });
        }

        Ok(Request::Announce(AnnounceRequest {
            connection_id: read_i64(payload, 0),
            transaction_id: read_i32(payload, 12),
            info_hash: InfoHash(read_20_bytes(payload, 16)),
            peer_id: peer::Id(read_20_bytes(payload, 36)),
            bytes_downloaded: read_i64(payload, 56),
            bytes_left: read_i64(payload, 64),
            bytes_uploaded: read_i64(payload, 72),
            event: AnnounceEvent::from_i32(read_i32(payload, 80)),
            ip_address: read_u32(payload, 84),
            key: read_u32(payload, 88),
            peers_wanted: read_i32(payload, 92),
            port: read_u16(payload, 96),
        }))
    }

    fn parse_scrape(payload: &[u8]) -> Result<Request, ParseError> {
        let requested = (payload.len() - SCRAPE_HEADER_SIZE) / INFO_HASH_SIZE;

        if requested > MAX_SCRAPE_TORRENTS {
            return Err(ParseError::TooManyInfoHashes { requested });
        }

        let mut info_hashes = Vec::with_capacity(requested);

        for index in 0..requested {
            info_hashes.push(InfoHash(read_20_bytes(payload, SCRAPE_HEADER_SIZE + index * INFO_HASH_SIZE)));
        }

        Ok(Request::Scrape(ScrapeRequest {
            connection_id: read_i64(payload, 0),
            transaction_id: read_i32(payload, 12),
            info_hashes,
        }))
    }
}

fn read_i64(bytes: &[u8], offset: usize) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    i64::from_be_bytes(buf)
}

fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    i32::from_be_bytes(buf)
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_be_bytes(buf)
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    let mut buf = [0u8; 2];
    buf.copy_from_slice(&bytes[offset..offset + 2]);
    u16::from_be_bytes(buf)
}

fn read_20_bytes(bytes: &[u8], offset: usize) -> [u8; 20] {
    let mut buf = [0u8; 20];
    buf.copy_from_slice(&bytes[offset..offset + 20]);
    buf
}

#[cfg(test)]
mod tests {
    use swarm_tracker_primitives::announce_event::AnnounceEvent;
    use swarm_tracker_primitives::info_hash::InfoHash;
    use swarm_tracker_primitives::peer;

    use super::{ParseError, Request};
    use crate::servers::udp::PROTOCOL_ID;

    fn connect_packet(transaction_id: i32) -> Vec<u8> {
        let mut packet = vec![];
        packet.extend_from_slice(&PROTOCOL_ID.to_be_bytes());
        packet.extend_from_slice(&0i32.to_be_bytes());
        packet.extend_from_slice(&transaction_id.to_be_bytes());
        packet
    }

    fn announce_packet() -> Vec<u8> {
        let mut packet = vec![];
        packet.extend_from_slice(&0x1122_3344_5566_7788_i64.to_be_bytes()); // connection_id
        packet.extend_from_slice(&1i32.to_be_bytes()); // action
        packet.extend_from_slice(&42i32.to_be_bytes()); // transaction_id
        packet.extend_from_slice(&[0x69u8; 20]); // info_hash
        packet.extend_from_slice(b"-qB00000000000000001"); // peer_id
        packet.extend_from_slice(&100i64.to_be_bytes()); // downloaded
        packet.extend_from_slice(&200i64.to_be_bytes()); // left
        packet.extend_from_slice(&300i64.to_be_bytes()); // uploaded
        packet.extend_from_slice(&2i32.to_be_bytes()); // event: started
        packet.extend_from_slice(&0u32.to_be_bytes()); // ip
        packet.extend_from_slice(&0u32.to_be_bytes()); // key
        packet.extend_from_slice(&50i32.to_be_bytes()); // numwant
        packet.extend_from_slice(&8080u16.to_be_bytes()); // port
        packet
    }

    #[test]
    fn it_should_parse_a_connect_request() {
        let request = Request::parse(&connect_packet(7)).unwrap();

        match request {
            Request::Connect(connect) => assert_eq!(connect.transaction_id, 7),
            other => panic!("expected a connect request, got {other:?}"),
        }
    }

    #[test]
    fn it_should_reject_a_connect_request_with_a_bad_magic_number() {
        let mut packet = connect_packet(7);
        packet[0] = 0xff;

        assert!(matches!(
            Request::parse(&packet),
            Err(ParseError::InvalidProtocolId { .. })
        ));
    }

    #[test]
    fn it_should_parse_an_announce_request() {
        let request = Request::parse(&announce_packet()).unwrap();

        let Request::Announce(announce) = request else {
            panic!("expected an announce request");
        };

        assert_eq!(announce.connection_id, 0x1122_3344_5566_7788);
        assert_eq!(announce.transaction_id, 42);
        assert_eq!(announce.info_hash, InfoHash([0x69; 20]));
        assert_eq!(announce.peer_id, peer::Id(*b"-qB00000000000000001"));
        assert_eq!(announce.bytes_downloaded, 100);
        assert_eq!(announce.bytes_left, 200);
        assert_eq!(announce.bytes_uploaded, 300);
        assert_eq!(announce.event, AnnounceEvent::Started);
        assert_eq!(announce.peers_wanted, 50);
        assert_eq!(announce.port, 8080);
    }

    #[test]
    fn it_should_ignore_trailing_extension_bytes_in_announce_requests() {
        let mut packet = announce_packet();
        packet.extend_from_slice(&[0u8; 10]);

        let trimmed = Request::parse(&announce_packet()).unwrap();
        let extended = Request::parse(&packet).unwrap();

        assert_eq!(trimmed, extended);
    }

    #[test]
    fn it_should_reject_an_undersized_announce_request() {
        let packet = announce_packet();

        assert_eq!(
            Request::parse(&packet[..97]),
            Err(ParseError::UndersizedPacket { len: 97 })
        );
    }

    #[test]
    fn it_should_parse_a_scrape_request_preserving_the_request_order() {
        let mut packet = vec![];
        packet.extend_from_slice(&1i64.to_be_bytes());
        packet.extend_from_slice(&2i32.to_be_bytes());
        packet.extend_from_slice(&9i32.to_be_bytes());
        packet.extend_from_slice(&[0xaau8; 20]);
        packet.extend_from_slice(&[0xbbu8; 20]);

        let Request::Scrape(scrape) = Request::parse(&packet).unwrap() else {
            panic!("expected a scrape request");
        };

        assert_eq!(scrape.transaction_id, 9);
        assert_eq!(scrape.info_hashes, vec![InfoHash([0xaa; 20]), InfoHash([0xbb; 20])]);
    }

    #[test]
    fn it_should_reject_a_scrape_request_with_too_many_torrents() {
        let mut packet = vec![];
        packet.extend_from_slice(&1i64.to_be_bytes());
        packet.extend_from_slice(&2i32.to_be_bytes());
        packet.extend_from_slice(&9i32.to_be_bytes());
        for _ in 0..75 {
            packet.extend_from_slice(&[0u8; 20]);
        }

        assert_eq!(Request::parse(&packet), Err(ParseError::TooManyInfoHashes { requested: 75 }));
    }

    #[test]
    fn it_should_reject_an_unknown_action() {
        let mut packet = connect_packet(7);
        packet[11] = 9;

        assert_eq!(Request::parse(&packet), Err(ParseError::UnknownAction { action: 9 }));
    }

    #[test]
    fn it_should_reject_an_undersized_packet_without_panicking() {
        assert_eq!(Request::parse(&[0u8; 3]), Err(ParseError::UndersizedPacket { len: 3 }));
    }
}
