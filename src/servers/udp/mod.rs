//! UDP tracker codec and packet handling.
//!
//! The binary packet formats are defined in
//! [BEP 15: UDP Tracker Protocol for `BitTorrent`](https://www.bittorrent.org/beps/bep_0015.html).
//! All integers are big-endian and fixed-width.
//!
//! Before announcing or scraping, a client must obtain a connection ID with a
//! `connect` request. The ID is a stateless cookie derived in
//! [`connection_cookie`] and verified on every subsequent request.
//!
//! Socket handling is out of scope: [`handlers::handle_packet`] takes the raw
//! payload and the remote address and returns the response packet to send
//! back.
pub mod connection_cookie;
pub mod error;
pub mod handlers;
pub mod peer_builder;
pub mod request;
pub mod response;

/// Magic number in `connect` requests, chosen by BEP 15.
pub const PROTOCOL_ID: i64 = 0x0417_2710_1980;

/// Maximum number of torrents that can be scraped in a single request.
pub const MAX_SCRAPE_TORRENTS: usize = 74;

/// Maximum size of a UDP packet the tracker will build.
pub const MAX_PACKET_SIZE: usize = 1496;
