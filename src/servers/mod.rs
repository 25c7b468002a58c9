//! Transport codecs for the tracker.
//!
//! - [`http`]: the bencoded response bodies used by HTTP trackers.
//! - [`udp`]: the BEP 15 binary packet codec, connection ID handshake and
//!   packet-level request handling.
pub mod http;
pub mod udp;
