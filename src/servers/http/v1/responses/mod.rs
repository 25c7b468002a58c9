//! HTTP response bodies.
//!
//! Both responses are bencoded dictionaries. Serde serializes struct fields
//! in declaration order, so fields are declared in the canonical
//! (alphabetical) bencode key order.
pub mod announce;
pub mod scrape;
