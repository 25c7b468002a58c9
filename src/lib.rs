//! Swarm Tracker.
//!
//! An in-memory `BitTorrent` swarm state engine with the codecs used by the
//! two common tracker transports.
//!
//! The crate is organized in three layers:
//!
//! - [`core`]: the domain layer. It owns the swarm registry and applies the
//!   announce state machine: peers joining, updating, completing and leaving
//!   swarms, plus the periodic cleanup of peers that silently disappear.
//! - [`servers`]: the transport codecs. The HTTP codec builds the bencoded
//!   `announce` and `scrape` response bodies (compact and non-compact), and
//!   the UDP codec parses and serializes the binary packets defined in
//!   [BEP 15](https://www.bittorrent.org/beps/bep_0015.html), including the
//!   connection ID handshake.
//! - [`shared`]: cross-cutting helpers, currently the ephemeral instance key
//!   that seeds the UDP connection IDs.
//!
//! A front end wires the layers together: it builds a
//! [`Tracker`](crate::core::Tracker) with
//! [`tracker_factory`](crate::core::services::tracker_factory), starts the
//! [`sweeper`](crate::core::sweeper) job, and per request decodes the wire
//! format, calls [`announce`](crate::core::Tracker::announce) or
//! [`scrape`](crate::core::Tracker::scrape), and encodes the returned data.
//!
//! ## Configuration
//!
//! The tracker behavior is driven by a
//! [`Configuration`](swarm_tracker_configuration::Configuration) loaded from
//! a TOML file and overridable with `SWARM_TRACKER_`-prefixed environment
//! variables. See the `swarm-tracker-configuration` crate for the full list
//! of options and their defaults.
pub mod core;
pub mod servers;
pub mod shared;

#[macro_use]
extern crate lazy_static;

/// This code needs to be copied into each crate.
/// Working version, for production.
#[cfg(not(test))]
pub(crate) type CurrentClock = swarm_tracker_clock::clock::Working;

/// Stopped version, for testing.
#[cfg(test)]
pub(crate) type CurrentClock = swarm_tracker_clock::clock::Stopped;
