//! Structs to store the swarm data.
//!
//! There are two data structures:
//!
//! - The torrent [`Entry`](crate::core::torrent::entry::Entry): it contains
//!   the peers that are downloading or seeding one torrent, plus the swarm
//!   counters.
//! - The [`Torrents`](crate::core::torrent::repository::Torrents) repository:
//!   the in-memory registry mapping each info-hash to its entry.
//!
//! A swarm is created lazily on the first announce for an unseen info-hash
//! and dropped by the cleanup job once it has stayed empty past the
//! configured grace period.
pub mod entry;
pub mod repository;

pub use entry::{Entry, PeerTransition};
pub use repository::{EntryMutexStd, Torrents};
