//! The access policy boundary.
//!
//! The tracker can be configured with an external allow/deny predicate that
//! is consulted before any announce mutates the swarm state. The predicate is
//! a black box to the engine: it may be backed by an allow list, a remote
//! service or anything else, and it may suspend. The engine only awaits its
//! verdict.
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use swarm_tracker_primitives::info_hash::InfoHash;
use swarm_tracker_primitives::peer;

/// The reason an announce was denied, surfaced to the client verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denied {
    pub reason: String,
}

impl Denied {
    #[must_use]
    pub fn new(reason: &str) -> Self {
        Self {
            reason: reason.to_owned(),
        }
    }
}

/// An asynchronous allow/deny predicate invoked once per announce, before any
/// state is mutated.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccessPolicy: Sync + Send {
    /// It authorizes an announce for the given torrent and peer.
    ///
    /// # Errors
    ///
    /// Will return `Denied` with a reason when the announce must be rejected.
    async fn authorize(&self, info_hash: &InfoHash, peer: &peer::Peer) -> Result<(), Denied>;
}
