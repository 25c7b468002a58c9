//! Swarm lifecycle events.
//!
//! The tracker emits exactly one event per successfully applied announce
//! mutation. Events are notifications for external subscribers, not part of
//! the announce control flow: they are sent over a bounded channel with a
//! fire-and-forget contract, so a slow or failed subscriber never affects the
//! swarm state.
//!
//! The data is collected by using an `event-sender -> event listener` model.
//!
//! The tracker uses an [`events::Sender`](crate::core::events::Sender)
//! instance to send an event. The [`events::Keeper`](crate::core::events::Keeper)
//! listens to new events and uses the [`events::Repo`](crate::core::events::Repo)
//! to update and store the lifecycle metrics.
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use swarm_tracker_primitives::info_hash::InfoHash;
use tokio::sync::mpsc::error::SendError;
use tokio::sync::{mpsc, RwLock, RwLockReadGuard};
use tracing::debug;

const CHANNEL_BUFFER_SIZE: usize = 65_535;

/// A swarm lifecycle event. Fired once per applied announce mutation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Event {
    /// A peer joined a swarm.
    Started { info_hash: InfoHash, peer_addr: SocketAddr },
    /// A peer refreshed its registration (the keep-alive announce).
    Updated { info_hash: InfoHash, peer_addr: SocketAddr },
    /// A peer completed its download and became a seeder.
    Completed { info_hash: InfoHash, peer_addr: SocketAddr },
    /// A peer left a swarm.
    Stopped { info_hash: InfoHash, peer_addr: SocketAddr },
}

/// Lifecycle metrics collected by the tracker: the number of events emitted
/// per kind.
#[derive(Debug, PartialEq, Eq, Default)]
pub struct Metrics {
    /// Total number of `started` events emitted.
    pub started: u64,
    /// Total number of `updated` events emitted.
    pub updated: u64,
    /// Total number of `completed` events emitted.
    pub completed: u64,
    /// Total number of `stopped` events emitted.
    pub stopped: u64,
}

/// The service responsible for keeping the lifecycle metrics (listening to
/// events and handling them).
///
/// It actively listens to new events. When it receives a new event it
/// accordingly increases the counters.
pub struct Keeper {
    pub repository: Repo,
}

impl Default for Keeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Keeper {
    #[must_use]
    pub fn new() -> Self {
        Self { repository: Repo::new() }
    }

    #[must_use]
    pub fn new_active_instance() -> (Box<dyn Sender>, Repo) {
        let mut keeper = Self::new();

        let event_sender = keeper.run_event_listener();

        (event_sender, keeper.repository)
    }

    pub fn run_event_listener(&mut self) -> Box<dyn Sender> {
        let (sender, receiver) = mpsc::channel::<Event>(CHANNEL_BUFFER_SIZE);

        let repository = self.repository.clone();

        tokio::spawn(async move { event_listener(receiver, repository).await });

        Box::new(ChannelSender { sender })
    }
}

async fn event_listener(mut receiver: mpsc::Receiver<Event>, repository: Repo) {
    while let Some(event) = receiver.recv().await {
        event_handler(event, &repository).await;
    }
}

async fn event_handler(event: Event, repository: &Repo) {
    match event {
        Event::Started { .. } => repository.increase_started().await,
        Event::Updated { .. } => repository.increase_updated().await,
        Event::Completed { .. } => repository.increase_completed().await,
        Event::Stopped { .. } => repository.increase_stopped().await,
    }

    debug!("event metrics: {:?}", repository.get_metrics().await);
}

/// A trait to allow sending lifecycle events.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Sender: Sync + Send {
    async fn send_event(&self, event: Event) -> Option<Result<(), SendError<Event>>>;
}

/// An [`events::Sender`](crate::core::events::Sender) implementation.
///
/// It uses a channel sender to send the events. The channel is created by an
/// [`events::Keeper`](crate::core::events::Keeper).
pub struct ChannelSender {
    sender: mpsc::Sender<Event>,
}

#[async_trait]
impl Sender for ChannelSender {
    async fn send_event(&self, event: Event) -> Option<Result<(), SendError<Event>>> {
        Some(self.sender.send(event).await)
    }
}

/// A repository for the lifecycle metrics.
#[derive(Clone)]
pub struct Repo {
    pub metrics: Arc<RwLock<Metrics>>,
}

impl Default for Repo {
    fn default() -> Self {
        Self::new()
    }
}

impl Repo {
    #[must_use]
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(Metrics::default())),
        }
    }

    pub async fn get_metrics(&self) -> RwLockReadGuard<'_, Metrics> {
        self.metrics.read().await
    }

    pub async fn increase_started(&self) {
        let mut metrics_lock = self.metrics.write().await;
        metrics_lock.started += 1;
        drop(metrics_lock);
    }

    pub async fn increase_updated(&self) {
        let mut metrics_lock = self.metrics.write().await;
        metrics_lock.updated += 1;
        drop(metrics_lock);
    }

    pub async fn increase_completed(&self) {
        let mut metrics_lock = self.metrics.write().await;
        metrics_lock.completed += 1;
        drop(metrics_lock);
    }

    pub async fn increase_stopped(&self) {
        let mut metrics_lock = self.metrics.write().await;
        metrics_lock.stopped += 1;
        drop(metrics_lock);
    }
}

#[cfg(test)]
mod tests {
    mod the_event_keeper {
        use crate::core::events::{Event, Keeper, Metrics};

        fn an_event() -> Event {
            Event::Started {
                info_hash: "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse().unwrap(),
                peer_addr: "126.0.0.1:8080".parse().unwrap(),
            }
        }

        #[tokio::test]
        async fn should_contain_the_lifecycle_metrics() {
            let keeper = Keeper::new();

            let metrics = keeper.repository.get_metrics().await;

            assert_eq!(metrics.started, Metrics::default().started);
        }

        #[tokio::test]
        async fn should_create_an_event_sender_to_send_events() {
            let mut keeper = Keeper::new();

            let event_sender = keeper.run_event_listener();

            let result = event_sender.send_event(an_event()).await;

            assert!(result.is_some());
        }
    }

    mod the_event_handler {
        use crate::core::events::{event_handler, Event, Repo};

        fn event_for(kind: &str) -> Event {
            let info_hash = "3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0".parse().unwrap();
            let peer_addr = "126.0.0.1:8080".parse().unwrap();

            match kind {
                "started" => Event::Started { info_hash, peer_addr },
                "updated" => Event::Updated { info_hash, peer_addr },
                "completed" => Event::Completed { info_hash, peer_addr },
                "stopped" => Event::Stopped { info_hash, peer_addr },
                _ => unreachable!(),
            }
        }

        #[tokio::test]
        async fn should_increase_the_started_counter_when_it_receives_a_started_event() {
            let repository = Repo::new();

            event_handler(event_for("started"), &repository).await;

            assert_eq!(repository.get_metrics().await.started, 1);
        }

        #[tokio::test]
        async fn should_increase_the_completed_counter_when_it_receives_a_completed_event() {
            let repository = Repo::new();

            event_handler(event_for("completed"), &repository).await;

            assert_eq!(repository.get_metrics().await.completed, 1);
        }

        #[tokio::test]
        async fn should_increase_the_stopped_counter_when_it_receives_a_stopped_event() {
            let repository = Repo::new();

            event_handler(event_for("stopped"), &repository).await;

            assert_eq!(repository.get_metrics().await.stopped, 1);
        }
    }
}
