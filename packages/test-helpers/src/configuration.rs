//! Configuration fixtures for testing.
use swarm_tracker_configuration::Configuration;

/// This configuration is used for testing. It uses the default values, which
/// keep the cleanup intervals short enough for tests that drive the clock.
#[must_use]
pub fn ephemeral() -> Configuration {
    Configuration::default()
}

/// Configuration for tests that must not drop empty swarms.
#[must_use]
pub fn ephemeral_keeping_peerless_torrents() -> Configuration {
    let mut config = Configuration::default();
    config.core.tracker_policy.remove_peerless_torrents = false;
    config
}

/// Configuration for tests that need empty swarms to be dropped immediately,
/// without waiting for the grace period.
#[must_use]
pub fn ephemeral_without_grace_period() -> Configuration {
    let mut config = Configuration::default();
    config.core.tracker_policy.peerless_torrent_grace_period = 0;
    config
}
