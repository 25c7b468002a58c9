//! Configuration data structures for the swarm tracker.
//!
//! The configuration is loaded from a TOML file and can be overridden with
//! environment variables prefixed with `SWARM_TRACKER_`.
use std::env;
use std::fs;
use std::panic::Location;

use derive_more::Constructor;
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The maximum number of returned peers for a torrent.
pub const TORRENT_PEERS_LIMIT: usize = 74;

// Environment variables

/// The whole `tracker.toml` file content. It has priority over the config file.
/// Even if the file is not on the default path.
const ENV_VAR_CONFIG_TOML: &str = "SWARM_TRACKER_CONFIG_TOML";

/// The `tracker.toml` file location.
pub const ENV_VAR_CONFIG_TOML_PATH: &str = "SWARM_TRACKER_CONFIG_TOML_PATH";

/// Errors that can occur when loading the configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// Unable to load the configuration from the TOML sources.
    #[error("Failed processing the configuration: {source} {location}")]
    ConfigError {
        location: &'static Location<'static>,
        source: figment::Error,
    },
}

impl From<figment::Error> for Error {
    #[track_caller]
    fn from(err: figment::Error) -> Self {
        Self::ConfigError {
            location: Location::caller(),
            source: err,
        }
    }
}

/// Information required for loading config
#[derive(Debug, Default, Clone)]
pub struct Info {
    config_toml: Option<String>,
    config_toml_path: String,
}

impl Info {
    /// Build Configuration Info
    #[must_use]
    pub fn new(default_config_toml_path: String) -> Self {
        let config_toml = env::var(ENV_VAR_CONFIG_TOML).ok();

        let config_toml_path = env::var(ENV_VAR_CONFIG_TOML_PATH).unwrap_or(default_config_toml_path);

        Self {
            config_toml,
            config_toml_path,
        }
    }
}

/// Announce policy
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Constructor)]
pub struct AnnouncePolicy {
    /// Interval in seconds that the client should wait between sending regular
    /// announce requests to the tracker.
    ///
    /// It's a **recommended** wait time between announcements. This value is
    /// returned in every announce response.
    #[serde(default = "AnnouncePolicy::default_interval")]
    pub interval: u32,

    /// Minimum announce interval. Clients must not reannounce more frequently
    /// than this.
    #[serde(default = "AnnouncePolicy::default_interval_min")]
    pub interval_min: u32,
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self {
            interval: Self::default_interval(),
            interval_min: Self::default_interval_min(),
        }
    }
}

impl AnnouncePolicy {
    fn default_interval() -> u32 {
        120
    }

    fn default_interval_min() -> u32 {
        120
    }
}

#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Copy, Constructor)]
pub struct TrackerPolicy {
    /// Maximum time in seconds that a peer can be inactive before being
    /// considered an inactive peer. If a peer is inactive for more than this
    /// time, it will be removed from the torrent peer list.
    #[serde(default = "TrackerPolicy::default_max_peer_timeout")]
    pub max_peer_timeout: u32,

    /// If enabled, the tracker will remove torrents that have no peers.
    /// The clean up torrent job runs every `inactive_peer_cleanup_interval`
    /// seconds and it removes inactive peers. Eventually, the peer list of a
    /// torrent could be empty and the torrent will be removed if this option is
    /// enabled.
    #[serde(default = "TrackerPolicy::default_remove_peerless_torrents")]
    pub remove_peerless_torrents: bool,

    /// Time in seconds an empty swarm is kept before the cleanup job removes
    /// it. The grace period avoids dropping the completed-downloads counter
    /// for a torrent whose peers are only briefly gone.
    #[serde(default = "TrackerPolicy::default_peerless_torrent_grace_period")]
    pub peerless_torrent_grace_period: u32,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self {
            max_peer_timeout: Self::default_max_peer_timeout(),
            remove_peerless_torrents: Self::default_remove_peerless_torrents(),
            peerless_torrent_grace_period: Self::default_peerless_torrent_grace_period(),
        }
    }
}

impl TrackerPolicy {
    fn default_max_peer_timeout() -> u32 {
        240
    }

    fn default_remove_peerless_torrents() -> bool {
        true
    }

    fn default_peerless_torrent_grace_period() -> u32 {
        120
    }
}

/// Core tracker configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone)]
pub struct Core {
    // Announce policy configuration.
    #[serde(default = "Core::default_announce_policy")]
    pub announce_policy: AnnouncePolicy,

    /// Interval in seconds that the cleanup job will run to remove inactive
    /// peers from the torrent peer list.
    #[serde(default = "Core::default_inactive_peer_cleanup_interval")]
    pub inactive_peer_cleanup_interval: u64,

    // Tracker policy configuration.
    #[serde(default = "Core::default_tracker_policy")]
    pub tracker_policy: TrackerPolicy,

    /// Whether the tracker should collect statistics about tracker usage.
    /// If enabled, the tracker will collect statistics like the number of
    /// announce requests handled per IP version, etc.
    #[serde(default = "Core::default_tracker_usage_statistics")]
    pub tracker_usage_statistics: bool,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            announce_policy: Self::default_announce_policy(),
            inactive_peer_cleanup_interval: Self::default_inactive_peer_cleanup_interval(),
            tracker_policy: Self::default_tracker_policy(),
            tracker_usage_statistics: Self::default_tracker_usage_statistics(),
        }
    }
}

impl Core {
    fn default_announce_policy() -> AnnouncePolicy {
        AnnouncePolicy::default()
    }

    fn default_inactive_peer_cleanup_interval() -> u64 {
        60
    }

    fn default_tracker_policy() -> TrackerPolicy {
        TrackerPolicy::default()
    }

    fn default_tracker_usage_statistics() -> bool {
        true
    }
}

/// The whole tracker configuration.
#[derive(Serialize, Deserialize, PartialEq, Eq, Debug, Clone, Default)]
pub struct Configuration {
    #[serde(default = "Configuration::default_core")]
    pub core: Core,
}

impl Configuration {
    fn default_core() -> Core {
        Core::default()
    }

    /// Loads the configuration from the configuration file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if `path` does not exist or has a bad configuration.
    pub fn load_from_file(path: &str) -> Result<Configuration, Error> {
        let figment = Figment::new().merge(Toml::file(path)).merge(Env::prefixed("SWARM_TRACKER_"));

        let config: Configuration = figment.extract()?;

        Ok(config)
    }

    /// Loads the configuration from the `Info` struct. The whole
    /// configuration in toml format is included in the `info.config_toml`
    /// string, when present. Otherwise it is read from the configured path.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the TOML is invalid or does not match the
    /// configuration structure.
    pub fn load(info: &Info) -> Result<Configuration, Error> {
        let figment = if let Some(config_toml) = &info.config_toml {
            Figment::new()
                .merge(Toml::string(config_toml))
                .merge(Env::prefixed("SWARM_TRACKER_"))
        } else {
            Figment::new()
                .merge(Toml::file(&info.config_toml_path))
                .merge(Env::prefixed("SWARM_TRACKER_"))
        };

        let config: Configuration = figment.extract()?;

        Ok(config)
    }

    /// Saves the configuration to the configuration file.
    ///
    /// # Errors
    ///
    /// Will return `Err` if `path` is not writable.
    ///
    /// # Panics
    ///
    /// Will panic if the configuration cannot be encoded to TOML.
    pub fn save_to_file(&self, path: &str) -> std::io::Result<()> {
        fs::write(path, self.to_toml())
    }

    fn to_toml(&self) -> String {
        toml::to_string(self).expect("Could not encode TOML value")
    }
}

#[cfg(test)]
mod tests {
    use crate::{Configuration, Info};

    #[test]
    fn configuration_should_have_default_values() {
        let configuration = Configuration::default();

        assert_eq!(configuration.core.announce_policy.interval, 120);
        assert_eq!(configuration.core.announce_policy.interval_min, 120);
        assert_eq!(configuration.core.inactive_peer_cleanup_interval, 60);
        assert_eq!(configuration.core.tracker_policy.max_peer_timeout, 240);
        assert!(configuration.core.tracker_policy.remove_peerless_torrents);
        assert_eq!(configuration.core.tracker_policy.peerless_torrent_grace_period, 120);
        assert!(configuration.core.tracker_usage_statistics);
    }

    #[test]
    fn configuration_should_be_loaded_from_a_toml_config_string() {
        let config_toml = r#"
            [core]
            inactive_peer_cleanup_interval = 300

            [core.announce_policy]
            interval = 1800

            [core.tracker_policy]
            max_peer_timeout = 900
        "#
        .to_string();

        let info = Info {
            config_toml: Some(config_toml),
            config_toml_path: String::new(),
        };

        let configuration = Configuration::load(&info).expect("Failed to load configuration from info");

        assert_eq!(configuration.core.inactive_peer_cleanup_interval, 300);
        assert_eq!(configuration.core.announce_policy.interval, 1800);
        // Values not present in the TOML keep their defaults.
        assert_eq!(configuration.core.announce_policy.interval_min, 120);
        assert_eq!(configuration.core.tracker_policy.max_peer_timeout, 900);
        assert!(configuration.core.tracker_policy.remove_peerless_torrents);
    }

    #[test]
    fn configuration_should_allow_overriding_with_env_vars() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("SWARM_TRACKER_CORE.INACTIVE_PEER_CLEANUP_INTERVAL", "120");

            let info = Info {
                config_toml: Some("[core]\ninactive_peer_cleanup_interval = 300\n".to_string()),
                config_toml_path: String::new(),
            };

            let configuration = Configuration::load(&info).expect("Failed to load configuration from info");

            assert_eq!(configuration.core.inactive_peer_cleanup_interval, 120);

            Ok(())
        });
    }

    #[test]
    fn default_configuration_should_roundtrip_through_toml() {
        let configuration = Configuration::default();

        let toml = toml::to_string(&configuration).expect("Failed to encode configuration to TOML");
        let parsed: Configuration = toml::from_str(&toml).expect("Failed to parse encoded configuration");

        assert_eq!(parsed, configuration);
    }
}
