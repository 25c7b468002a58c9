//! Helpers for the swarm tracker tests.
pub mod configuration;
pub mod random;
