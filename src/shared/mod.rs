//! Modules with generic logic used by several modules.
//!
//! - [`crypto`]: the ephemeral keys used to derive connection IDs.
pub mod crypto;
