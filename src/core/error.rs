//! Errors returned by the core `Tracker`.
//!
//! Error | Context | Description
//! ---|---|---
//! `AnnounceDenied` | Authorization | The configured access policy rejected the announce. No state is mutated.
//! `MalformedRequest` | Validation | The announce carried an invalid field (e.g. negative byte counters). No state is mutated.
use std::panic::Location;

/// Validation or authorization error returned by the core `Tracker`.
#[derive(thiserror::Error, Debug, Clone)]
pub enum Error {
    #[error("The announce was denied by the access policy: {reason}, {location}")]
    AnnounceDenied {
        reason: String,
        location: &'static Location<'static>,
    },

    #[error("The announce request is malformed: {message}, {location}")]
    MalformedRequest {
        message: String,
        location: &'static Location<'static>,
    },
}
