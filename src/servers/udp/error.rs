//! Error types for the UDP packet handlers.
use std::panic::Location;

use thiserror::Error;

use crate::core;
use crate::servers::udp::request::ParseError;

#[derive(Debug, Error)]
pub enum Error {
    /// The connection ID was not issued by this instance for this client, or
    /// it has expired.
    #[error("connection id could not be verified")]
    InvalidConnectionId { location: &'static Location<'static> },

    /// The packet could not be parsed as a BEP 15 request.
    #[error("bad request: {source}")]
    BadRequest { source: ParseError },

    /// The tracker rejected the request.
    #[error("tracker error: {source}")]
    TrackerError { source: core::error::Error },
}

impl From<ParseError> for Error {
    fn from(parse_error: ParseError) -> Self {
        Self::BadRequest { source: parse_error }
    }
}

impl From<core::error::Error> for Error {
    fn from(error: core::error::Error) -> Self {
        Self::TrackerError { source: error }
    }
}
