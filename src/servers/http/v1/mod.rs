//! Version 1 of the HTTP tracker protocol.
pub mod responses;
