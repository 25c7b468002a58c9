//! HTTP tracker codec.
//!
//! Only the response bodies live here. Request parsing and HTTP delivery are
//! left to the front end embedding the tracker.
pub mod v1;
