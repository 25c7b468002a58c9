//! The time when the application started. It is used to calculate the time
//! the application has been running and as the default fixed time for the
//! stopped clock.
use std::time::SystemTime;

lazy_static! {
    pub static ref TIME_AT_APP_START: SystemTime = SystemTime::now();
}
