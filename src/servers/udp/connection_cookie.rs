//! Stateless connection IDs for the UDP handshake.
//!
//! The tracker never stores the IDs it issues. A cookie is the hash of the
//! client socket address, the current time slot and the per-instance random
//! seed, so it can be re-derived and verified on every packet.
//!
//! Cookies are accepted for the slot they were minted in plus the following
//! one, so they stay valid between one and two [`COOKIE_LIFETIME`]s depending
//! on when inside the slot they were issued. They are bound to the client
//! address but not to any torrent, and they stop being valid when the process
//! restarts because the seed is regenerated.
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::panic::Location;
use std::time::Duration;

use swarm_tracker_clock::clock::Time;

use crate::servers::udp::error::Error;
use crate::shared::crypto::keys::seeds::{Current, Keeper};
use crate::CurrentClock;

/// A connection ID, as carried in the BEP 15 packets.
pub type Cookie = i64;

pub const COOKIE_LIFETIME: Duration = Duration::from_secs(120);

#[must_use]
pub fn make(remote_address: &SocketAddr) -> Cookie {
    build(remote_address, current_time_slot())
}

/// It checks that the cookie was issued by this instance for this client
/// within the last two time slots.
///
/// # Errors
///
/// Will return `Error::InvalidConnectionId` when the cookie does not match
/// any of the accepted time slots.
pub fn check(remote_address: &SocketAddr, cookie: Cookie) -> Result<(), Error> {
    let current_slot = current_time_slot();

    for time_slot in [current_slot, current_slot.saturating_sub(1)] {
        if cookie == build(remote_address, time_slot) {
            return Ok(());
        }
    }

    Err(Error::InvalidConnectionId {
        location: Location::caller(),
    })
}

fn current_time_slot() -> u64 {
    CurrentClock::now().as_secs() / COOKIE_LIFETIME.as_secs()
}

fn build(remote_address: &SocketAddr, time_slot: u64) -> Cookie {
    let seed = Current::get_seed();

    let mut hasher = DefaultHasher::new();

    remote_address.hash(&mut hasher);
    time_slot.hash(&mut hasher);
    seed.hash(&mut hasher);

    i64::from_le_bytes(hasher.finish().to_le_bytes())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::time::Duration;

    use swarm_tracker_clock::clock::stopped::Stopped as _;
    use swarm_tracker_clock::clock::{self};

    use super::{check, make, COOKIE_LIFETIME};

    fn remote_address() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0)
    }

    #[test]
    fn it_should_make_the_same_cookie_within_the_same_time_slot() {
        clock::Stopped::local_set(&Duration::from_secs(0));

        let cookie = make(&remote_address());

        clock::Stopped::local_add(&Duration::from_secs(COOKIE_LIFETIME.as_secs() - 1)).unwrap();

        assert_eq!(cookie, make(&remote_address()));
    }

    #[test]
    fn it_should_make_a_different_cookie_for_the_next_time_slot() {
        clock::Stopped::local_set(&Duration::from_secs(0));

        let cookie = make(&remote_address());

        clock::Stopped::local_add(&COOKIE_LIFETIME).unwrap();

        assert_ne!(cookie, make(&remote_address()));
    }

    #[test]
    fn it_should_make_different_cookies_for_different_clients() {
        clock::Stopped::local_set(&Duration::from_secs(0));

        let other_address = SocketAddr::new(IpAddr::V4(Ipv4Addr::BROADCAST), 1);

        assert_ne!(make(&remote_address()), make(&other_address));
    }

    #[test]
    fn it_should_be_valid_for_the_time_slot_it_was_minted_in() {
        clock::Stopped::local_set(&Duration::from_secs(0));

        let cookie = make(&remote_address());

        check(&remote_address(), cookie).unwrap();
    }

    #[test]
    fn it_should_still_be_valid_during_the_next_time_slot() {
        clock::Stopped::local_set(&Duration::from_secs(0));

        let cookie = make(&remote_address());

        clock::Stopped::local_add(&COOKIE_LIFETIME).unwrap();

        check(&remote_address(), cookie).unwrap();
    }

    #[test]
    fn it_should_not_be_valid_two_time_slots_later() {
        clock::Stopped::local_set(&Duration::from_secs(0));

        let cookie = make(&remote_address());

        clock::Stopped::local_add(&Duration::from_secs(COOKIE_LIFETIME.as_secs() * 2)).unwrap();

        assert!(check(&remote_address(), cookie).is_err());
    }

    #[test]
    fn it_should_not_be_valid_for_another_client() {
        clock::Stopped::local_set(&Duration::from_secs(0));

        let cookie = make(&remote_address());

        let other_address = SocketAddr::new(IpAddr::V4(Ipv4Addr::BROADCAST), 1);

        assert!(check(&other_address, cookie).is_err());
    }
}
