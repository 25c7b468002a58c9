//! Random data generators for testing.
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

/// Returns a random alphanumeric string of a certain size.
pub fn string(size: usize) -> String {
    thread_rng().sample_iter(&Alphanumeric).take(size).map(char::from).collect()
}

/// Returns a random 20-byte array, useful for building info-hashes and peer
/// ids in tests.
#[must_use]
pub fn twenty_bytes() -> [u8; 20] {
    let mut bytes = [0u8; 20];
    thread_rng().fill(&mut bytes);
    bytes
}
