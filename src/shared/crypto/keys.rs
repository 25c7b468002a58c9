//! Cryptographic key handling.
pub mod seeds {
    //! Seed keepers.
    //!
    //! A **seed** is the secret the UDP handshake mixes into its connection
    //! IDs. Production uses the per-instance random seed, tests use a zeroed
    //! one so derived values are reproducible.
    use self::detail::CURRENT_SEED;
    use crate::shared::crypto::ephemeral_instance_keys::{Seed, RANDOM_SEED};

    /// A structure that can keep and provide a seed.
    pub trait Keeper {
        type Seed: Sized + Default + AsMut<[u8]>;

        fn get_seed() -> &'static Self::Seed;
    }

    /// The seed keeper for this running instance.
    pub struct Instance;

    /// The seed keeper for the current execution. Resolved at compile time to
    /// the instance seed in production and to the zeroed seed under test.
    pub struct Current;

    impl Keeper for Instance {
        type Seed = Seed;

        fn get_seed() -> &'static Self::Seed {
            &RANDOM_SEED
        }
    }

    impl Keeper for Current {
        type Seed = Seed;

        #[allow(clippy::needless_borrow)]
        fn get_seed() -> &'static Self::Seed {
            &CURRENT_SEED
        }
    }


    mod detail {
        use crate::shared::crypto::ephemeral_instance_keys::Seed;

        #[allow(dead_code)]
        pub const ZEROED_TEST_SEED: &Seed = &[0u8; 32];

        #[cfg(test)]
        pub use ZEROED_TEST_SEED as CURRENT_SEED;

        #[cfg(not(test))]
        pub use crate::shared::crypto::ephemeral_instance_keys::RANDOM_SEED as CURRENT_SEED;

    }
}
