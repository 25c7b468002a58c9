//! Cryptographic primitives shared by the transport codecs.
pub mod ephemeral_instance_keys;
pub mod keys;
