//! Signature and key-agreement protocols over a shared `Domain`.

#![forbid(unsafe_code)]

pub mod ecdh;
pub mod ecdsa;
pub mod keys;
pub mod search;

pub use ecdh::{KeyAgreement, SharedSecret};
pub use ecdsa::{Ecdsa, Signature};
pub use keys::{KeyPair, PrivateKey};
pub use search::{find_generator, largest_order_point, GeneratorCandidate};
