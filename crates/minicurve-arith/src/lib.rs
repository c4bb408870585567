//! Modular arithmetic and short-Weierstrass curve arithmetic over small prime fields.
//!
//! All values are arbitrary-precision integers, but the order search is a
//! linear scan, so only toy-sized primes are practical.

#![forbid(unsafe_code)]

pub mod curve;
pub mod domain;
pub mod limits;
pub mod modular;
pub mod oracle;
pub mod point;

pub use curve::Curve;
pub use domain::Domain;
pub use limits::SearchLimits;
pub use point::Point;
