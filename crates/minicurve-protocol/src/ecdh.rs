//! ECDH-style key agreement.
//!
//! Both parties derive `a·(b·G) = b·(a·G)`. Only the shared point's
//! x-coordinate is meant to leave this crate, as input to a KDF.

#![forbid(unsafe_code)]

use crate::keys;
use minicurve_arith::{Domain, Point};
use minicurve_core::{Error, Result};
use num_bigint::BigUint;
use std::fmt;
use std::sync::Arc;

/// Point agreed on by two (or more) parties.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret {
    point: Point,
}

impl SharedSecret {
    pub fn point(&self) -> &Point {
        &self.point
    }

    /// x-coordinate handed to key derivation. None only for the identity,
    /// which cannot arise from a prime-order subgroup.
    pub fn x(&self) -> Option<&BigUint> {
        self.point.x()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("point", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct KeyAgreement {
    domain: Arc<Domain>,
}

impl KeyAgreement {
    pub fn new(domain: Arc<Domain>) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Public point for `private`. Requires `0 < private < n`.
    pub fn public_key(&self, private: &BigUint) -> Result<Point> {
        keys::public_key(&self.domain, private)
    }

    /// `private · peer`, after checking `peer` lies in the generator's subgroup.
    pub fn shared_secret(&self, private: &BigUint, peer: &Point) -> Result<SharedSecret> {
        let point = self.extend(private, peer)?;
        Ok(SharedSecret { point })
    }

    /// One step of a multi-party exchange: multiply an intermediate point
    /// received from another participant by our scalar.
    ///
    /// For three parties, `(B·c)·a == (C·a)·b == (A·b)·c`.
    pub fn extend(&self, private: &BigUint, partial: &Point) -> Result<Point> {
        if !self.domain.is_scalar_in_range(private)? {
            return Err(Error::InvalidPrivateKey);
        }
        if !self.domain.in_subgroup(partial)? {
            return Err(Error::InvalidPeerKey);
        }
        Ok(self.domain.curve().scalar_mul(partial, private))
    }
}
