//! ECDSA-style signatures over a toy curve.
//!
//! sign:   r = (k·G).x mod n,  s = k⁻¹(h + r·d) mod n
//! verify: P = (h·s⁻¹)·G + (r·s⁻¹)·Q,  accept iff P.x ≡ r (mod n)
//!
//! The nonce `k` must be uniformly random, secret, and used for exactly one
//! signature. Two signatures sharing a `k`, or a `k` an attacker can guess,
//! reveal the private key `d`. `sign` takes `k` explicitly so that tests are
//! reproducible; real callers should use `sign_with_rng`.

#![forbid(unsafe_code)]

use crate::keys;
use log::debug;
use minicurve_arith::modular::mod_inverse;
use minicurve_arith::{Domain, Point};
use minicurve_core::{Error, Result};
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};
use std::fmt;
use std::sync::Arc;

/// Fresh nonces tried by `sign_with_rng` before giving up.
const MAX_SIGN_ATTEMPTS: u32 = 64;

/// Signature `(r, s)`, both in `[1, n)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub r: BigUint,
    pub s: BigUint,
}

impl Signature {
    pub fn new(r: impl Into<BigUint>, s: impl Into<BigUint>) -> Self {
        Self {
            r: r.into(),
            s: s.into(),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.r, self.s)
    }
}

/// Signer/verifier bound to one domain.
#[derive(Clone, Debug)]
pub struct Ecdsa {
    domain: Arc<Domain>,
}

impl Ecdsa {
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

    /// Sign `hash` with nonce `ephemeral`.
    ///
    /// `ephemeral` must be fresh, uniform in `(0, n)` and never disclosed; see
    /// the module docs. Returns `DegenerateSignature` when this nonce gives
    /// `r = 0` or `s = 0`, in which case the caller must draw another.
    pub fn sign(&self, hash: &BigUint, private: &BigUint, ephemeral: &BigUint) -> Result<Signature> {
        let n = self.domain.order()?;
        if !self.domain.is_scalar_in_range(ephemeral)? {
            return Err(Error::InvalidEphemeral);
        }
        if !self.domain.is_scalar_in_range(private)? {
            return Err(Error::InvalidPrivateKey);
        }

        let m = self.domain.mul_generator(ephemeral);
        let r = match m.x() {
            Some(x) => x % n,
            None => return Err(Error::DegenerateSignature),
        };
        if r.is_zero() {
            return Err(Error::DegenerateSignature);
        }

        let k_inv = mod_inverse(ephemeral, n)?;
        let s = k_inv * ((hash % n) + &r * private) % n;
        if s.is_zero() {
            return Err(Error::DegenerateSignature);
        }

        Ok(Signature { r, s })
    }

    /// Sign with nonces drawn from `rng`, retrying degenerate ones.
    pub fn sign_with_rng<R: RngCore + CryptoRng>(
        &self,
        hash: &BigUint,
        private: &BigUint,
        rng: &mut R,
    ) -> Result<Signature> {
        let n = self.domain.order()?;
        let one = BigUint::one();

        for attempt in 1..=MAX_SIGN_ATTEMPTS {
            let ephemeral = rng.gen_biguint_range(&one, n);
            match self.sign(hash, private, &ephemeral) {
                // NoInverse only happens when n is composite and shares a factor with k
                Err(Error::DegenerateSignature) | Err(Error::NoInverse) => {
                    debug!("nonce attempt {attempt} unusable, drawing another");
                }
                other => return other,
            }
        }

        Err(Error::DegenerateSignature)
    }

    /// Check `signature` over `hash` against `public`.
    ///
    /// `public` must be a non-identity point of the generator's subgroup,
    /// otherwise `InvalidPublicKey`. Out-of-range `r` or `s` simply fail.
    pub fn verify(&self, hash: &BigUint, signature: &Signature, public: &Point) -> Result<bool> {
        if !self.domain.in_subgroup(public)? {
            return Err(Error::InvalidPublicKey);
        }

        let n = self.domain.order()?;
        let Signature { r, s } = signature;
        if !self.domain.is_scalar_in_range(r)? || !self.domain.is_scalar_in_range(s)? {
            return Ok(false);
        }

        let w = match mod_inverse(s, n) {
            Ok(w) => w,
            Err(_) => return Ok(false),
        };
        let u1 = hash * &w % n;
        let u2 = r * &w % n;

        let curve = self.domain.curve();
        let p = curve.add(&self.domain.mul_generator(&u1), &curve.scalar_mul(public, &u2));

        Ok(match p.x() {
            Some(x) => &(x % n) == r,
            None => false,
        })
    }
}
