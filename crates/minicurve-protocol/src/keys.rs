//! Private scalars and key pairs.

#![forbid(unsafe_code)]

use minicurve_arith::{Domain, Point};
use minicurve_core::{Error, Result};
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, RngCore};
use std::fmt;

/// Private scalar `d` with `0 < d < n`.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    scalar: BigUint,
}

impl PrivateKey {
    /// Wrap a scalar, checking it against the domain's order.
    pub fn new(scalar: BigUint, domain: &Domain) -> Result<Self> {
        if !domain.is_scalar_in_range(&scalar)? {
            return Err(Error::InvalidPrivateKey);
        }
        Ok(Self { scalar })
    }

    /// Uniform scalar in `[1, n)`.
    pub fn random<R: RngCore + CryptoRng>(domain: &Domain, rng: &mut R) -> Result<Self> {
        let n = domain.order()?;
        Ok(Self {
            scalar: rng.gen_biguint_range(&BigUint::one(), n),
        })
    }

    pub fn scalar(&self) -> &BigUint {
        &self.scalar
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("scalar", &"<redacted>")
            .finish()
    }
}

/// Private scalar together with its public point `d·G`.
#[derive(Clone, Debug)]
pub struct KeyPair {
    private: PrivateKey,
    public: Point,
}

impl KeyPair {
    pub fn from_private(domain: &Domain, private: PrivateKey) -> Self {
        let public = domain.mul_generator(private.scalar());
        Self { private, public }
    }

    pub fn generate<R: RngCore + CryptoRng>(domain: &Domain, rng: &mut R) -> Result<Self> {
        let private = PrivateKey::random(domain, rng)?;
        Ok(Self::from_private(domain, private))
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }

    pub fn public_key(&self) -> &Point {
        &self.public
    }
}

/// `d·G`, after checking `0 < d < n`.
pub fn public_key(domain: &Domain, private: &BigUint) -> Result<Point> {
    if !domain.is_scalar_in_range(private)? {
        return Err(Error::InvalidPrivateKey);
    }
    Ok(domain.mul_generator(private))
}
