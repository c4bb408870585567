//! Curve + generator, with the generator's order computed once and cached.

#![forbid(unsafe_code)]

use crate::curve::Curve;
use crate::limits::SearchLimits;
use crate::point::Point;
use minicurve_core::{Error, Result};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use once_cell::sync::OnceCell;

/// Read-only group parameters shared by the protocols.
///
/// The order is found lazily on first use. Concurrent first callers may each
/// run the scan; they all store the same value.
#[derive(Clone, Debug)]
pub struct Domain {
    curve: Curve,
    generator: Point,
    limits: SearchLimits,
    order: OnceCell<BigUint>,
}

impl Domain {
    /// Pair a curve with a generator. The generator must be on the curve and
    /// not the identity.
    pub fn new(curve: Curve, generator: Point) -> Result<Self> {
        Self::with_limits(curve, generator, SearchLimits::default())
    }

    /// Like `new`, with caps applied to the lazy order scan.
    pub fn with_limits(curve: Curve, generator: Point, limits: SearchLimits) -> Result<Self> {
        if generator.is_identity() || !curve.is_valid(&generator) {
            return Err(Error::InvalidGenerator);
        }
        Ok(Self {
            curve,
            generator,
            limits,
            order: OnceCell::new(),
        })
    }

    /// Use a known order instead of scanning.
    ///
    /// `order` must be the smallest `n > 1` with `n·G = O`: it annihilates
    /// `G`, and `(order / p)·G` does not for any prime `p | order`.
    pub fn with_order(curve: Curve, generator: Point, order: BigUint) -> Result<Self> {
        let domain = Self::new(curve, generator)?;
        if order <= BigUint::one() || !domain.mul_generator(&order).is_identity() {
            return Err(Error::InvalidGenerator);
        }
        for p in prime_factors(&order) {
            if domain.mul_generator(&(&order / &p)).is_identity() {
                return Err(Error::InvalidGenerator);
            }
        }
        domain.order.get_or_init(|| order);
        Ok(domain)
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn generator(&self) -> &Point {
        &self.generator
    }

    /// The generator's order `n`, computed on first call.
    pub fn order(&self) -> Result<&BigUint> {
        self.order
            .get_or_try_init(|| self.curve.order_within(&self.generator, &self.limits))
    }

    /// `k·G`
    pub fn mul_generator(&self, k: &BigUint) -> Point {
        self.curve.scalar_mul(&self.generator, k)
    }

    /// On the curve, not the identity, and annihilated by `n`.
    pub fn in_subgroup(&self, p: &Point) -> Result<bool> {
        if p.is_identity() || !self.curve.is_valid(p) {
            return Ok(false);
        }
        let n = self.order()?;
        Ok(self.curve.scalar_mul(p, n).is_identity())
    }

    /// Whether `0 < k < n`.
    pub fn is_scalar_in_range(&self, k: &BigUint) -> Result<bool> {
        let n = self.order()?;
        Ok(!k.is_zero() && k < n)
    }
}

/// Distinct prime factors by trial division.
fn prime_factors(n: &BigUint) -> Vec<BigUint> {
    let mut factors = Vec::new();
    let mut rest = n.clone();
    let mut d = BigUint::from(2u32);

    while &d * &d <= rest {
        if (&rest % &d).is_zero() {
            while (&rest % &d).is_zero() {
                rest /= &d;
            }
            factors.push(d.clone());
        }
        d += 1u32;
    }
    if rest > BigUint::one() {
        factors.push(rest);
    }
    factors
}
