//! Affine curve points with an explicit identity.

#![forbid(unsafe_code)]

use num_bigint::BigUint;
use std::fmt;

/// Point on a short-Weierstrass curve in affine coordinates.
///
/// The identity (point at infinity) is its own variant, never a coordinate pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Point {
    Identity,
    Affine { x: BigUint, y: BigUint },
}

impl Point {
    /// Create point from affine coordinates.
    /// Does not validate that the point is on any curve.
    pub fn new(x: impl Into<BigUint>, y: impl Into<BigUint>) -> Self {
        Self::Affine {
            x: x.into(),
            y: y.into(),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Affine coordinates, or None for the identity.
    pub fn coordinates(&self) -> Option<(&BigUint, &BigUint)> {
        match self {
            Self::Identity => None,
            Self::Affine { x, y } => Some((x, y)),
        }
    }

    pub fn x(&self) -> Option<&BigUint> {
        self.coordinates().map(|(x, _)| x)
    }

    pub fn y(&self) -> Option<&BigUint> {
        self.coordinates().map(|(_, y)| y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "O"),
            Self::Affine { x, y } => write!(f, "({x}, {y})"),
        }
    }
}
