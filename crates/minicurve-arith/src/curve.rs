//! Short-Weierstrass curve over a prime field.
//!
//! y² = x³ + a·x + b (mod q)

#![forbid(unsafe_code)]

use crate::limits::SearchLimits;
use crate::modular::{self, add_mod, mul_mod, sub_mod};
use crate::point::Point;
use log::{debug, trace};
use minicurve_core::{Error, Result};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rand::Rng;

/// Progress is traced every this many multiples during an order scan.
const ORDER_TRACE_INTERVAL: u64 = 1 << 16;

/// Largest supported field prime, in bits. `is_probable_prime` is exact
/// below 3.3e24 (about 2^81.4).
pub const MAX_MODULUS_BITS: u64 = 81;

/// Curve parameters `(a, b, q)`. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Curve {
    a: BigUint,
    b: BigUint,
    q: BigUint,
}

impl Curve {
    /// Create a curve, checking `0 < a < q`, `0 < b < q`, that `q > 2` is
    /// prime and at most `MAX_MODULUS_BITS` bits, and that the discriminant
    /// `4a³ + 27b²` is non-zero mod `q`.
    pub fn new(a: impl Into<BigUint>, b: impl Into<BigUint>, q: impl Into<BigUint>) -> Result<Self> {
        let (a, b, q) = (a.into(), b.into(), q.into());

        if q <= BigUint::from(2u32) {
            return Err(Error::InvalidCurveParameters(format!("q = {q} must exceed 2")));
        }
        if q.bits() > MAX_MODULUS_BITS {
            return Err(Error::InvalidCurveParameters(format!(
                "q = {q} exceeds {MAX_MODULUS_BITS} bits"
            )));
        }
        if a.is_zero() || a >= q {
            return Err(Error::InvalidCurveParameters(format!("a = {a} not in (0, {q})")));
        }
        if b.is_zero() || b >= q {
            return Err(Error::InvalidCurveParameters(format!("b = {b} not in (0, {q})")));
        }
        if !modular::is_probable_prime(&q) {
            return Err(Error::InvalidCurveParameters(format!("q = {q} is not prime")));
        }

        let disc = (BigUint::from(4u32) * &a * &a * &a + BigUint::from(27u32) * &b * &b) % &q;
        if disc.is_zero() {
            return Err(Error::InvalidCurveParameters(format!(
                "singular curve: 4a³ + 27b² ≡ 0 (mod {q})"
            )));
        }

        Ok(Self { a, b, q })
    }

    pub fn a(&self) -> &BigUint {
        &self.a
    }

    pub fn b(&self) -> &BigUint {
        &self.b
    }

    /// The field prime.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Right-hand side `x³ + a·x + b mod q`.
    pub fn rhs(&self, x: &BigUint) -> BigUint {
        let x = x % &self.q;
        let x3 = mul_mod(&mul_mod(&x, &x, &self.q), &x, &self.q);
        add_mod(&add_mod(&x3, &mul_mod(&self.a, &x, &self.q), &self.q), &self.b, &self.q)
    }

    /// Identity is valid; affine points need reduced coordinates satisfying the equation.
    pub fn is_valid(&self, p: &Point) -> bool {
        match p.coordinates() {
            None => true,
            Some((x, y)) => {
                x < &self.q && y < &self.q && mul_mod(y, y, &self.q) == self.rhs(x)
            }
        }
    }

    /// Both points with the given x-coordinate, smaller y first.
    pub fn points_at(&self, x: &BigUint) -> Result<(Point, Point)> {
        self.points_at_with(x, &mut rand::thread_rng(), &SearchLimits::default())
    }

    /// `points_at` with an explicit randomness source for the square root.
    pub fn points_at_with<R: Rng + ?Sized>(
        &self,
        x: &BigUint,
        rng: &mut R,
        limits: &SearchLimits,
    ) -> Result<(Point, Point)> {
        if x >= &self.q {
            return Err(Error::CoordinateOutOfRange);
        }

        let roots = modular::mod_sqrt(&self.rhs(x), &self.q, rng, limits)?;
        Ok((
            Point::new(x.clone(), roots.root),
            Point::new(x.clone(), roots.neg_root),
        ))
    }

    /// Additive inverse: (x, y) -> (x, -y).
    pub fn negate(&self, p: &Point) -> Point {
        match p.coordinates() {
            None => Point::Identity,
            Some((x, y)) => Point::new(x.clone(), (&self.q - y % &self.q) % &self.q),
        }
    }

    /// Group law: P1 + P2.
    pub fn add(&self, p1: &Point, p2: &Point) -> Point {
        let q = &self.q;
        let (x1, y1) = match p1.coordinates() {
            None => return p2.clone(),
            Some((x, y)) => (x % q, y % q),
        };
        let (x2, y2) = match p2.coordinates() {
            None => return p1.clone(),
            Some((x, y)) => (x % q, y % q),
        };

        // Mutual inverses, or a vertical tangent at y = 0
        if x1 == x2 && (y1 != y2 || y1.is_zero()) {
            return Point::Identity;
        }

        let lambda = if x1 == x2 {
            // Tangent: (3x² + a) / 2y
            let num = add_mod(&(BigUint::from(3u32) * &x1 * &x1), &self.a, q);
            let den = add_mod(&y1, &y1, q);
            self.div(&num, &den)
        } else {
            // Chord: (y2 - y1) / (x2 - x1)
            self.div(&sub_mod(&y2, &y1, q), &sub_mod(&x2, &x1, q))
        };

        let x3 = sub_mod(&sub_mod(&mul_mod(&lambda, &lambda, q), &x1, q), &x2, q);
        let y3 = sub_mod(&mul_mod(&lambda, &sub_mod(&x1, &x3, q), q), &y1, q);

        Point::Affine { x: x3, y: y3 }
    }

    /// Point doubling: 2P.
    pub fn double(&self, p: &Point) -> Point {
        self.add(p, p)
    }

    /// Scalar multiplication: k * P.
    /// Uses double-and-add, LSB first. `k` is not reduced by the point's order.
    pub fn scalar_mul(&self, p: &Point, k: &BigUint) -> Point {
        let mut result = Point::Identity;
        let mut base = p.clone();

        for bit in 0..k.bits() {
            if k.bit(bit) {
                result = self.add(&result, &base);
            }
            base = self.double(&base);
        }

        result
    }

    /// Hasse upper bound on the group size: `q + 1 + 2⌈√q⌉`.
    ///
    /// No point can have an order beyond this.
    pub fn hasse_bound(&self) -> BigUint {
        let mut root = self.q.sqrt();
        if &root * &root < self.q {
            root += 1u32;
        }
        &self.q + 1u32 + root * 2u32
    }

    /// Order of `g`: the smallest `n > 0` with `n·g = O`.
    ///
    /// Brute-force linear scan, O(q). Only suitable for toy curves;
    /// cryptographic sizes need a point-counting algorithm.
    pub fn order(&self, g: &Point) -> Result<BigUint> {
        self.order_within(g, &SearchLimits::default())
    }

    /// `order` with a caller-imposed cap on the number of multiples examined.
    pub fn order_within(&self, g: &Point, limits: &SearchLimits) -> Result<BigUint> {
        if g.is_identity() || !self.is_valid(g) {
            return Err(Error::InvalidGenerator);
        }

        let mut bound = self.hasse_bound().to_u64().unwrap_or(u64::MAX);
        if let Some(cap) = limits.max_order_scan {
            bound = bound.min(cap);
        }

        // acc = i·g
        let mut acc = g.clone();
        for i in 1..=bound {
            if acc.is_identity() {
                debug!("order of {g} on {self} is {i}");
                return Ok(BigUint::from(i));
            }
            if i % ORDER_TRACE_INTERVAL == 0 {
                trace!("order scan of {g}: {i}/{bound} multiples");
            }
            acc = self.add(&acc, g);
        }

        Err(Error::OrderNotFound { scanned: bound })
    }

    /// `num / den mod q`. `den` must be non-zero mod q.
    fn div(&self, num: &BigUint, den: &BigUint) -> BigUint {
        match modular::mod_inverse(den, &self.q) {
            Ok(inv) => mul_mod(num, &inv, &self.q),
            Err(_) => unreachable!("non-zero element of a prime field has an inverse"),
        }
    }
}

impl std::fmt::Display for Curve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EC({}, {}, {})", self.a, self.b, self.q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn ec97() -> Curve {
        Curve::new(2u32, 3u32, 97u32).unwrap()
    }

    fn g() -> Point {
        Point::new(3u32, 6u32)
    }

    #[test]
    fn test_new_rejects_bad_parameters() {
        let bad = [
            (0u32, 3u32, 97u32), // a = 0
            (2, 0, 97),          // b = 0
            (97, 3, 97),         // a >= q
            (2, 98, 97),         // b >= q
            (1, 1, 2),           // q too small
            (2, 3, 91),          // q composite
            (94, 2, 97),         // 4(-3)³ + 27·2² = 0
        ];
        for (a, b, q) in bad {
            assert!(
                matches!(Curve::new(a, b, q), Err(Error::InvalidCurveParameters(_))),
                "EC({a}, {b}, {q}) should be rejected"
            );
        }
    }

    #[test]
    fn test_new_rejects_oversized_modulus() {
        // Strong pseudoprime to every base up to 37
        let q = BigUint::parse_bytes(b"3317044064679887385961981", 10).unwrap();
        assert!(q.bits() > MAX_MODULUS_BITS);
        assert!(matches!(
            Curve::new(1u32, 1u32, q),
            Err(Error::InvalidCurveParameters(_))
        ));

        // Largest 81-bit prime is still accepted: 2^81 - 63
        let q = (BigUint::from(1u32) << 81u32) - 63u32;
        assert_eq!(q.bits(), MAX_MODULUS_BITS);
        assert!(Curve::new(1u32, 1u32, q).is_ok());
    }

    #[test]
    fn test_generator_on_curve() {
        let ec = ec97();
        assert!(ec.is_valid(&g()));
        assert!(ec.is_valid(&Point::Identity));
        assert!(!ec.is_valid(&Point::new(3u32, 7u32)));
        // unreduced coordinates are rejected
        assert!(!ec.is_valid(&Point::new(100u32, 6u32)));
    }

    #[test]
    fn test_points_at() {
        let ec = ec97();
        let (p, mp) = ec.points_at(&big(3)).unwrap();
        assert_eq!(p, Point::new(3u32, 6u32));
        assert_eq!(mp, Point::new(3u32, 91u32));

        let (p, mp) = ec.points_at(&big(10)).unwrap();
        assert_eq!(p, Point::new(10u32, 21u32));
        assert_eq!(mp, Point::new(10u32, 76u32));
    }

    #[test]
    fn test_points_at_without_root_fails() {
        let ec = ec97();
        // x = 2: 8 + 4 + 3 = 15 is a non-residue mod 97
        assert_eq!(ec.points_at(&big(2)), Err(Error::NotAResidue));
    }

    #[test]
    fn test_points_at_out_of_range() {
        let ec = ec97();
        assert_eq!(ec.points_at(&big(97)), Err(Error::CoordinateOutOfRange));
    }

    #[test]
    fn test_points_at_zero_y() {
        // x = 30: 27000 + 60 + 3 ≡ 0 (mod 97)
        let ec = ec97();
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let (p, mp) = ec
            .points_at_with(&big(30), &mut rng, &SearchLimits::default())
            .unwrap();
        assert_eq!(p, Point::new(30u32, 0u32));
        assert_eq!(p, mp);
    }

    #[test]
    fn test_negate() {
        let ec = ec97();
        assert_eq!(ec.negate(&g()), Point::new(3u32, 91u32));
        assert_eq!(ec.negate(&Point::Identity), Point::Identity);
        assert_eq!(ec.negate(&Point::new(30u32, 0u32)), Point::new(30u32, 0u32));
    }

    #[test]
    fn test_add_known_values() {
        let ec = ec97();
        assert_eq!(ec.add(&g(), &Point::new(10u32, 76u32)), Point::new(87u32, 27u32));
        assert_eq!(ec.add(&g(), &Point::new(10u32, 21u32)), Point::new(49u32, 34u32));
    }

    #[test]
    fn test_infinity_identity() {
        let ec = ec97();
        assert_eq!(ec.add(&g(), &Point::Identity), g());
        assert_eq!(ec.add(&Point::Identity, &g()), g());
        assert!(ec.add(&Point::Identity, &Point::Identity).is_identity());
    }

    #[test]
    fn test_vertical_tangent() {
        let ec = ec97();
        let p = Point::new(30u32, 0u32);
        assert!(ec.double(&p).is_identity());
        assert_eq!(ec.order(&p).unwrap(), big(2));
    }

    #[test]
    fn test_multiples_of_generator() {
        let ec = ec97();
        let expected = [
            Point::Identity,
            Point::new(3u32, 6u32),
            Point::new(80u32, 10u32),
            Point::new(80u32, 87u32),
            Point::new(3u32, 91u32),
            Point::Identity,
            Point::new(3u32, 6u32),
        ];
        for (k, p) in expected.iter().enumerate() {
            assert_eq!(&ec.scalar_mul(&g(), &big(k as u64)), p, "k = {k}");
        }
    }

    #[test]
    fn test_double_matches_add() {
        let ec = ec97();
        assert_eq!(ec.double(&g()), ec.scalar_mul(&g(), &big(2)));
        assert_eq!(ec.double(&g()), Point::new(80u32, 10u32));
    }

    #[test]
    fn test_order_of_generator() {
        let ec = ec97();
        assert_eq!(ec.order(&g()).unwrap(), big(5));
        assert!(ec.scalar_mul(&g(), &big(5)).is_identity());
        for i in 1..5 {
            assert!(!ec.scalar_mul(&g(), &big(i)).is_identity());
        }
    }

    #[test]
    fn test_order_rejects_invalid_generator() {
        let ec = ec97();
        assert_eq!(ec.order(&Point::Identity), Err(Error::InvalidGenerator));
        assert_eq!(ec.order(&Point::new(3u32, 7u32)), Err(Error::InvalidGenerator));
    }

    #[test]
    fn test_order_beyond_q_plus_one() {
        // EC(1, 1, 211) has 223 points, so every non-identity point has order 223
        let ec = Curve::new(1u32, 1u32, 211u32).unwrap();
        let g = Point::new(0u32, 1u32);
        assert_eq!(ec.hasse_bound(), big(242));
        assert_eq!(ec.order(&g).unwrap(), big(223));
    }

    #[test]
    fn test_order_scan_cap() {
        let ec = Curve::new(1u32, 1u32, 211u32).unwrap();
        let g = Point::new(0u32, 1u32);
        let limits = SearchLimits::default().with_max_order_scan(212);
        assert_eq!(
            ec.order_within(&g, &limits),
            Err(Error::OrderNotFound { scanned: 212 })
        );
    }

    #[test]
    fn test_hasse_bound() {
        // 97 + 1 + 2 * 10
        assert_eq!(ec97().hasse_bound(), big(118));
    }

    #[test]
    fn test_display() {
        assert_eq!(ec97().to_string(), "EC(2, 3, 97)");
    }

    /// Random affine points on EC(2, 3, 97).
    fn affine_point() -> impl Strategy<Value = Point> {
        (0u64..97, any::<bool>())
            .prop_filter_map("x must be on the curve", |(x, neg)| {
                let ec = ec97();
                let mut rng = ChaCha20Rng::seed_from_u64(x);
                let (p, mp) = ec
                    .points_at_with(&big(x), &mut rng, &SearchLimits::default())
                    .ok()?;
                Some(if neg { mp } else { p })
            })
    }

    proptest! {
        #[test]
        fn prop_identity_laws(p in affine_point()) {
            let ec = ec97();
            prop_assert!(ec.is_valid(&p));
            prop_assert_eq!(ec.add(&p, &Point::Identity), p.clone());
            prop_assert!(ec.add(&p, &ec.negate(&p)).is_identity());
        }

        #[test]
        fn prop_commutative(p in affine_point(), r in affine_point()) {
            let ec = ec97();
            prop_assert_eq!(ec.add(&p, &r), ec.add(&r, &p));
            prop_assert!(ec.is_valid(&ec.add(&p, &r)));
        }

        #[test]
        fn prop_associative(p in affine_point(), r in affine_point(), s in affine_point()) {
            let ec = ec97();
            let left = ec.add(&ec.add(&p, &r), &s);
            let right = ec.add(&p, &ec.add(&r, &s));
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_scalar_linearity(p in affine_point(), m in 0u64..200, n in 0u64..200) {
            let ec = ec97();
            let lhs = ec.scalar_mul(&p, &big(m + n));
            let rhs = ec.add(&ec.scalar_mul(&p, &big(m)), &ec.scalar_mul(&p, &big(n)));
            prop_assert_eq!(lhs, rhs);
        }

        #[test]
        fn prop_order_annihilates(p in affine_point()) {
            let ec = ec97();
            let n = ec.order(&p).unwrap();
            prop_assert!(ec.scalar_mul(&p, &n).is_identity());
            // the full group has 100 points
            prop_assert!((big(100) % n).is_zero());
        }
    }
}
