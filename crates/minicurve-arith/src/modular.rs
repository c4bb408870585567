//! Modular arithmetic primitives over arbitrary-precision integers.
//!
//! - `egcd` / `mod_inverse`: extended Euclid
//! - `jacobi`: Jacobi symbol by quadratic reciprocity
//! - `mod_sqrt`: randomized square root (HAC Algorithm 3.34)

#![forbid(unsafe_code)]

use crate::limits::SearchLimits;
use log::debug;
use minicurve_core::{Error, Result};
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_traits::{One, Signed, Zero};
use rand::Rng;

/// Extended GCD: returns `(s, t, g)` with `a*s + b*t == g`.
///
/// Both inputs are expected to be non-negative.
pub fn egcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let (mut a, mut b) = (a.clone(), b.clone());
    let (mut s0, mut s1) = (BigInt::one(), BigInt::zero());
    let (mut t0, mut t1) = (BigInt::zero(), BigInt::one());

    while b.is_positive() {
        let quot = &a / &b;
        let rem = &a - &quot * &b;
        a = std::mem::replace(&mut b, rem);

        let s2 = &s0 - &quot * &s1;
        s0 = std::mem::replace(&mut s1, s2);
        let t2 = &t0 - &quot * &t1;
        t0 = std::mem::replace(&mut t1, t2);
    }

    (s0, t0, a)
}

/// Modular inverse: `x` in `[0, q)` with `a*x ≡ 1 (mod q)`.
pub fn mod_inverse(a: &BigUint, q: &BigUint) -> Result<BigUint> {
    if q.is_zero() {
        return Err(Error::NoInverse);
    }

    let q_signed = BigInt::from(q.clone());
    let (s, _, gcd) = egcd(&BigInt::from(a % q), &q_signed);
    if !gcd.is_one() {
        return Err(Error::NoInverse);
    }

    // Bézout coefficient may be negative
    let reduced = ((s % &q_signed) + &q_signed) % &q_signed;
    Ok(reduced.magnitude().clone())
}

/// Jacobi symbol `(a / q)` for positive odd `q`. Returns -1, 0 or 1.
pub fn jacobi(a: &BigUint, q: &BigUint) -> Result<i8> {
    if q.is_zero() || is_even(q) {
        return Err(Error::InvalidModulus);
    }
    Ok(jacobi_odd(a % q, q))
}

fn jacobi_odd(a: BigUint, q: &BigUint) -> i8 {
    let a = a % q;
    if a.is_zero() {
        return 0;
    }
    if a.is_one() {
        return 1;
    }

    if is_even(&a) {
        let sign = match low_word(q) & 7 {
            1 | 7 => 1,
            _ => -1,
        };
        return sign * jacobi_odd(a >> 1u32, q);
    }

    let sign = if low_word(&a) & 3 == 1 || low_word(q) & 3 == 1 {
        1
    } else {
        -1
    };
    sign * jacobi_odd(q % &a, &a)
}

/// The two square roots of a quadratic residue, smaller root first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquareRoots {
    pub root: BigUint,
    /// `q - root`, or zero when the input was zero.
    pub neg_root: BigUint,
    /// Random candidates drawn before a non-residue turned up. Diagnostic only.
    pub draws: u32,
}

impl SquareRoots {
    pub fn pair(&self) -> (BigUint, BigUint) {
        (self.root.clone(), self.neg_root.clone())
    }
}

/// Square root of `n` modulo the odd prime `q`.
///
/// Uses `rng` to find a quadratic non-residue; `limits.max_nonresidue_draws`
/// caps that search. Fails with `NotAResidue` if `n` has no square root.
pub fn mod_sqrt<R: Rng + ?Sized>(
    n: &BigUint,
    q: &BigUint,
    rng: &mut R,
    limits: &SearchLimits,
) -> Result<SquareRoots> {
    if jacobi(n, q)? == -1 {
        return Err(Error::NotAResidue);
    }

    let n = n % q;
    if n.is_zero() {
        return Ok(SquareRoots {
            root: BigUint::zero(),
            neg_root: BigUint::zero(),
            draws: 0,
        });
    }

    let (b, draws) = find_non_residue(q, rng, limits)?;

    // q - 1 = t * 2^s, t odd
    let q_minus_one = q - 1u32;
    let s = q_minus_one.trailing_zeros().unwrap_or(0);
    let t = &q_minus_one >> s;

    let n_inv = mod_inverse(&n, q)?;
    let mut c = b.modpow(&t, q);
    let mut r = n.modpow(&((&t + 1u32) >> 1u32), q);

    for i in 1..s {
        let e = BigUint::one() << (s - i - 1);
        let d = (&r * &r % q * &n_inv % q).modpow(&e, q);
        if d == q_minus_one {
            r = r * &c % q;
        }
        c = &c * &c % q;
    }

    if &r * &r % q != n {
        return Err(Error::NotAResidue);
    }

    debug!("sqrt({n}) mod {q} found after {draws} non-residue draws");

    let neg = q - &r;
    let (root, neg_root) = if r <= neg { (r, neg) } else { (neg, r) };
    Ok(SquareRoots {
        root,
        neg_root,
        draws,
    })
}

/// Draw uniform candidates in `[1, q)` until one has Jacobi symbol -1.
fn find_non_residue<R: Rng + ?Sized>(
    q: &BigUint,
    rng: &mut R,
    limits: &SearchLimits,
) -> Result<(BigUint, u32)> {
    let one = BigUint::one();
    let mut draws = 0u32;

    loop {
        if let Some(max) = limits.max_nonresidue_draws {
            if draws >= max {
                return Err(Error::NonResidueSearchExhausted { draws });
            }
        }

        let candidate = rng.gen_biguint_range(&one, q);
        draws = draws.saturating_add(1);

        if jacobi(&candidate, q)? == -1 {
            return Ok((candidate, draws));
        }
    }
}

/// Miller-Rabin with fixed witnesses.
///
/// Exact below 3.3e24; a strong probable-prime test above that.
pub fn is_probable_prime(n: &BigUint) -> bool {
    const WITNESSES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    for &p in &WITNESSES {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - 1u32;
    let r = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> r;

    'witness: for &a in &WITNESSES {
        let mut x = BigUint::from(a).modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..r {
            x = &x * &x % n;
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// `(a + b) mod q`
pub(crate) fn add_mod(a: &BigUint, b: &BigUint, q: &BigUint) -> BigUint {
    (a + b) % q
}

/// `(a - b) mod q` for `a, b` already reduced.
pub(crate) fn sub_mod(a: &BigUint, b: &BigUint, q: &BigUint) -> BigUint {
    (a + q - b) % q
}

/// `(a * b) mod q`
pub(crate) fn mul_mod(a: &BigUint, b: &BigUint, q: &BigUint) -> BigUint {
    a * b % q
}

fn is_even(n: &BigUint) -> bool {
    !n.bit(0)
}

fn low_word(n: &BigUint) -> u32 {
    n.iter_u32_digits().next().unwrap_or(0)
}
