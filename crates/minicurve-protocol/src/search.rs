//! Parallel search for a generator of large order.
//!
//! Every x-coordinate on the curve is tried on the rayon pool; each candidate
//! pays a full order scan, so the whole search is O(q²) group operations.
//!
//! Square roots need randomness. One seed is drawn from the caller's RNG per
//! search and each x gets its own ChaCha stream of that seed, so a seeded
//! caller reproduces the search exactly regardless of thread scheduling.

#![forbid(unsafe_code)]

use log::debug;
use minicurve_arith::{Curve, Point, SearchLimits};
use minicurve_core::{Error, Result};
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;

/// A point together with its order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorCandidate {
    pub point: Point,
    pub order: BigUint,
}

/// The point of largest order, smallest x on ties, taking the smaller root at each x.
///
/// None only if the curve has no affine points.
pub fn largest_order_point<R: RngCore + ?Sized>(
    curve: &Curve,
    rng: &mut R,
) -> Option<GeneratorCandidate> {
    search_with_seed(curve, rng.next_u64())
}

/// First generator in `largest_order_point` order whose order is at least `min_order`.
pub fn find_generator<R: RngCore + ?Sized>(
    curve: &Curve,
    min_order: &BigUint,
    rng: &mut R,
) -> Result<GeneratorCandidate> {
    match largest_order_point(curve, rng) {
        Some(found) if &found.order >= min_order => Ok(found),
        _ => Err(Error::GeneratorNotFound {
            min_order: min_order.clone(),
        }),
    }
}

fn search_with_seed(curve: &Curve, seed: u64) -> Option<GeneratorCandidate> {
    let q = curve.q().to_u64().unwrap_or(u64::MAX);

    let best = (0..q)
        .into_par_iter()
        .filter_map(|x| candidate_at(curve, x, seed))
        .max_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| b.point.x().cmp(&a.point.x()))
        });

    if let Some(found) = &best {
        debug!("largest order on {curve}: {} at {}", found.order, found.point);
    }
    best
}

fn candidate_at(curve: &Curve, x: u64, seed: u64) -> Option<GeneratorCandidate> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    rng.set_stream(x);
    let (point, _) = curve
        .points_at_with(&BigUint::from(x), &mut rng, &SearchLimits::default())
        .ok()?;
    let order = curve.order(&point).ok()?;
    Some(GeneratorCandidate { point, order })
}
