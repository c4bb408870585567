//! Exhaustive-search reference implementations.
//!
//! Only usable for small moduli. The tests cross-check `modular` against these.

#![forbid(unsafe_code)]

/// Inverse of `a` mod `q` by trying every candidate.
pub fn brute_inverse(a: u64, q: u64) -> Option<u64> {
    let (a, q) = (a as u128, q as u128);
    (0..q).find(|i| a * i % q == 1).map(|i| i as u64)
}

/// Square roots of non-zero `n` mod `q` by trying every candidate, smaller first.
pub fn brute_sqrt(n: u64, q: u64) -> Option<(u64, u64)> {
    let (n, q) = (n as u128 % q as u128, q as u128);
    (1..q)
        .find(|i| i * i % q == n)
        .map(|i| (i as u64, (q - i) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brute_inverse() {
        assert_eq!(brute_inverse(3, 7), Some(5));
        assert_eq!(brute_inverse(0, 7), None);
    }

    #[test]
    fn test_brute_sqrt() {
        assert_eq!(brute_sqrt(36, 97), Some((6, 91)));
        assert_eq!(brute_sqrt(5, 97), None);
    }
}
