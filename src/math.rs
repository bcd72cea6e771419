// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Number theory over native integers.
//!
//! Everything here works on `u64`. [`mod_mul`] never forms the full product
//! `a * b`, so it is exact for every modulus a `u64` can hold.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Largest modulus accepted for a private key.
pub const MAX_MODULUS: u64 = 1 << 63;

/// Distinct prime factors of `n` by trial division.
///
/// `0` and `1` have no prime factors and yield an empty set.
pub fn prime_factors(mut n: u64) -> BTreeSet<u64> {
    let mut factors = BTreeSet::new();
    if n == 0 {
        return factors;
    }

    while n & 1 == 0 {
        factors.insert(2);
        n >>= 1;
    }

    let mut i = 3u64;
    while i <= n / i {
        while n % i == 0 {
            factors.insert(i);
            n /= i;
        }
        i += 2;
    }

    if n > 2 {
        factors.insert(n);
    }
    factors
}

/// Returns `true` when `p` and `q` share no prime factor.
///
/// Every factor of the smaller set is checked against the larger one.
pub fn relatively_prime(p: u64, q: u64) -> bool {
    // gcd(0, x) = x
    if p == 0 || q == 0 {
        return p.max(q) == 1;
    }

    let fp = prime_factors(p);
    let fq = prime_factors(q);
    let (small, large) = if fp.len() <= fq.len() { (&fp, &fq) } else { (&fq, &fp) };

    small.iter().all(|f| !large.contains(f))
}

/// Bézout coefficients: `a * x + b * y == gcd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bezout {
    pub gcd: u64,
    pub x: i128,
    pub y: i128,
}

/// Extended Euclidean algorithm.
pub fn extended_gcd(a: u64, b: u64) -> Bezout {
    let (mut old_r, mut r) = (i128::from(a), i128::from(b));
    let (mut old_x, mut x) = (1i128, 0i128);
    let (mut old_y, mut y) = (0i128, 1i128);

    while r != 0 {
        let quotient = old_r / r;
        (old_r, r) = (r, old_r - quotient * r);
        (old_x, x) = (x, old_x - quotient * x);
        (old_y, y) = (y, old_y - quotient * y);
    }

    Bezout {
        // old_r is gcd(a, b) <= max(a, b), so it fits.
        gcd: old_r as u64,
        x: old_x,
        y: old_y,
    }
}

/// Computes `p⁻¹ mod q`, normalized into `[0, q)`.
///
/// Fails with [`Error::NonCoprimeParameters`] if no inverse exists.
pub fn mod_inverse(p: u64, q: u64) -> Result<u64> {
    let bezout = extended_gcd(p, q);
    if q == 0 || bezout.gcd != 1 {
        return Err(Error::NonCoprimeParameters { multiplier: p, modulus: q });
    }

    let inverse = bezout.x.rem_euclid(i128::from(q));
    // rem_euclid lands in [0, q)
    Ok(inverse as u64)
}

/// Computes `(a * b) mod c` without overflowing.
///
/// Walks the bits of `b` from the most significant down, doubling the
/// partial result and adding `a mod c` for every set bit, reducing after each
/// step.
///
/// # Panics
/// Panics if `c == 0`.
pub fn mod_mul(a: u64, b: u64, c: u64) -> u64 {
    let a = a % c;
    if a == 0 || b == 0 {
        return 0;
    }

    let mut result = 0u64;
    for shift in (0..u64::BITS - b.leading_zeros()).rev() {
        result = add_mod(result, result, c);
        if (b >> shift) & 1 == 1 {
            result = add_mod(result, a, c);
        }
    }
    result
}

/// `(x + y) mod c` for `x, y < c`, without forming `x + y`.
#[inline]
fn add_mod(x: u64, y: u64, c: u64) -> u64 {
    let gap = c - y;
    if x >= gap { x - gap } else { x + y }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    use num_bigint_dig::BigUint;
    use num_traits::{One, ToPrimitive};
    use proptest::prelude::*;

    fn oracle_mul(a: u64, b: u64, c: u64) -> u64 {
        let product = BigUint::from(a) * BigUint::from(b) % BigUint::from(c);
        product.to_u64().unwrap()
    }

    #[test]
    fn factors_of_small_numbers() {
        assert!(prime_factors(0).is_empty());
        assert!(prime_factors(1).is_empty());
        assert_eq!(prime_factors(2).into_iter().collect::<Vec<_>>(), vec![2]);
        assert_eq!(prime_factors(105).into_iter().collect::<Vec<_>>(), vec![3, 5, 7]);
        assert_eq!(prime_factors(1024).into_iter().collect::<Vec<_>>(), vec![2]);
        assert_eq!(prime_factors(97).into_iter().collect::<Vec<_>>(), vec![97]);
    }

    #[test]
    fn factors_of_large_prime_square() {
        // largest prime below 2^16
        let p = 65_521u64;
        assert_eq!(prime_factors(p * p).into_iter().collect::<Vec<_>>(), vec![p]);
    }

    #[test]
    fn relatively_prime_basic() {
        assert!(relatively_prime(31, 105));
        assert!(!relatively_prime(21, 105));
        assert!(relatively_prime(1, 105));
        assert!(relatively_prime(0, 1));
        assert!(!relatively_prime(0, 105));
        assert!(!relatively_prime(6, 6));
    }

    #[test]
    fn relatively_prime_checks_every_shared_factor() {
        // 2·3·5·7 vs 7·11: only the last factor of the larger set is shared,
        // and a prefix-only scan of min(len) elements misses it.
        assert!(!relatively_prime(210, 77));
        assert!(!relatively_prime(77, 210));
        assert!(!relatively_prime(2 * 3 * 5 * 13, 13));
    }

    #[test]
    fn extended_gcd_identity() {
        for (a, b) in [(31u64, 105u64), (240, 46), (0, 9), (9, 0), (1, 1), (17, 17)] {
            let Bezout { gcd, x, y } = extended_gcd(a, b);
            assert_eq!(i128::from(a) * x + i128::from(b) * y, i128::from(gcd));
        }
        assert_eq!(extended_gcd(240, 46).gcd, 2);
        assert_eq!(extended_gcd(9, 0), Bezout { gcd: 9, x: 1, y: 0 });
    }

    #[test]
    fn mod_inverse_known_value() {
        assert_eq!(mod_inverse(31, 105).unwrap(), 61);
        assert_eq!(mod_inverse(3, 7).unwrap(), 5);
        assert_eq!(mod_inverse(5, 1).unwrap(), 0);
    }

    #[test]
    fn mod_inverse_rejects_shared_factor() {
        assert_eq!(
            mod_inverse(21, 105),
            Err(Error::NonCoprimeParameters { multiplier: 21, modulus: 105 })
        );
        assert!(mod_inverse(5, 0).is_err());
    }

    #[test]
    fn mod_mul_at_u64_max_modulus() {
        let c = u64::MAX;
        // (c - 1)^2 = (-1)^2 = 1 mod c
        assert_eq!(mod_mul(c - 1, c - 1, c), 1);
        assert_eq!(mod_mul(u64::MAX, 2, c), 0);
        assert_eq!(mod_mul(c - 2, c - 3, c - 1), oracle_mul(c - 2, c - 3, c - 1));

        let product = (u128::from(c - 5) * u128::from(c - 7)) % u128::from(c);
        assert_eq!(u128::from(mod_mul(c - 5, c - 7, c)), product);
    }

    #[test]
    fn mod_mul_near_max_modulus() {
        let c = MAX_MODULUS;
        let a = c - 1;
        assert_eq!(mod_mul(a, a, c), oracle_mul(a, a, c));
        assert_eq!(mod_mul(u64::MAX, u64::MAX, c - 3), oracle_mul(u64::MAX, u64::MAX, c - 3));
        assert_eq!(mod_mul(0, 12345, 7), 0);
        assert_eq!(mod_mul(12345, 0, 7), 0);
        assert_eq!(mod_mul(12345, 6789, 1), 0);
    }

    proptest! {
        #[test]
        fn mod_mul_matches_unbounded_product(
            a in 0u64..(1 << 31),
            b in 0u64..(1 << 31),
            c in 1u64..(1 << 31),
        ) {
            prop_assert_eq!(mod_mul(a, b, c), oracle_mul(a, b, c));
        }

        #[test]
        fn mod_mul_matches_unbounded_product_full_width(
            a in any::<u64>(),
            b in any::<u64>(),
            c in 1u64..=u64::MAX,
        ) {
            prop_assert_eq!(mod_mul(a, b, c), oracle_mul(a, b, c));
        }

        #[test]
        fn mod_inverse_is_inverse(p in 1u64..1_000_000, q in 2u64..1_000_000) {
            prop_assume!(relatively_prime(p, q));
            let inverse = mod_inverse(p, q).unwrap();
            prop_assert!(inverse < q);
            let check = BigUint::from(p) * BigUint::from(inverse) % BigUint::from(q);
            prop_assert!(check.is_one());
        }

        #[test]
        fn relatively_prime_agrees_with_gcd(p in 1u64..100_000, q in 1u64..100_000) {
            prop_assert_eq!(relatively_prime(p, q), extended_gcd(p, q).gcd == 1);
        }
    }
}
