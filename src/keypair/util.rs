// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use rand::Rng;
use tracing::trace;

use super::PublicKey;
use crate::error::{Error, Result};
use crate::math;

/// Upper bound of the random gap between a generated element and the prefix
/// sum before it.
const MAX_STEP: u64 = 255;

/// Give up on multiplier selection after this many rejected candidates.
const MAX_MULTIPLIER_ATTEMPTS: usize = 10_000;

/// Checks that `sequence` is strictly super-increasing and returns its sum.
///
/// Every element must exceed the sum of all elements before it; for the first
/// element that means it must be at least 1.
pub fn validate_super_increasing(sequence: &[u64]) -> Result<u64> {
    if sequence.is_empty() {
        return Err(Error::EmptyPrivateKey);
    }

    let mut prefix_sum = 0u64;
    for (index, &value) in sequence.iter().enumerate() {
        if value <= prefix_sum {
            return Err(Error::NotSuperIncreasing { index, value, prefix_sum });
        }
        prefix_sum = prefix_sum.checked_add(value).ok_or(Error::ArithmeticOverflow)?;
    }

    Ok(prefix_sum)
}

/// Derives `b_i = p · w_i mod q`, preserving element order.
pub fn derive_public_key(sequence: &[u64], multiplier: u64, modulus: u64) -> Result<PublicKey> {
    let elements: Vec<u64> =
        sequence.iter().map(|&w| math::mod_mul(multiplier, w, modulus)).collect();

    trace!(?elements, "derived public key");
    PublicKey::new(elements)
}

/// Parses a whole decimal number with no sign.
pub(super) fn parse_integer(token: &str) -> Result<u64> {
    let token = token.trim();
    let malformed = || Error::MalformedInteger { token: token.to_string() };

    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    token.parse().map_err(|_| malformed())
}

/// Splits `text` on `separator` and parses every non-blank token.
pub(super) fn parse_sequence(text: &str, separator: char) -> Result<Vec<u64>> {
    text.split(separator)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_integer)
        .collect()
}

/// Random super-increasing sequence: each element is its prefix sum plus a
/// step in `1..=MAX_STEP`.
pub(super) fn generate_sequence<R: Rng + ?Sized>(rng: &mut R, length: usize) -> Result<Vec<u64>> {
    let mut sequence = Vec::with_capacity(length);
    let mut prefix_sum = 0u64;

    for _ in 0..length {
        let value = prefix_sum
            .checked_add(rng.random_range(1..=MAX_STEP))
            .ok_or_else(|| Error::KeyGenerationFailed("sequence overflow".into()))?;
        prefix_sum = prefix_sum
            .checked_add(value)
            .ok_or_else(|| Error::KeyGenerationFailed("sequence overflow".into()))?;
        sequence.push(value);
    }

    Ok(sequence)
}

/// Random modulus strictly greater than `sum`, and at least 3 so that a
/// multiplier in `[2, q)` exists.
pub(super) fn pick_modulus<R: Rng + ?Sized>(rng: &mut R, sum: u64) -> Result<u64> {
    let modulus = sum
        .checked_add(rng.random_range(2..=MAX_STEP))
        .filter(|&q| q <= math::MAX_MODULUS)
        .ok_or_else(|| Error::KeyGenerationFailed("modulus out of range".into()))?;
    Ok(modulus)
}

/// Random multiplier in `[2, q)` sharing no prime factor with `q`.
pub(super) fn pick_multiplier<R: Rng + ?Sized>(rng: &mut R, modulus: u64) -> Result<u64> {
    // factor q once, then test candidates by divisibility
    let factors = math::prime_factors(modulus);

    for _ in 0..MAX_MULTIPLIER_ATTEMPTS {
        let candidate = rng.random_range(2..modulus);
        if factors.iter().all(|f| candidate % f != 0) {
            return Ok(candidate);
        }
    }

    Err(Error::KeyGenerationFailed("no multiplier coprime to the modulus".into()))
}
