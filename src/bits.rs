// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::ops::Deref;

use zeroize::Zeroize;

/// An ordered bit sequence, most-significant bit of each byte first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Zeroize)]
pub struct Bits(Vec<bool>);

impl Bits {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn extend_from_slice(&mut self, bits: &[bool]) {
        self.0.extend_from_slice(bits);
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// Packs the bits into bytes. See [`bits_to_bytes`].
    pub fn to_bytes(&self) -> Vec<u8> {
        bits_to_bytes(&self.0)
    }

    pub fn into_inner(self) -> Vec<bool> {
        self.0
    }

    /// Packs and removes every complete leading byte, keeping the remainder.
    pub(crate) fn take_whole_bytes(&mut self) -> Vec<u8> {
        let whole = self.0.len() - self.0.len() % 8;
        let bytes = bits_to_bytes(&self.0[..whole]);
        self.0.drain(..whole);
        bytes
    }
}

impl Deref for Bits {
    type Target = [bool];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<bool>> for Bits {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

impl FromIterator<bool> for Bits {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Iterates the bits of a single byte, MSB first.
#[inline]
pub(crate) fn byte_bits(byte: u8) -> impl Iterator<Item = bool> {
    (0..8).rev().map(move |shift| (byte >> shift) & 1 == 1)
}

/// Expands bytes into `8 * bytes.len()` bits, MSB first within each byte.
pub fn bytes_to_bits<B: AsRef<[u8]>>(bytes: B) -> Bits {
    let bytes = bytes.as_ref();
    let mut bits = Bits::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        bits.0.extend(byte_bits(byte));
    }
    bits
}

/// Packs bits into bytes, 8 at a time, MSB first.
///
/// A trailing group of fewer than 8 bits is zero-padded on the low-order side.
pub fn bits_to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| byte | (u8::from(bit) << (7 - i)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_first_expansion() {
        let bits = bytes_to_bits([0x61u8]);
        assert_eq!(bits.to_string(), "01100001");

        let bits = bytes_to_bits([0x80u8, 0x01]);
        assert_eq!(bits.to_string(), "1000000000000001");
    }

    #[test]
    fn empty_input() {
        assert!(bytes_to_bits([]).is_empty());
        assert!(bits_to_bytes(&[]).is_empty());
    }

    #[test]
    fn packs_whole_bytes() {
        let bytes = b"knapsack".to_vec();
        assert_eq!(bytes_to_bits(&bytes).to_bytes(), bytes);
    }

    #[test]
    fn trailing_group_is_zero_padded_low() {
        // 101 -> 1010_0000
        assert_eq!(bits_to_bytes(&[true, false, true]), vec![0xA0]);
        // 8 bits + 1 bit
        let mut bits = vec![false; 8];
        bits.push(true);
        assert_eq!(bits_to_bytes(&bits), vec![0x00, 0x80]);
    }

    #[test]
    fn bits_collect_and_display() {
        let bits: Bits = [true, true, false].into_iter().collect();
        assert_eq!(bits.len(), 3);
        assert_eq!(format!("{bits}"), "110");
        assert_eq!(bits.into_inner(), vec![true, true, false]);
    }

    #[test]
    fn take_whole_bytes_keeps_remainder() {
        let mut bits = bytes_to_bits([0xFFu8, 0x00]);
        bits.truncate(12);

        assert_eq!(bits.take_whole_bytes(), vec![0xFF]);
        assert_eq!(bits.to_string(), "0000");
        assert!(bits.take_whole_bytes().is_empty());
    }
}
