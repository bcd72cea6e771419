// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::ops::Deref;

use crate::error::{Error, Result};

/// Current version of the packed ciphertext format.
pub(crate) const VERSION: u8 = 2;

/// `[version:u8][bit_len:u64][block_count:u64]`
pub(crate) const HEADER_LEN: usize = 1 + 8 + 8;

/// Every block is a big-endian `u128`.
pub(crate) const BLOCK_LEN: usize = 16;

/// A sequence of subset-sum blocks together with the exact plaintext length
/// in bits.
///
/// The block sums alone cannot tell trailing zero bits apart from missing
/// bits, so `bit_len` travels with the blocks and decryption truncates the
/// recovered stream to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ciphertext {
    blocks: Vec<u128>,
    bit_len: usize,
}

impl Ciphertext {
    pub fn new(blocks: Vec<u128>, bit_len: usize) -> Self {
        Self { blocks, bit_len }
    }

    pub fn blocks(&self) -> &[u128] {
        &self.blocks
    }

    /// Number of plaintext bits the blocks encode.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    pub fn into_blocks(self) -> Vec<u128> {
        self.blocks
    }

    /// Serialize into the packed format.
    ///
    /// Format, all integers big-endian:
    /// `[version:u8][bit_len:u64][block_count:u64][block:u128]...`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packed = Vec::with_capacity(HEADER_LEN + self.blocks.len() * BLOCK_LEN);
        packed.extend_from_slice(&encode_header(self.bit_len, self.blocks.len()));
        for block in &self.blocks {
            packed.extend_from_slice(&block.to_be_bytes());
        }
        packed
    }

    /// Parse a complete packed ciphertext.
    pub fn from_bytes<B: AsRef<[u8]>>(packed: B) -> Result<Self> {
        let packed = packed.as_ref();
        let header = Header::parse(packed)?;

        let payload = &packed[HEADER_LEN..];
        let expected = header
            .block_count
            .checked_mul(BLOCK_LEN)
            .ok_or_else(|| Error::DecryptionFailed("Block count too large".into()))?;

        if payload.len() < expected {
            return Err(Error::DecryptionFailed("Truncated ciphertext block".into()));
        }
        if payload.len() > expected {
            return Err(Error::DecryptionFailed(format!(
                "Packed data has {} trailing bytes",
                payload.len() - expected
            )));
        }

        let blocks = payload.chunks_exact(BLOCK_LEN).map(read_block).collect();
        Ok(Self::new(blocks, header.bit_len))
    }
}

impl Deref for Ciphertext {
    type Target = [u128];

    fn deref(&self) -> &Self::Target {
        &self.blocks
    }
}

/// Decoded packed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) bit_len: usize,
    pub(crate) block_count: usize,
}

impl Header {
    /// Parse the header at the start of `bytes`.
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(Error::DecryptionFailed("Packed data too short".into()));
        }

        let version = bytes[0];
        if version != VERSION {
            return Err(Error::DecryptionFailed(format!("Unsupported version: {version}")));
        }

        let mut bit_len = [0u8; 8];
        bit_len.copy_from_slice(&bytes[1..9]);
        let bit_len = usize::try_from(u64::from_be_bytes(bit_len))
            .map_err(|_| Error::DecryptionFailed("Bit length too large".into()))?;

        let mut block_count = [0u8; 8];
        block_count.copy_from_slice(&bytes[9..HEADER_LEN]);
        let block_count = usize::try_from(u64::from_be_bytes(block_count))
            .map_err(|_| Error::DecryptionFailed("Block count too large".into()))?;

        Ok(Self { bit_len, block_count })
    }
}

/// Both lengths are written as `u64`, which holds any `usize`.
fn encode_header(bit_len: usize, block_count: usize) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0] = VERSION;
    header[1..9].copy_from_slice(&(bit_len as u64).to_be_bytes());
    header[9..].copy_from_slice(&(block_count as u64).to_be_bytes());
    header
}

/// Decode one big-endian block. `bytes` must be exactly [`BLOCK_LEN`] long.
pub(crate) fn read_block(bytes: &[u8]) -> u128 {
    let mut block = [0u8; BLOCK_LEN];
    block.copy_from_slice(bytes);
    u128::from_be_bytes(block)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn packed_layout() {
        let ct = Ciphertext::new(vec![174, 93], 8);
        let bytes = ct.to_bytes();

        assert_eq!(bytes.len(), HEADER_LEN + 2 * BLOCK_LEN);
        assert_eq!(bytes[0], VERSION);
        assert_eq!(&bytes[1..9], &8u64.to_be_bytes());
        assert_eq!(&bytes[9..17], &2u64.to_be_bytes());
        assert_eq!(&bytes[17..33], &174u128.to_be_bytes());
        assert_eq!(&bytes[33..49], &93u128.to_be_bytes());

        assert_eq!(Ciphertext::from_bytes(&bytes).unwrap(), ct);
    }

    #[test]
    fn empty_ciphertext_serialization() {
        let ct = Ciphertext::default();
        let bytes = ct.to_bytes();
        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(Ciphertext::from_bytes(bytes).unwrap(), ct);
    }

    #[test]
    fn rejects_short_and_unknown_version() {
        assert!(matches!(Ciphertext::from_bytes([1u8, 0, 0]), Err(Error::DecryptionFailed(_))));

        let mut bytes = Ciphertext::new(vec![1], 3).to_bytes();
        bytes[0] = 1;
        let err = Ciphertext::from_bytes(&bytes).unwrap_err();
        assert_eq!(err, Error::DecryptionFailed("Unsupported version: 1".into()));
    }

    #[test]
    fn rejects_truncated_and_trailing_data() {
        let bytes = Ciphertext::new(vec![1, 2, 3], 20).to_bytes();

        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(Ciphertext::from_bytes(truncated), Err(Error::DecryptionFailed(_))));

        let mut trailing = bytes.clone();
        trailing.push(0);
        let err = Ciphertext::from_bytes(&trailing).unwrap_err();
        assert_eq!(err, Error::DecryptionFailed("Packed data has 1 trailing bytes".into()));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn header_keeps_block_counts_beyond_u32() {
        let block_count = (1usize << 32) + 5;
        let header = encode_header(usize::MAX, block_count);

        let parsed = Header::parse(&header).unwrap();
        assert_eq!(parsed, Header { bit_len: usize::MAX, block_count });
    }

    #[test]
    fn blocks_wider_than_u64_survive_packing() {
        let wide = u128::from(u64::MAX) * 3;
        let ct = Ciphertext::new(vec![wide, 1], 12);

        assert_eq!(Ciphertext::from_bytes(ct.to_bytes()).unwrap(), ct);
    }

    #[test]
    fn derefs_to_blocks() {
        let ct = Ciphertext::new(vec![5, 6, 7], 24);
        assert_eq!(ct.len(), 3);
        assert_eq!(ct[1], 6);
        assert_eq!(ct.into_blocks(), vec![5, 6, 7]);
    }
}
