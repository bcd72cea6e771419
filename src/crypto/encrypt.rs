// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Encrypt, EncryptBytes, Stream};
use crate::bits::{self, byte_bits};
use crate::ciphertext::Ciphertext;
use crate::error::Result;
use crate::keypair::PublicKey;

use tracing::{debug, trace};

impl Encrypt for PublicKey {
    fn encrypt<P: AsRef<[u8]>>(&self, plaintext: P) -> Result<Ciphertext> {
        let stream = bits::bytes_to_bits(plaintext);
        let blocks = self.encrypt_bits(&stream);

        debug!(bits = stream.len(), blocks = blocks.len(), "encrypted plaintext");
        Ok(Ciphertext::new(blocks, stream.len()))
    }
}

impl EncryptBytes for PublicKey {
    fn encrypt_bytes<P: AsRef<[u8]>>(&self, data: P) -> Result<Vec<u8>> {
        let mut encryptor = self.encryptor();
        encryptor.update(data)?;
        encryptor.finalize()
    }
}

impl<'a> PublicKey {
    /// Create a streaming encryptor for this key.
    pub fn encryptor(&'a self) -> Encryptor<'a> {
        Encryptor::new(self)
    }

    /// Maps each group of `n` bits to the sum of the public elements selected
    /// by its set bits. A short final group yields a partial sum.
    pub fn encrypt_bits(&self, bits: &[bool]) -> Vec<u128> {
        bits.chunks(self.block_size()).map(|group| self.block_sum(group)).collect()
    }

    /// Subset sum selected by `group`; never exceeds `max_block_sum`.
    fn block_sum(&self, group: &[bool]) -> u128 {
        group.iter().zip(&self.elements).filter(|&(&bit, _)| bit).map(|(_, &b)| u128::from(b)).sum()
    }
}

/// Streaming encryption context.
///
/// Folds plaintext bits into the running block sum as they arrive; only the
/// current block is buffered.
#[derive(Debug)]
pub struct Encryptor<'a> {
    pub_key: &'a PublicKey,

    /// Completed block sums.
    blocks: Vec<u128>,

    /// Sum of the block being filled.
    block_sum: u128,

    /// Position of the next bit within the current block.
    position: usize,

    /// Total plaintext bits consumed.
    bit_len: usize,
}

impl<'a> Encryptor<'a> {
    /// Create a new encryptor bound to the given public key.
    pub(crate) fn new(pub_key: &'a PublicKey) -> Self {
        Self { pub_key, blocks: Vec::new(), block_sum: 0, position: 0, bit_len: 0 }
    }

    fn push_bit(&mut self, bit: bool) {
        if bit {
            // bounded by max_block_sum
            self.block_sum += u128::from(self.pub_key.elements[self.position]);
        }
        self.position += 1;
        self.bit_len += 1;

        if self.position == self.pub_key.block_size() {
            trace!(block = self.blocks.len(), sum = self.block_sum, "block complete");
            self.blocks.push(self.block_sum);
            self.block_sum = 0;
            self.position = 0;
        }
    }

    /// Flush the partial block, if any, and return the ciphertext.
    pub fn finish(mut self) -> Ciphertext {
        if self.position > 0 {
            trace!(block = self.blocks.len(), sum = self.block_sum, bits = self.position, "partial block");
            self.blocks.push(self.block_sum);
        }

        debug!(bits = self.bit_len, blocks = self.blocks.len(), "encryptor finished");
        Ciphertext::new(self.blocks, self.bit_len)
    }
}

impl<'a> Stream for Encryptor<'a> {
    fn update<D: AsRef<[u8]>>(&mut self, data: D) -> Result<Vec<u8>> {
        for &byte in data.as_ref() {
            for bit in byte_bits(byte) {
                self.push_bit(bit);
            }
        }

        // Output is emitted only during finalize, once the header is known.
        Ok(Vec::new())
    }

    fn finalize(self) -> Result<Vec<u8>> {
        Ok(self.finish().to_bytes())
    }
}
