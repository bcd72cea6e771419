// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Decrypt, DecryptBytes, Stream};
use crate::bits::{self, Bits};
use crate::ciphertext::{self, BLOCK_LEN, Ciphertext, HEADER_LEN, Header};
use crate::error::{Error, Result};
use crate::keypair::PrivateKey;
use crate::math;

use rayon::prelude::*;
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

impl PrivateKey {
    /// Greedy subset reconstruction over the super-increasing sequence.
    ///
    /// Scans from the largest element down, taking every element that still
    /// fits. Returns `None` when no subset sums to exactly `value`.
    pub fn find_subset(&self, value: u64) -> Option<Bits> {
        let mut selected = vec![false; self.sequence.len()];
        let mut remaining = value;

        for (i, &w) in self.sequence.iter().enumerate().rev() {
            if remaining == 0 {
                break;
            }
            if w <= remaining {
                selected[i] = true;
                remaining -= w;
            }
        }

        (remaining == 0).then(|| Bits::from(selected))
    }

    /// Recover the `n` plaintext bits of a single ciphertext block.
    pub fn decrypt_block(&self, block: u128) -> Result<Bits> {
        if block > self.public_key.max_block_sum() {
            return Err(Error::InvalidCiphertext(format!(
                "block {block} exceeds the public key sum"
            )));
        }

        // c' = p⁻¹ · c mod q; c mod q is below q, so it fits a u64
        let reduced = (block % u128::from(self.modulus)) as u64;
        let value = math::mod_mul(self.inverse, reduced, self.modulus);
        let recovered = self.find_subset(value).ok_or(Error::UnreachableSum { value })?;

        trace!(block, value, bits = %recovered, "recovered block");
        Ok(recovered)
    }

    /// Recover the plaintext bit stream, truncated to the ciphertext's
    /// `bit_len`.
    ///
    /// Blocks are decrypted in parallel; their order is preserved.
    pub fn decrypt_bits(&self, ciphertext: &Ciphertext) -> Result<Bits> {
        let block_size = self.sequence.len();
        let bit_len = ciphertext.bit_len();

        let expected = bit_len.div_ceil(block_size);
        if ciphertext.len() != expected {
            return Err(Error::InvalidCiphertext(format!(
                "expected {expected} blocks for {bit_len} bits, got {}",
                ciphertext.len()
            )));
        }

        let groups = ciphertext
            .blocks()
            .par_iter()
            .map(|&block| self.decrypt_block(block))
            .collect::<Result<Vec<Bits>>>()?;

        let mut recovered = Bits::with_capacity(expected * block_size);
        for group in &groups {
            recovered.extend_from_slice(group);
        }

        check_padding(&recovered[bit_len..])?;
        recovered.truncate(bit_len);
        Ok(recovered)
    }
}

/// Bits past the plaintext length must all be clear.
fn check_padding(padding: &[bool]) -> Result<()> {
    if padding.iter().any(|&bit| bit) {
        return Err(Error::InvalidCiphertext("bits set past the plaintext length".into()));
    }
    Ok(())
}

impl Decrypt for PrivateKey {
    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Vec<u8>> {
        let recovered = self.decrypt_bits(ciphertext)?;

        debug!(blocks = ciphertext.len(), bits = recovered.len(), "decrypted ciphertext");
        Ok(recovered.to_bytes())
    }
}

impl DecryptBytes for PrivateKey {
    fn decrypt_bytes<P: AsRef<[u8]>>(&self, packed: P) -> Result<Vec<u8>> {
        let mut decryptor = self.decryptor();
        let mut output = Vec::new();

        output.extend(decryptor.update(packed)?);
        output.extend(decryptor.finalize()?);

        Ok(output)
    }
}

/// Internal state of the streaming decryptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecryptorState {
    /// Awaiting the stream header (version, bit length and block count).
    WaitingHeader,
    /// Reading encrypted blocks.
    ReadingBlocks { remaining_blocks: usize },
    /// All blocks processed successfully.
    Complete,
}

/// Incremental (streaming) decryption context.
///
/// Whole plaintext bytes are emitted as soon as the blocks covering them
/// have been decrypted.
#[allow(missing_debug_implementations)]
#[derive(Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct Decryptor<'a> {
    #[zeroize(skip)]
    priv_key: &'a PrivateKey,
    buffer: Vec<u8>,
    #[zeroize(skip)]
    state: DecryptorState,

    /// Recovered bits not yet packed into output bytes.
    pending: Bits,

    /// Plaintext bits still expected from upcoming blocks.
    bits_remaining: usize,
    output: Vec<u8>,
}

impl<'a> Decryptor<'a> {
    /// Construct a new decryptor bound to the given private key.
    pub(crate) fn new(priv_key: &'a PrivateKey) -> Self {
        Self {
            priv_key,
            buffer: Vec::new(),
            state: DecryptorState::WaitingHeader,
            pending: Bits::new(),
            bits_remaining: 0,
            output: Vec::new(),
        }
    }

    /// Parse and validate the stream header.
    fn process_header(&mut self) -> Result<()> {
        if self.buffer.len() < HEADER_LEN {
            return Ok(());
        }

        let Header { bit_len, block_count } = Header::parse(&self.buffer)?;
        let expected = bit_len.div_ceil(self.priv_key.public_key().block_size());
        if block_count != expected {
            return Err(Error::InvalidCiphertext(format!(
                "expected {expected} blocks for {bit_len} bits, got {block_count}"
            )));
        }

        self.buffer.drain(..HEADER_LEN);
        self.bits_remaining = bit_len;
        self.state = if block_count == 0 {
            DecryptorState::Complete
        } else {
            DecryptorState::ReadingBlocks { remaining_blocks: block_count }
        };

        Ok(())
    }

    /// Decrypt every complete block currently in the buffer.
    fn process_blocks(&mut self) -> Result<()> {
        while let DecryptorState::ReadingBlocks { remaining_blocks } = self.state {
            if self.buffer.len() < BLOCK_LEN {
                break;
            }

            let block = ciphertext::read_block(&self.buffer[..BLOCK_LEN]);
            self.buffer.drain(..BLOCK_LEN);

            let recovered = self.priv_key.decrypt_block(block)?;
            let take = recovered.len().min(self.bits_remaining);
            check_padding(&recovered[take..])?;

            self.pending.extend_from_slice(&recovered[..take]);
            self.bits_remaining -= take;

            self.state = match remaining_blocks {
                1 => DecryptorState::Complete,
                n => DecryptorState::ReadingBlocks { remaining_blocks: n - 1 },
            };
        }

        self.output.extend(self.pending.take_whole_bytes());
        Ok(())
    }
}

impl<'a> Stream for Decryptor<'a> {
    fn update<D: AsRef<[u8]>>(&mut self, data: D) -> Result<Vec<u8>> {
        self.buffer.extend_from_slice(data.as_ref());

        if self.state == DecryptorState::WaitingHeader {
            self.process_header()?;
        }

        if matches!(self.state, DecryptorState::ReadingBlocks { .. }) {
            self.process_blocks()?;
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn finalize(mut self) -> Result<Vec<u8>> {
        match self.state {
            DecryptorState::WaitingHeader => {
                return Err(Error::DecryptionFailed(
                    "Stream ended with incomplete header".into(),
                ));
            }
            DecryptorState::ReadingBlocks { remaining_blocks } => {
                return Err(Error::DecryptionFailed(format!(
                    "Stream ended prematurely: missing {} blocks",
                    remaining_blocks
                )));
            }
            DecryptorState::Complete => {
                if !self.buffer.is_empty() {
                    return Err(Error::DecryptionFailed(format!(
                        "Stream ended with {} trailing bytes",
                        self.buffer.len()
                    )));
                }
            }
        }

        // a final partial byte is zero-padded
        let tail = bits::bits_to_bytes(&self.pending);
        self.output.extend(tail);
        Ok(std::mem::take(&mut self.output))
    }
}

impl<'a> PrivateKey {
    /// Create a streaming decryptor bound to this key.
    pub fn decryptor(&'a self) -> Decryptor<'a> {
        Decryptor::new(self)
    }
}
