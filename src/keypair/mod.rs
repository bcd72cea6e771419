// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

mod util;

pub use util::{derive_public_key, validate_super_increasing};

use std::io::Read;

use crate::ciphertext::Ciphertext;
use crate::crypto::{Decryptor, Encryptor};
use crate::error::{Error, Result};
use crate::math::{self, MAX_MODULUS};
use crate::{Decrypt, DecryptBytes, Encrypt, EncryptBytes};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Separator between private key elements in their text form.
pub const KEY_SEPARATOR: char = ',';

/// Public knapsack: `b_i = p · w_i mod q` for every private key element.
///
/// The sum of all elements is cached as a `u128`. It bounds every block sum,
/// so no block can overflow during encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) elements: Vec<u64>,
    pub(crate) max_block_sum: u128,
}

impl PublicKey {
    /// Construct a public key from its elements.
    ///
    /// The sequence must be non-empty.
    pub fn new(elements: Vec<u64>) -> Result<Self> {
        if elements.is_empty() {
            return Err(Error::InvalidPublicKey);
        }

        let max_block_sum = elements.iter().map(|&b| u128::from(b)).sum();

        Ok(Self { elements, max_block_sum })
    }

    /// Return the public knapsack elements in key order.
    pub fn elements(&self) -> &[u64] {
        &self.elements
    }

    /// Number of plaintext bits per ciphertext block.
    pub fn block_size(&self) -> usize {
        self.elements.len()
    }

    /// Largest value a ciphertext block can take (all bits set).
    pub fn max_block_sum(&self) -> u128 {
        self.max_block_sum
    }
}

/// Secret trapdoor: the super-increasing sequence with multiplier `p` and
/// modulus `q`.
///
/// All key material is validated on construction. Sensitive fields are
/// zeroized on drop.
#[allow(missing_debug_implementations)]
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct PrivateKey {
    #[zeroize(skip)]
    pub(crate) public_key: PublicKey,
    pub(crate) sequence: Vec<u64>,
    pub(crate) multiplier: u64,
    pub(crate) modulus: u64,

    /// Sum of the super-increasing sequence.
    pub(crate) sum: u64,

    /// Precomputed `p⁻¹ mod q` used during decryption.
    pub(crate) inverse: u64,
}

impl PrivateKey {
    /// Construct a private key and derive its public key.
    ///
    /// Checks, in order: the modulus fits the native arithmetic, `p` and `q`
    /// are relatively prime, the sequence is super-increasing, and `q` is
    /// greater than the sequence sum.
    pub fn new(sequence: Vec<u64>, multiplier: u64, modulus: u64) -> Result<Self> {
        check_trapdoor(multiplier, modulus)?;

        let sum = validate_super_increasing(&sequence)?;
        if modulus <= sum {
            return Err(Error::ModulusTooSmall { modulus, sum });
        }

        let inverse = math::mod_inverse(multiplier, modulus)?;
        let public_key = derive_public_key(&sequence, multiplier, modulus)?;

        debug!(length = sequence.len(), sum, "validated private key");

        Ok(Self { public_key, sequence, multiplier, modulus, sum, inverse })
    }

    /// Parse key material from text using the default [`KEY_SEPARATOR`].
    pub fn from_text(key: &str, multiplier: &str, modulus: &str) -> Result<Self> {
        Self::from_text_with_separator(key, multiplier, modulus, KEY_SEPARATOR)
    }

    /// Parse key material from text with a custom element separator.
    ///
    /// `p` and `q` are parsed and checked before the key elements are.
    pub fn from_text_with_separator(
        key: &str,
        multiplier: &str,
        modulus: &str,
        separator: char,
    ) -> Result<Self> {
        let multiplier = util::parse_integer(multiplier)?;
        let modulus = util::parse_integer(modulus)?;
        check_trapdoor(multiplier, modulus)?;

        let sequence = util::parse_sequence(key, separator)?;
        Self::new(sequence, multiplier, modulus)
    }

    /// Read the key elements from `reader` (separated by [`KEY_SEPARATOR`]).
    ///
    /// The whole source is consumed before validation begins. Only read
    /// failures are [`Error::SourceUnavailable`]; bytes that are not valid
    /// UTF-8 end up in a token reported as [`Error::MalformedInteger`].
    pub fn read_from<R: Read>(mut reader: R, multiplier: u64, modulus: u64) -> Result<Self> {
        check_trapdoor(multiplier, modulus)?;

        let mut raw = Vec::new();
        reader.read_to_end(&mut raw).map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        let text = String::from_utf8_lossy(&raw);
        let sequence = util::parse_sequence(&text, KEY_SEPARATOR)?;
        Self::new(sequence, multiplier, modulus)
    }

    /// Return a reference to the derived public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Return the super-increasing sequence.
    pub fn sequence(&self) -> &[u64] {
        &self.sequence
    }

    pub fn multiplier(&self) -> u64 {
        self.multiplier
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn sum(&self) -> u64 {
        self.sum
    }

    /// Return `p⁻¹ mod q`.
    pub fn inverse(&self) -> u64 {
        self.inverse
    }
}

/// Rejects trapdoor parameters that can never form a valid key.
fn check_trapdoor(multiplier: u64, modulus: u64) -> Result<()> {
    if modulus > MAX_MODULUS {
        return Err(Error::ModulusTooLarge { modulus });
    }
    if !math::relatively_prime(multiplier, modulus) {
        return Err(Error::NonCoprimeParameters { multiplier, modulus });
    }
    Ok(())
}

/// A complete key pair consisting of public and private components.
///
/// Secret material is zeroized when dropped.
#[allow(missing_debug_implementations)]
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct KeyPair {
    #[zeroize(skip)]
    public: PublicKey,
    secret: PrivateKey,
}

impl<'a> KeyPair {
    /// Build a key pair from explicit key material.
    pub fn new(sequence: Vec<u64>, multiplier: u64, modulus: u64) -> Result<Self> {
        Ok(Self::from_private_key(PrivateKey::new(sequence, multiplier, modulus)?))
    }

    /// Wrap an already validated private key.
    pub fn from_private_key(secret: PrivateKey) -> Self {
        let public = secret.public_key.clone();
        Self { public, secret }
    }

    /// Generate a key pair with default parameters (8-element knapsack).
    pub fn generate() -> Result<Self> {
        KeyPairBuilder::new().build()
    }

    /// Generate a key pair with a custom knapsack length.
    pub fn generate_with_length(length: usize) -> Result<Self> {
        KeyPairBuilder::new().length(length).build()
    }

    /// Return the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Return the private key.
    pub fn private_key(&self) -> &PrivateKey {
        &self.secret
    }

    /// Create a streaming encryptor bound to this public key.
    pub fn encryptor(&'a self) -> Encryptor<'a> {
        self.public.encryptor()
    }

    /// Create a streaming decryptor bound to this private key.
    pub fn decryptor(&'a self) -> Decryptor<'a> {
        self.secret.decryptor()
    }
}

impl Encrypt for KeyPair {
    fn encrypt<P: AsRef<[u8]>>(&self, plaintext: P) -> Result<Ciphertext> {
        self.public.encrypt(plaintext)
    }
}

impl EncryptBytes for KeyPair {
    fn encrypt_bytes<P: AsRef<[u8]>>(&self, data: P) -> Result<Vec<u8>> {
        self.public.encrypt_bytes(data)
    }
}

impl Decrypt for KeyPair {
    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Vec<u8>> {
        self.secret.decrypt(ciphertext)
    }
}

impl DecryptBytes for KeyPair {
    fn decrypt_bytes<P: AsRef<[u8]>>(&self, packed: P) -> Result<Vec<u8>> {
        self.secret.decrypt_bytes(packed)
    }
}

/// Builder for generating random key pairs.
#[derive(Debug)]
pub struct KeyPairBuilder {
    length: usize,
}

impl KeyPairBuilder {
    /// One byte of plaintext per block.
    pub const DEFAULT_LENGTH: usize = 8;

    pub const MIN_LENGTH: usize = 1;

    /// Generated moduli stay below 2^40, which keeps the trial-division
    /// coprimality check fast.
    pub const MAX_LENGTH: usize = 32;

    /// Create a builder with default parameters.
    pub fn new() -> Self {
        Self { length: Self::DEFAULT_LENGTH }
    }

    /// Set the number of private key elements (bits per block).
    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Generate the key pair from an OS-seeded generator.
    pub fn build(self) -> Result<KeyPair> {
        let mut rng = StdRng::from_os_rng();
        self.build_with_rng(&mut rng)
    }

    /// Generate the key pair from the given generator.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<KeyPair> {
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&self.length) {
            return Err(Error::InvalidKeySize {
                min: Self::MIN_LENGTH,
                max: Self::MAX_LENGTH,
                actual: self.length,
            });
        }

        let sequence = util::generate_sequence(rng, self.length)?;
        let sum = sequence.iter().sum::<u64>();
        let modulus = util::pick_modulus(rng, sum)?;
        let multiplier = util::pick_multiplier(rng, modulus)?;

        debug!(length = self.length, modulus, "generated key pair (broken scheme, study use only)");

        KeyPair::new(sequence, multiplier, modulus)
    }
}

impl Default for KeyPairBuilder {
    fn default() -> Self {
        Self::new()
    }
}
