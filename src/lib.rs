// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Merkle–Hellman Knapsack Cryptosystem
//!
//! Public-key encryption built on the subset-sum problem. The private key is
//! a super-increasing sequence `w` disguised by a multiplier `p` and modulus
//! `q`; the public key is `b_i = p · w_i mod q`. Each block of `n` plaintext
//! bits encrypts to the sum of the public elements its set bits select.
//! Decryption multiplies by `p⁻¹ mod q` and recovers the bits greedily.
//!
//! Reference: Merkle & Hellman (1978), "Hiding information and signatures in
//! trapdoor knapsacks", IEEE Transactions on Information Theory.
//!
//! ## Security
//!
//! None. The scheme was broken by Shamir in 1982 and is provided for study
//! only. Keys use native `u64` values; block sums are `u128`.
//!
//! ## Example
//!
//! ```rust
//! use knapsack::{Decrypt, Encrypt, KeyPair};
//!
//! let keypair = KeyPair::new(vec![2, 3, 6, 13, 27, 52], 31, 105).expect("invalid key");
//! assert_eq!(keypair.public_key().elements(), &[62, 93, 81, 88, 102, 37]);
//!
//! let ciphertext = keypair.encrypt(b"hello").expect("encryption failed");
//! let decrypted = keypair.decrypt(&ciphertext).expect("decryption failed");
//! assert_eq!(decrypted, b"hello");
//! ```

pub mod bits;
mod ciphertext;
mod crypto;
mod error;
mod keypair;
pub mod math;

pub use bits::{Bits, bits_to_bytes, bytes_to_bits};
pub use ciphertext::Ciphertext;
pub use crypto::{Decrypt, DecryptBytes, Decryptor, Encrypt, EncryptBytes, Encryptor, Stream};
pub use error::{Error, Result};
pub use keypair::{
    KEY_SEPARATOR, KeyPair, KeyPairBuilder, PrivateKey, PublicKey, derive_public_key,
    validate_super_increasing,
};
