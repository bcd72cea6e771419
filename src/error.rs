// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Errors that can occur while loading keys or running the cryptosystem.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("'{token}' is not a valid non-negative integer")]
    MalformedInteger { token: String },

    #[error("multiplier {multiplier} and modulus {modulus} are not relatively prime")]
    NonCoprimeParameters { multiplier: u64, modulus: u64 },

    #[error("private key is not super-increasing at index {index}: {value} <= prefix sum {prefix_sum}")]
    NotSuperIncreasing { index: usize, value: u64, prefix_sum: u64 },

    #[error("modulus {modulus} must be greater than the private key sum {sum}")]
    ModulusTooSmall { modulus: u64, sum: u64 },

    #[error("modulus {modulus} exceeds the supported maximum of 2^63")]
    ModulusTooLarge { modulus: u64 },

    #[error("input source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("private key contains no elements")]
    EmptyPrivateKey,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid key size: must be between {min} and {max} elements, got {actual}")]
    InvalidKeySize { min: usize, max: usize, actual: usize },

    #[error("Arithmetic overflow detected")]
    ArithmeticOverflow,

    #[error("Ciphertext is invalid or corrupted: {0}")]
    InvalidCiphertext(String),

    #[error("decrypted value {value} is not a subset sum of the private key")]
    UnreachableSum { value: u64 },

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
