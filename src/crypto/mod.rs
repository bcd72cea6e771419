// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

mod decrypt;
mod encrypt;

pub use decrypt::Decryptor;
pub use encrypt::Encryptor;

use crate::ciphertext::Ciphertext;
use crate::error::Result;

/// Encrypts a byte sequence into subset-sum blocks.
pub trait Encrypt {
    /// Encrypt `plaintext` into one block per `n` bits, where `n` is the
    /// public key length. The result carries the exact bit count.
    fn encrypt<P: AsRef<[u8]>>(&self, plaintext: P) -> Result<Ciphertext>;
}

/// Encrypts arbitrary-length data into the packed ciphertext format.
pub trait EncryptBytes {
    /// Encrypt input and return it in packed form.
    ///
    /// The output can be decrypted with `PrivateKey::decrypt_bytes`.
    fn encrypt_bytes<P: AsRef<[u8]>>(&self, data: P) -> Result<Vec<u8>>;
}

/// Recovers plaintext bytes from a ciphertext.
pub trait Decrypt {
    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<Vec<u8>>;
}

/// Decrypts data in the packed ciphertext format.
pub trait DecryptBytes {
    /// Decrypt a packed ciphertext and return the full plaintext.
    fn decrypt_bytes<P: AsRef<[u8]>>(&self, packed: P) -> Result<Vec<u8>>;
}

/// Stateful interface for incremental cryptographic processing.
///
/// Implementations accept input in chunks via [`update`](Stream::update) and
/// produce any immediately available output. Remaining buffered state is
/// processed and returned by [`finalize`](Stream::finalize), which consumes
/// the instance.
pub trait Stream {
    /// Processes the next chunk of input data.
    ///
    /// Implementations may buffer data internally and return an empty vector.
    fn update<D: AsRef<[u8]>>(&mut self, data: D) -> Result<Vec<u8>>;

    /// Completes processing and returns any remaining output.
    fn finalize(self) -> Result<Vec<u8>>;
}
