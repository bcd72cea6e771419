#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

use knapsack::{Decrypt, Encrypt, KeyPair};

static KEYPAIR: OnceLock<KeyPair> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    let key_pair = KEYPAIR.get_or_init(|| KeyPair::generate_with_length(16).unwrap());

    let ciphertext = key_pair.encrypt(data).unwrap();
    assert_eq!(ciphertext.len(), (data.len() * 8).div_ceil(16));

    let decrypted = match key_pair.decrypt(&ciphertext) {
        Ok(pt) => pt,
        Err(e) => panic!("Decryption failed for valid ciphertext: {e}. Input was: {:?}", data),
    };

    assert_eq!(data, decrypted.as_slice(), "Plaintext mismatch!");
});
