#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

use knapsack::{Ciphertext, Decrypt, DecryptBytes, KeyPair};

static KEYPAIR: OnceLock<KeyPair> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    let keypair = KEYPAIR.get_or_init(|| KeyPair::new(vec![2, 3, 6, 13, 27, 52], 31, 105).unwrap());

    // arbitrary input must produce a result or an error, never a panic
    let _ = keypair.decrypt_bytes(data);

    let blocks = data
        .chunks(16)
        .map(|chunk| chunk.iter().fold(0u128, |acc, &b| (acc << 8) | u128::from(b)))
        .collect::<Vec<_>>();
    let bit_len = blocks.len() * 6;
    let _ = keypair.decrypt(&Ciphertext::new(blocks, bit_len));
});
