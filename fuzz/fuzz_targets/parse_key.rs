#![no_main]

use libfuzzer_sys::fuzz_target;

use knapsack::{Decrypt, Encrypt, KeyPair, PrivateKey, validate_super_increasing};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut parts = text.splitn(3, ';');
    let (Some(sequence), Some(p), Some(q)) = (parts.next(), parts.next(), parts.next()) else {
        return;
    };

    let Ok(private_key) = PrivateKey::from_text(sequence, p, q) else {
        return;
    };

    // every accepted key must satisfy its own invariants and round-trip
    assert_eq!(validate_super_increasing(private_key.sequence()), Ok(private_key.sum()));
    assert!(private_key.modulus() > private_key.sum());

    let keypair = KeyPair::from_private_key(private_key);
    let message = b"fuzz";
    let ciphertext = keypair.encrypt(message).unwrap();
    assert_eq!(keypair.decrypt(&ciphertext).unwrap(), message);
});
