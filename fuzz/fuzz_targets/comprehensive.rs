#![no_main]

use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::OnceLock;

use knapsack::{Ciphertext, Decrypt, DecryptBytes, Encrypt, EncryptBytes, KeyPair, KeyPairBuilder, Stream};

static KEYPAIR: OnceLock<KeyPair> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    let keypair = KEYPAIR.get_or_init(|| KeyPair::generate_with_length(7).unwrap());
    let public = keypair.public_key();

    // ----- 1. Whole-buffer roundtrip -----
    let ciphertext = public.encrypt(data).unwrap();
    assert_eq!(keypair.decrypt(&ciphertext).unwrap(), data, "Whole-buffer roundtrip failed");

    // ----- 2. Packed roundtrip -----
    let packed = public.encrypt_bytes(data).unwrap();
    assert_eq!(packed, ciphertext.to_bytes());
    assert_eq!(Ciphertext::from_bytes(&packed).unwrap(), ciphertext);
    assert_eq!(keypair.decrypt_bytes(&packed).unwrap(), data, "Packed roundtrip failed");

    // ----- 3. Streaming with various chunk sizes -----
    for chunk_size in [1, 2, 5, 8, 13] {
        let mut encryptor = public.encryptor();
        for chunk in data.chunks(chunk_size) {
            encryptor.update(chunk).unwrap();
        }
        let packed = encryptor.finalize().unwrap();

        let mut decryptor = keypair.decryptor();
        let mut decrypted = Vec::new();
        for chunk in packed.chunks(chunk_size) {
            decrypted.extend(decryptor.update(chunk).unwrap());
        }
        decrypted.extend(decryptor.finalize().unwrap());

        assert_eq!(decrypted, data, "Streaming roundtrip failed with chunk_size={chunk_size}");
    }

    // ----- 4. Corrupted packed data must fail cleanly -----
    if !data.is_empty() {
        let mut packed = public.encrypt_bytes(data).unwrap();

        let truncated = &packed[..packed.len() - 1];
        assert!(keypair.decrypt_bytes(truncated).is_err());

        let mut version = packed.clone();
        version[0] ^= 0xFF;
        assert!(keypair.decrypt_bytes(&version).is_err());

        // flipping a block byte either fails or yields some plaintext
        let last = packed.len() - 1;
        packed[last] ^= data[0] | 1;
        let _ = keypair.decrypt_bytes(&packed);

        packed.extend_from_slice(&[0xFF; 8]);
        assert!(keypair.decrypt_bytes(&packed).is_err());
    }

    // ----- 5. Keys generated from fuzz-chosen seeds -----
    if data.len() >= 9 {
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&data[..8]);
        let length = usize::from(data[8] % 32) + 1;

        let mut rng = StdRng::seed_from_u64(u64::from_le_bytes(seed));
        let generated = KeyPairBuilder::new().length(length).build_with_rng(&mut rng).unwrap();

        let ciphertext = generated.encrypt(&data[9..]).unwrap();
        assert_eq!(generated.decrypt(&ciphertext).unwrap(), &data[9..]);
    }
});
