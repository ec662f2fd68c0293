#![no_main]

use libfuzzer_sys::fuzz_target;
use num_bigint_dig::BigUint;
use paillier::KeyPair;
use std::sync::OnceLock;

static KEYPAIR: OnceLock<KeyPair> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let key_pair = KEYPAIR.get_or_init(|| KeyPair::generate_with_size(256).unwrap());
    let pub_key = key_pair.public_key();
    let priv_key = key_pair.private_key();
    let n = pub_key.n();

    // Limit input to modulus size
    let n_len = n.to_bytes_be().len();
    let truncated = if data.len() > n_len { &data[..n_len] } else { data };

    let plaintext = BigUint::from_bytes_be(truncated) % n;

    let ciphertext = pub_key.raw_encrypt(&plaintext).expect("plaintext below n rejected");
    let decrypted = priv_key.raw_decrypt(&ciphertext).expect("valid ciphertext rejected");

    assert_eq!(plaintext, decrypted);

    // Arbitrary values below n² either decrypt or are rejected; they never panic.
    let arbitrary = BigUint::from_bytes_be(data) % pub_key.nsquare();
    let _ = priv_key.raw_decrypt(&arbitrary);
});
