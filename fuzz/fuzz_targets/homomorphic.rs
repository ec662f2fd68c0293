#![no_main]

use libfuzzer_sys::fuzz_target;
use paillier::{Decrypt, Encrypt, KeyPair, Scalar};

use std::sync::OnceLock;

static KEYPAIR: OnceLock<KeyPair> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let keypair = KEYPAIR.get_or_init(|| KeyPair::generate_with_size(256).unwrap());

    let (a_bytes, rest) = data.split_at(8);
    let (k_bytes, _) = rest.split_at(8);
    // Keep operands small enough that a * k + a never leaves the encodable range.
    let a = i64::from_be_bytes(a_bytes.try_into().unwrap()) >> 8;
    let k = i64::from_be_bytes(k_bytes.try_into().unwrap()) >> 8;

    let Ok(ca) = keypair.encrypt(a) else {
        return;
    };

    let product = ca.mul(k).unwrap();
    let sum = product.add(&ca).unwrap();
    let disclosed = sum.ciphertext(true);
    assert!(&disclosed < keypair.public_key().nsquare());

    let expected = i128::from(a) * i128::from(k) + i128::from(a);
    assert_eq!(keypair.decrypt(&sum).unwrap(), Scalar::from(expected));

    let f = f64::from_be_bytes(a_bytes.try_into().unwrap());
    if f.is_finite() && f.abs() < 1e15 && f.abs() > 1e-30 {
        let cf = keypair.encrypt(f).unwrap();
        assert_eq!(keypair.decrypt(&cf).unwrap(), Scalar::Float(f));
    }
});
