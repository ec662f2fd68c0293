// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Decrypt, util};
use crate::encoding::EncodedNumber;
use crate::encrypted::EncryptedNumber;
use crate::error::{Error, Result};
use crate::keypair::PrivateKey;
use crate::scalar::Scalar;

use num_bigint_dig::BigUint;
use num_traits::Zero;

impl PrivateKey {
    /// Raw Paillier decryption.
    ///
    /// m = L(c^λ mod n²) · μ mod n
    ///
    /// Ciphertexts outside `(0, n²)` or not of the form produced under this
    /// key are rejected with [`Error::MalformedCiphertext`] instead of
    /// yielding a meaningless plaintext.
    pub fn raw_decrypt(&self, ciphertext: &BigUint) -> Result<BigUint> {
        let n = self.public_key.n();
        let nsquare = self.public_key.nsquare();

        if ciphertext >= nsquare {
            return Err(Error::MalformedCiphertext("ciphertext is not below n²".into()));
        }
        if ciphertext.is_zero() {
            return Err(Error::MalformedCiphertext("ciphertext is zero".into()));
        }

        let u = ciphertext.modpow(&self.lambda, nsquare);
        let l_of_u = util::l_function(&u, n)?;

        Ok((l_of_u * &self.mu) % n)
    }
}

impl Decrypt for PrivateKey {
    fn decrypt(&self, encrypted: &EncryptedNumber) -> Result<Scalar> {
        self.decrypt_encoded(encrypted)?.decode()
    }

    fn decrypt_encoded(&self, encrypted: &EncryptedNumber) -> Result<EncodedNumber> {
        if !encrypted.public_key().same_key(&self.public_key) {
            return Err(Error::KeyMismatch);
        }

        // Decrypting locally never needs the mask.
        let plaintext = self.raw_decrypt(&encrypted.ciphertext(false))?;
        EncodedNumber::new(self.public_key.clone(), plaintext, encrypted.exponent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Encrypt;
    use crate::keypair::{KeyPair, KeyPairBuilder, PublicKey};
    use num_bigint_dig::RandBigInt;
    use num_traits::One;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn regression_keys() -> PrivateKey {
        let pk = PublicKey::from_decimal("6497955158", "126869").unwrap();
        PrivateKey::from_decimal(pk, "31536", "53022").unwrap()
    }

    fn test_keypair(seed: u64, bits: usize) -> KeyPair {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        KeyPairBuilder::new().bit_length(bits).build_with_rng(&mut rng).unwrap()
    }

    #[test]
    fn known_answer() {
        let sk = regression_keys();
        let m = sk.raw_decrypt(&BigUint::from(848742150u64)).unwrap();
        assert_eq!(m, BigUint::from(10100u32));
    }

    #[test]
    fn raw_roundtrip_random_plaintexts() {
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        for bits in [128usize, 256, 512] {
            let keypair = test_keypair(bits as u64, bits);
            let pk = keypair.public_key();
            let sk = keypair.private_key();

            for _ in 0..5 {
                let m = rng.gen_biguint_below(pk.n());
                let c = pk.raw_encrypt_with_rng(&m, &mut rng).unwrap();
                assert_eq!(sk.raw_decrypt(&c).unwrap(), m);
            }
        }
    }

    #[test]
    fn raw_roundtrip_large_number() {
        let keypair = test_keypair(1, 256);
        let m = BigUint::parse_bytes(b"123456789123456789123456789123456789", 10).unwrap();
        let c = keypair.public_key().raw_encrypt(&m).unwrap();
        assert_ne!(c, m);
        assert_eq!(keypair.private_key().raw_decrypt(&c).unwrap(), m);
    }

    #[test]
    fn modulo_n_wraparound() {
        let keypair = test_keypair(2, 256);
        let pk = keypair.public_key();
        let sk = keypair.private_key();
        let n = pk.n();

        let n_minus_1 = n - BigUint::one();
        assert_eq!(sk.raw_decrypt(&pk.raw_encrypt(&n_minus_1).unwrap()).unwrap(), n_minus_1);
        assert_eq!(sk.raw_decrypt(&pk.raw_encrypt(n).unwrap()).unwrap(), BigUint::zero());
        let n_plus_1 = n + BigUint::one();
        assert_eq!(sk.raw_decrypt(&pk.raw_encrypt(&n_plus_1).unwrap()).unwrap(), BigUint::one());
    }

    #[test]
    fn additive_homomorphism() {
        let keypair = test_keypair(3, 256);
        let pk = keypair.public_key();
        let sk = keypair.private_key();
        let mut rng = ChaCha20Rng::seed_from_u64(4);

        let m1 = rng.gen_biguint_below(pk.n());
        let m2 = rng.gen_biguint_below(pk.n());
        let c1 = pk.raw_encrypt(&m1).unwrap();
        let c2 = pk.raw_encrypt(&m2).unwrap();

        let sum = sk.raw_decrypt(&((c1 * c2) % pk.nsquare())).unwrap();
        assert_eq!(sum, (m1 + m2) % pk.n());
    }

    #[test]
    fn scalar_homomorphism() {
        let keypair = test_keypair(5, 256);
        let pk = keypair.public_key();
        let sk = keypair.private_key();

        let m = BigUint::from(123456u32);
        let k = BigUint::from(789u32);
        let c = pk.raw_encrypt(&m).unwrap();

        let product = sk.raw_decrypt(&c.modpow(&k, pk.nsquare())).unwrap();
        assert_eq!(product, (m * k) % pk.n());
    }

    #[test]
    fn malformed_ciphertexts() {
        let sk = regression_keys();
        let nsquare = sk.public_key().nsquare().clone();

        for bad in [
            nsquare.clone(),
            &nsquare + BigUint::one(),
            BigUint::zero(),
            // multiples of the prime factors are not units mod n²
            BigUint::from(126869u32),
            BigUint::from(293u32),
            BigUint::from(433u32 * 5),
        ] {
            assert!(
                matches!(sk.raw_decrypt(&bad), Err(Error::MalformedCiphertext(_))),
                "accepted {bad}"
            );
        }
    }

    #[test]
    fn decrypt_scalars() {
        let keypair = test_keypair(6, 256);
        let pk = keypair.public_key();
        let sk = keypair.private_key();

        assert_eq!(sk.decrypt(&pk.encrypt(-42).unwrap()).unwrap(), Scalar::from(-42));
        assert_eq!(sk.decrypt(&pk.encrypt(3.25).unwrap()).unwrap(), Scalar::Float(3.25));
        assert_eq!(keypair.decrypt(&keypair.encrypt(0).unwrap()).unwrap(), Scalar::from(0));
    }

    #[test]
    fn decrypt_rejects_other_key() {
        let ours = test_keypair(7, 256);
        let theirs = test_keypair(8, 256);
        let encrypted = theirs.encrypt(1).unwrap();
        assert!(matches!(ours.decrypt(&encrypted), Err(Error::KeyMismatch)));
    }
}
