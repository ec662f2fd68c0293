// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

mod util;

use std::sync::Arc;

use crate::crypto::util::{l_function, mod_inverse};
use crate::crypto::{Decrypt, Encrypt};
use crate::encoding::EncodedNumber;
use crate::encrypted::EncryptedNumber;
use crate::error::{Error, Result};
use crate::export::ExportedPublicKey;
use crate::scalar::Scalar;

use num_bigint_dig::BigUint;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Debug, PartialEq, Eq)]
struct PublicParams {
    g: BigUint,
    n: BigUint,
    nsquare: BigUint,
    max_int: BigUint,
}

/// Public parameters of the cryptosystem.
///
/// The modulus is `n = pq`; generated keys use the generator `g = n + 1`.
/// `max_int = n/3 - 1` splits `[0, n)` into a positive range `[0, max_int]`,
/// a negative range `[n - max_int, n)` and a gap between them that is never
/// produced by encoding and therefore flags overflow.
///
/// Cloning is cheap: clones share the same parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ExportedPublicKey", into = "ExportedPublicKey")]
pub struct PublicKey {
    params: Arc<PublicParams>,
}

impl PublicKey {
    /// Construct a public key from its generator and modulus.
    ///
    /// `n` must exceed 1 and `g` must be a unit modulo `n` with `0 < g < n²`.
    pub fn new(g: BigUint, n: BigUint) -> Result<Self> {
        if n <= BigUint::one() || g.is_zero() {
            return Err(Error::InvalidPublicKey);
        }

        let nsquare = &n * &n;
        if g >= nsquare || mod_inverse(&g, &n).is_none() {
            return Err(Error::InvalidPublicKey);
        }

        let max_int = &n / BigUint::from(3u32);
        if max_int.is_zero() {
            return Err(Error::InvalidPublicKey);
        }
        let max_int = max_int - BigUint::one();

        Ok(Self { params: Arc::new(PublicParams { g, n, nsquare, max_int }) })
    }

    /// Construct the public key `(n + 1, n)` for a modulus.
    pub fn from_modulus(n: BigUint) -> Result<Self> {
        let g = &n + BigUint::one();
        Self::new(g, n)
    }

    /// Parse a public key from decimal strings.
    pub fn from_decimal(g: &str, n: &str) -> Result<Self> {
        Self::new(parse_decimal(g)?, parse_decimal(n)?)
    }

    /// Return the generator `g`.
    pub fn g(&self) -> &BigUint {
        &self.params.g
    }

    /// Return the public modulus `n`.
    pub fn n(&self) -> &BigUint {
        &self.params.n
    }

    /// Return `n²`, the ciphertext modulus.
    pub fn nsquare(&self) -> &BigUint {
        &self.params.nsquare
    }

    /// Return the largest magnitude an encoding may carry.
    pub fn max_int(&self) -> &BigUint {
        &self.params.max_int
    }

    /// Return the bit length of the modulus.
    pub fn bit_length(&self) -> usize {
        self.params.n.bits()
    }

    /// Whether `m` lies in the negative range `[n - max_int, n)`.
    pub(crate) fn is_negative(&self, m: &BigUint) -> bool {
        let n = self.n();
        m < n && &(n - self.max_int()) <= m
    }

    /// Cheap identity check used before combining operands.
    pub(crate) fn same_key(&self, other: &PublicKey) -> bool {
        Arc::ptr_eq(&self.params, &other.params) || self == other
    }
}

/// Secret key material.
///
/// For generated keys `lambda = (p-1)(q-1)` and `mu = lambda⁻¹ mod n`. In
/// general `mu = L(g^lambda mod n²)⁻¹ mod n`, which reduces to the former when
/// `g = n + 1`. Sensitive fields are zeroized on drop.
#[allow(missing_debug_implementations)]
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct PrivateKey {
    #[zeroize(skip)]
    pub(crate) public_key: PublicKey,
    pub(crate) lambda: BigUint,
    pub(crate) mu: BigUint,
}

impl PrivateKey {
    /// Construct a private key from `lambda` and `mu`.
    pub fn new(public_key: PublicKey, lambda: BigUint, mu: BigUint) -> Result<Self> {
        if lambda.is_zero() || mu.is_zero() || &mu >= public_key.n() {
            return Err(Error::InvalidPrivateKey);
        }

        Ok(Self { public_key, lambda, mu })
    }

    /// Construct a private key from the prime factors of `n`.
    ///
    /// Validates that the factors are distinct and reconstruct the modulus.
    pub fn from_factors(public_key: PublicKey, p: &BigUint, q: &BigUint) -> Result<Self> {
        if p.is_zero() || q.is_zero() || p == q || &(p * q) != public_key.n() {
            return Err(Error::InvalidPrivateKey);
        }

        let lambda = (p - BigUint::one()) * (q - BigUint::one());

        let u = public_key.g().modpow(&lambda, public_key.nsquare());
        let l_of_u = l_function(&u, public_key.n()).map_err(|_| Error::InvalidPrivateKey)?;
        let mu = mod_inverse(&l_of_u, public_key.n()).ok_or(Error::InvalidPrivateKey)?;

        Self::new(public_key, lambda, mu)
    }

    /// Parse a private key from decimal strings.
    pub fn from_decimal(public_key: PublicKey, lambda: &str, mu: &str) -> Result<Self> {
        Self::new(public_key, parse_decimal(lambda)?, parse_decimal(mu)?)
    }

    /// Return a reference to the associated public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }
}

/// A complete key pair consisting of public and private components.
///
/// Secret material is zeroized when dropped.
#[allow(missing_debug_implementations)]
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct KeyPair {
    #[zeroize(skip)]
    public: PublicKey,
    secret: PrivateKey,
    #[zeroize(skip)]
    bit_length: usize,
}

impl KeyPair {
    /// Generate a key pair with default parameters (1024-bit modulus).
    pub fn generate() -> Result<Self> {
        KeyPairBuilder::new().build()
    }

    /// Generate a key pair with a custom modulus size.
    pub fn generate_with_size(bit_length: usize) -> Result<Self> {
        KeyPairBuilder::new().bit_length(bit_length).build()
    }

    /// Return the public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Return the private key.
    pub fn private_key(&self) -> &PrivateKey {
        &self.secret
    }

    /// Return the requested modulus bit length.
    pub fn bit_length(&self) -> usize {
        self.bit_length
    }
}

impl Encrypt for KeyPair {
    fn encrypt<S: Into<Scalar>>(&self, value: S) -> Result<EncryptedNumber> {
        self.public.encrypt(value)
    }

    fn encrypt_with_precision<S: Into<Scalar>>(
        &self,
        value: S,
        precision: f64,
    ) -> Result<EncryptedNumber> {
        self.public.encrypt_with_precision(value, precision)
    }

    fn encrypt_encoded(&self, encoded: &EncodedNumber) -> Result<EncryptedNumber> {
        self.public.encrypt_encoded(encoded)
    }
}

impl Decrypt for KeyPair {
    fn decrypt(&self, encrypted: &EncryptedNumber) -> Result<Scalar> {
        self.secret.decrypt(encrypted)
    }

    fn decrypt_encoded(&self, encrypted: &EncryptedNumber) -> Result<EncodedNumber> {
        self.secret.decrypt_encoded(encrypted)
    }
}

/// Builder for generating key pairs with configurable parameters.
#[derive(Debug)]
pub struct KeyPairBuilder {
    bit_length: usize,
}

impl KeyPairBuilder {
    /// Create a builder with default parameters.
    pub fn new() -> Self {
        Self { bit_length: Self::DEFAULT_BITS }
    }

    /// Modulus size used when none is requested.
    pub const DEFAULT_BITS: usize = 1024;

    /// Below this size a warning is printed.
    pub const MIN_SECURE_BITS: usize = 1024;

    /// Absolute minimum enforced in production builds
    /// Can be bypassed with `allow-weak-keys` feature flag
    #[cfg(not(feature = "allow-weak-keys"))]
    const ABSOLUTE_MIN_BITS: usize = 128;

    #[cfg(feature = "allow-weak-keys")]
    const ABSOLUTE_MIN_BITS: usize = 16;

    /// Attempts at drawing a (p, q) pair before giving up.
    const MAX_ATTEMPTS: usize = 64;

    /// Set the desired modulus bit length.
    pub fn bit_length(mut self, bits: usize) -> Self {
        self.bit_length = bits;
        self
    }

    /// Generate the key pair using the operating system's entropy source.
    pub fn build(self) -> Result<KeyPair> {
        self.build_with_rng(&mut OsRng)
    }

    /// Generate the key pair from the given random source.
    pub fn build_with_rng<R: RngCore + CryptoRng>(self, rng: &mut R) -> Result<KeyPair> {
        if self.bit_length < Self::ABSOLUTE_MIN_BITS {
            return Err(Error::InvalidKeySize {
                min: Self::ABSOLUTE_MIN_BITS,
                actual: self.bit_length,
            });
        }

        if self.bit_length < Self::MIN_SECURE_BITS {
            eprintln!(
                "⚠️  SECURITY WARNING: {}-bit key is cryptographically weak!",
                self.bit_length
            );
            eprintln!("⚠️  Use {} bits minimum for production", Self::MIN_SECURE_BITS);
        }

        // Odd lengths give q the extra bit so that |p| + |q| = |n|.
        let p_bits = self.bit_length / 2;
        let q_bits = self.bit_length - p_bits;

        for _ in 0..Self::MAX_ATTEMPTS {
            let p = util::generate_prime(p_bits, rng)?;
            let q = util::generate_prime(q_bits, rng)?;

            let n = &p * &q;
            if p == q || n.bits() != self.bit_length {
                continue;
            }

            // simple variant with g = n + 1
            let g = &n + BigUint::one();
            let lambda = (&p - BigUint::one()) * (&q - BigUint::one());
            let mu = mod_inverse(&lambda, &n)
                .ok_or_else(|| Error::KeyGeneration("lambda is not invertible mod n".into()))?;

            let public = PublicKey::new(g, n)?;
            let secret = PrivateKey::new(public.clone(), lambda, mu)?;

            return Ok(KeyPair { public, secret, bit_length: self.bit_length });
        }

        Err(Error::KeyGeneration(format!(
            "no suitable {}-bit modulus after {} attempts",
            self.bit_length,
            Self::MAX_ATTEMPTS
        )))
    }
}

impl Default for KeyPairBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn parse_decimal(s: &str) -> Result<BigUint> {
    BigUint::parse_bytes(s.trim().as_bytes(), 10).ok_or_else(|| Error::InvalidNumber(s.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn regression_key() -> PublicKey {
        PublicKey::from_decimal("6497955158", "126869").unwrap()
    }

    #[test]
    fn public_key_parameters() {
        let pk = regression_key();
        assert_eq!(pk.nsquare(), &BigUint::from(126869u64 * 126869));
        assert_eq!(pk.max_int(), &BigUint::from(42288u32));
        assert_eq!(pk.bit_length(), 17);
    }

    #[test]
    fn rejects_invalid_public_keys() {
        assert_eq!(PublicKey::new(BigUint::from(2u32), BigUint::one()), Err(Error::InvalidPublicKey));
        assert_eq!(PublicKey::new(BigUint::zero(), BigUint::from(35u32)), Err(Error::InvalidPublicKey));
        // g shares a factor with n
        assert_eq!(PublicKey::new(BigUint::from(7u32), BigUint::from(35u32)), Err(Error::InvalidPublicKey));
        assert!(matches!(PublicKey::from_decimal("12x", "35"), Err(Error::InvalidNumber(_))));
    }

    #[test]
    fn negative_range_boundaries() {
        let pk = regression_key();
        let n = pk.n().clone();
        let lower = &n - pk.max_int();
        assert!(pk.is_negative(&lower));
        assert!(pk.is_negative(&(&n - BigUint::one())));
        assert!(!pk.is_negative(&(&lower - BigUint::one())));
        assert!(!pk.is_negative(&n));
        assert!(!pk.is_negative(pk.max_int()));
    }

    #[test]
    fn from_factors_decrypts_regression_ciphertext() {
        // 126869 = 293 * 433
        let pk = regression_key();
        let sk = PrivateKey::from_factors(pk.clone(), &BigUint::from(293u32), &BigUint::from(433u32))
            .unwrap();

        let m = BigUint::from(10100u32);
        assert_eq!(sk.raw_decrypt(&BigUint::from(848742150u64)).unwrap(), m);

        let mut rng = ChaCha20Rng::seed_from_u64(3);
        for value in [0u32, 1, 10100, 42288, 126868] {
            let m = BigUint::from(value);
            let c = pk.raw_encrypt_with_rng(&m, &mut rng).unwrap();
            assert_eq!(sk.raw_decrypt(&c).unwrap(), m);
        }
    }

    #[test]
    fn from_factors_rejects_wrong_factors() {
        let pk = regression_key();
        let p = BigUint::from(293u32);
        assert!(matches!(
            PrivateKey::from_factors(pk.clone(), &p, &p),
            Err(Error::InvalidPrivateKey)
        ));
        assert!(matches!(
            PrivateKey::from_factors(pk, &p, &BigUint::from(431u32)),
            Err(Error::InvalidPrivateKey)
        ));
    }

    #[test]
    fn generates_exact_bit_lengths() {
        let mut rng = ChaCha20Rng::seed_from_u64(2024);
        for bits in [128usize, 256, 512, 1024] {
            let keypair = KeyPairBuilder::new().bit_length(bits).build_with_rng(&mut rng).unwrap();
            let pk = keypair.public_key();
            assert_eq!(keypair.bit_length(), bits);
            assert_eq!(pk.bit_length(), bits);
            assert_eq!(pk.g(), &(pk.n() + BigUint::one()));
            assert_eq!(keypair.private_key().public_key(), pk);
        }
    }

    #[test]
    fn generated_mu_inverts_lambda() {
        let keypair = KeyPair::generate_with_size(256).unwrap();
        let sk = keypair.private_key();
        let n = keypair.public_key().n();
        assert_eq!((&sk.lambda * &sk.mu) % n, BigUint::one());
    }

    #[test]
    fn odd_bit_length() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let keypair = KeyPairBuilder::new().bit_length(257).build_with_rng(&mut rng).unwrap();
        assert_eq!(keypair.public_key().bit_length(), 257);
    }

    #[cfg(not(feature = "allow-weak-keys"))]
    #[test]
    fn rejects_tiny_keys() {
        let result = KeyPair::generate_with_size(64);
        assert!(matches!(result, Err(Error::InvalidKeySize { min: 128, actual: 64 })));
    }

    #[test]
    fn default_builder() {
        assert_eq!(KeyPairBuilder::default().bit_length, 1024);
    }
}
