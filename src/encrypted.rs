// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted numbers and their homomorphic operations.
//!
//! Drawing a random obfuscator costs a full modular exponentiation, so sums
//! and products are left unmasked: in a dot product only the final sum is
//! ever shown to anyone. [`EncryptedNumber::ciphertext`] masks the value the
//! first time it is disclosed.

use std::cmp::Ordering;
use std::sync::{Mutex, MutexGuard, PoisonError};

use num_bigint_dig::BigUint;
use num_traits::One;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::crypto::util;
use crate::encoding::{EncodedNumber, check_exponent, rescale_factor};
use crate::error::{Error, Result};
use crate::keypair::PublicKey;
use crate::scalar::Scalar;

/// Whether the stored ciphertext carries a fresh random mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Obfuscation {
    /// Result of homomorphic arithmetic; must be masked before disclosure.
    Raw,
    /// Multiplied by `r^n` for a random `r` since it was last modified.
    Obfuscated,
}

#[derive(Debug, Clone)]
struct CiphertextCell {
    value: BigUint,
    state: Obfuscation,
}

/// The Paillier encryption of a signed integer or float.
///
/// Usually produced by [`Encrypt::encrypt`](crate::Encrypt::encrypt).
/// Construct one directly only when deserializing a number someone else
/// encrypted.
#[derive(Debug)]
pub struct EncryptedNumber {
    public_key: PublicKey,
    exponent: i32,
    cell: Mutex<CiphertextCell>,
}

impl EncryptedNumber {
    /// Wrap a ciphertext received from elsewhere.
    ///
    /// The ciphertext must be below `n²` and the exponent within
    /// [`MAX_EXPONENT`](crate::MAX_EXPONENT). It is treated as unmasked.
    pub fn new(public_key: PublicKey, ciphertext: BigUint, exponent: i32) -> Result<Self> {
        if &ciphertext >= public_key.nsquare() {
            return Err(Error::MalformedCiphertext("ciphertext is not below n²".into()));
        }
        let exponent = check_exponent(i64::from(exponent))?;

        Ok(Self::with_state(public_key, ciphertext, exponent, Obfuscation::Raw))
    }

    pub(crate) fn obfuscated(public_key: PublicKey, ciphertext: BigUint, exponent: i32) -> Self {
        Self::with_state(public_key, ciphertext, exponent, Obfuscation::Obfuscated)
    }

    fn raw(public_key: PublicKey, ciphertext: BigUint, exponent: i32) -> Self {
        Self::with_state(public_key, ciphertext, exponent, Obfuscation::Raw)
    }

    fn with_state(
        public_key: PublicKey,
        value: BigUint,
        exponent: i32,
        state: Obfuscation,
    ) -> Self {
        Self { public_key, exponent, cell: Mutex::new(CiphertextCell { value, state }) }
    }

    /// Return the public key this number is encrypted under.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Return the base-16 exponent of the encrypted mantissa.
    pub fn exponent(&self) -> i32 {
        self.exponent
    }

    /// Whether the stored ciphertext is currently masked.
    pub fn is_obfuscated(&self) -> bool {
        self.lock().state == Obfuscation::Obfuscated
    }

    /// Return the ciphertext.
    ///
    /// With `be_secure` the ciphertext is masked with a fresh `r^n` first,
    /// unless that already happened; the masked value is kept. Pass `true`
    /// whenever anyone else will see the result. With `be_secure = false`
    /// the stored value is returned as is, and whoever sees it may be able
    /// to work out the scalars that were added or multiplied in.
    pub fn ciphertext(&self, be_secure: bool) -> BigUint {
        if be_secure {
            self.ciphertext_with_rng(&mut OsRng)
        } else {
            self.lock().value.clone()
        }
    }

    /// Like `ciphertext(true)`, drawing the mask from `rng`.
    pub fn ciphertext_with_rng<R: RngCore + CryptoRng>(&self, rng: &mut R) -> BigUint {
        let mut cell = self.lock();
        if cell.state == Obfuscation::Raw {
            self.mask(&mut cell, rng);
        }
        cell.value.clone()
    }

    /// Mask the ciphertext with a fresh random `r^n`, even if already masked.
    pub fn obfuscate(&self) {
        self.obfuscate_with_rng(&mut OsRng);
    }

    /// Like [`obfuscate`](Self::obfuscate), drawing the mask from `rng`.
    pub fn obfuscate_with_rng<R: RngCore + CryptoRng>(&self, rng: &mut R) {
        let mut cell = self.lock();
        self.mask(&mut cell, rng);
    }

    fn mask<R: RngCore + CryptoRng>(&self, cell: &mut CiphertextCell, rng: &mut R) {
        let pk = &self.public_key;
        let r = util::random_lt_n(pk.n(), rng);
        let r_pow_n = util::obfuscator(&r, pk.n(), pk.nsquare());

        cell.value = (&cell.value * r_pow_n) % pk.nsquare();
        cell.state = Obfuscation::Obfuscated;
    }

    /// A poisoned lock still holds a consistent value: both fields are
    /// written together.
    fn lock(&self) -> MutexGuard<'_, CiphertextCell> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// E(a) + E(b).
    ///
    /// The operand with the larger exponent is rescaled to the smaller one
    /// first. The result is unmasked.
    pub fn add(&self, other: &EncryptedNumber) -> Result<EncryptedNumber> {
        self.check_key(&other.public_key)?;

        let (a, b) = match self.exponent.cmp(&other.exponent) {
            Ordering::Greater => (self.decrease_exponent_to(other.exponent)?, other.clone()),
            Ordering::Less => (self.clone(), other.decrease_exponent_to(self.exponent)?),
            Ordering::Equal => (self.clone(), other.clone()),
        };

        let sum = a.raw_add(&b.ciphertext(false));
        Ok(EncryptedNumber::raw(self.public_key.clone(), sum, a.exponent))
    }

    /// E(a) + b for a plaintext scalar.
    pub fn add_scalar<S: Into<Scalar>>(&self, scalar: S) -> Result<EncryptedNumber> {
        let encoded =
            EncodedNumber::encode_with(&self.public_key, scalar, None, Some(self.exponent))?;
        self.add_encoded(&encoded)
    }

    /// E(a) + b for an encoded plaintext.
    ///
    /// The plaintext term is encrypted with `r = 1`: it is multiplied into a
    /// ciphertext that gets masked before disclosure anyway.
    pub fn add_encoded(&self, encoded: &EncodedNumber) -> Result<EncryptedNumber> {
        self.check_key(encoded.public_key())?;

        let (a, encoded) = match self.exponent.cmp(&encoded.exponent()) {
            Ordering::Greater => {
                (self.decrease_exponent_to(encoded.exponent())?, encoded.clone())
            }
            Ordering::Less => (self.clone(), encoded.decrease_exponent_to(self.exponent)?),
            Ordering::Equal => (self.clone(), encoded.clone()),
        };

        let term = self.public_key.raw_encrypt_with_r(encoded.encoding(), &BigUint::one())?;
        let sum = a.raw_add(&term);
        Ok(EncryptedNumber::raw(self.public_key.clone(), sum, a.exponent))
    }

    /// E(a) - E(b).
    pub fn sub(&self, other: &EncryptedNumber) -> Result<EncryptedNumber> {
        self.add(&other.neg()?)
    }

    /// E(a) - b for a plaintext scalar.
    pub fn sub_scalar<S: Into<Scalar>>(&self, scalar: S) -> Result<EncryptedNumber> {
        match scalar.into() {
            Scalar::Int(i) => self.add_scalar(-i),
            Scalar::Float(f) => self.add_scalar(-f),
        }
    }

    /// E(a) · b for a plaintext scalar.
    ///
    /// The exponents add up. The result is unmasked.
    pub fn mul<S: Into<Scalar>>(&self, scalar: S) -> Result<EncryptedNumber> {
        let encoded = EncodedNumber::encode(&self.public_key, scalar)?;
        self.mul_encoded(&encoded)
    }

    /// E(a) · b for an encoded plaintext.
    pub fn mul_encoded(&self, encoded: &EncodedNumber) -> Result<EncryptedNumber> {
        self.check_key(encoded.public_key())?;

        let exponent = check_exponent(i64::from(self.exponent) + i64::from(encoded.exponent()))?;
        let product = self.raw_mul(encoded.encoding())?;
        Ok(EncryptedNumber::raw(self.public_key.clone(), product, exponent))
    }

    /// -E(a).
    pub fn neg(&self) -> Result<EncryptedNumber> {
        self.mul(-1)
    }

    /// E(a) / d, computed as multiplication by `1 / d`.
    pub fn div(&self, divisor: f64) -> Result<EncryptedNumber> {
        self.mul(1.0 / divisor)
    }

    /// Rescale to a smaller exponent without changing the plaintext value.
    ///
    /// Raising the ciphertext to `16^(exponent - new_exponent)` multiplies
    /// the encrypted mantissa by the same factor. The result is unmasked.
    pub fn decrease_exponent_to(&self, new_exponent: i32) -> Result<EncryptedNumber> {
        if new_exponent > self.exponent {
            return Err(Error::ExponentMismatch {
                current: self.exponent,
                requested: new_exponent,
            });
        }
        let new_exponent = check_exponent(i64::from(new_exponent))?;

        let factor = rescale_factor(self.exponent, new_exponent, self.public_key.n());
        let ciphertext = self.raw_mul(&factor)?;
        Ok(EncryptedNumber::raw(self.public_key.clone(), ciphertext, new_exponent))
    }

    fn check_key(&self, other: &PublicKey) -> Result<()> {
        if self.public_key.same_key(other) { Ok(()) } else { Err(Error::KeyMismatch) }
    }

    /// c1 · c2 mod n²
    fn raw_add(&self, other_ciphertext: &BigUint) -> BigUint {
        (self.ciphertext(false) * other_ciphertext) % self.public_key.nsquare()
    }

    /// c^k mod n², using the inverse for negative-range `k`.
    fn raw_mul(&self, plaintext: &BigUint) -> Result<BigUint> {
        let pk = &self.public_key;
        let ciphertext = self.ciphertext(false);

        if pk.is_negative(plaintext) {
            let neg_c = util::mod_inverse(&ciphertext, pk.nsquare()).ok_or_else(|| {
                Error::MalformedCiphertext("ciphertext is not invertible mod n²".into())
            })?;
            let neg_scalar = pk.n() - plaintext;
            Ok(neg_c.modpow(&neg_scalar, pk.nsquare()))
        } else {
            Ok(ciphertext.modpow(plaintext, pk.nsquare()))
        }
    }
}

impl Clone for EncryptedNumber {
    fn clone(&self) -> Self {
        let cell = self.lock().clone();
        Self { public_key: self.public_key.clone(), exponent: self.exponent, cell: Mutex::new(cell) }
    }
}
