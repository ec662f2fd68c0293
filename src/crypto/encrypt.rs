// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{Encrypt, util};
use crate::encoding::EncodedNumber;
use crate::encrypted::EncryptedNumber;
use crate::error::{Error, Result};
use crate::keypair::PublicKey;
use crate::scalar::Scalar;

use num_bigint_dig::BigUint;
use num_traits::One;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

impl PublicKey {
    /// Raw Paillier encryption of an encoded plaintext.
    ///
    /// The plaintext is an element of `[0, n)`, typically an
    /// [`EncodedNumber`] encoding. Larger values wrap modulo `n`. A fresh
    /// obfuscator `r^n` with `1 < r < n` is drawn from the OS.
    pub fn raw_encrypt(&self, plaintext: &BigUint) -> Result<BigUint> {
        self.raw_encrypt_with_rng(plaintext, &mut OsRng)
    }

    /// Raw encryption drawing the obfuscator from `rng`.
    pub fn raw_encrypt_with_rng<R: RngCore + CryptoRng>(
        &self,
        plaintext: &BigUint,
        rng: &mut R,
    ) -> Result<BigUint> {
        let r = util::random_lt_n(self.n(), rng);
        self.raw_encrypt_with_r(plaintext, &r)
    }

    /// Deterministic raw encryption with a caller-chosen `r`.
    ///
    /// The result is a pure function of `(plaintext, r)`. Reusing `r` breaks
    /// semantic security; only use this for terms that are masked later or
    /// for known-answer tests.
    pub fn raw_encrypt_with_r(&self, plaintext: &BigUint, r_value: &BigUint) -> Result<BigUint> {
        let nude_ciphertext = self.nude_ciphertext(plaintext)?;
        if r_value.is_one() {
            return Ok(nude_ciphertext);
        }

        let obfuscator = util::obfuscator(r_value, self.n(), self.nsquare());
        Ok((nude_ciphertext * obfuscator) % self.nsquare())
    }

    /// g^m mod n² without the random mask.
    ///
    /// Negative-range plaintexts are encrypted as the inverse of
    /// `g^(n - m)`, which needs a much smaller exponent. With `g = n + 1`
    /// this equals `g^m`; for other generators it differs by the n-th
    /// residue `g^n` and only the plaintext is preserved.
    pub(crate) fn nude_ciphertext(&self, plaintext: &BigUint) -> Result<BigUint> {
        if self.is_negative(plaintext) {
            let neg_plaintext = self.n() - plaintext;
            let neg_ciphertext = self.pow_g(&neg_plaintext);
            util::mod_inverse(&neg_ciphertext, self.nsquare()).ok_or(Error::InvalidPublicKey)
        } else {
            Ok(self.pow_g(plaintext))
        }
    }

    /// g^m mod n².
    ///
    /// With g = n + 1 the binomial theorem gives g^m ≡ 1 + mn (mod n²).
    fn pow_g(&self, m: &BigUint) -> BigUint {
        let n = self.n();
        if self.g() == &(n + BigUint::one()) {
            (n * m + BigUint::one()) % self.nsquare()
        } else {
            self.g().modpow(m, self.nsquare())
        }
    }

    /// Encrypt an encoded number drawing the obfuscator from `rng`.
    pub fn encrypt_encoded_with_rng<R: RngCore + CryptoRng>(
        &self,
        encoded: &EncodedNumber,
        rng: &mut R,
    ) -> Result<EncryptedNumber> {
        if !encoded.public_key().same_key(self) {
            return Err(Error::KeyMismatch);
        }

        let ciphertext = self.raw_encrypt_with_rng(encoded.encoding(), rng)?;
        Ok(EncryptedNumber::obfuscated(self.clone(), ciphertext, encoded.exponent()))
    }
}

impl Encrypt for PublicKey {
    fn encrypt<S: Into<Scalar>>(&self, value: S) -> Result<EncryptedNumber> {
        let encoded = EncodedNumber::encode(self, value)?;
        self.encrypt_encoded(&encoded)
    }

    fn encrypt_with_precision<S: Into<Scalar>>(
        &self,
        value: S,
        precision: f64,
    ) -> Result<EncryptedNumber> {
        let encoded = EncodedNumber::encode_with(self, value, Some(precision), None)?;
        self.encrypt_encoded(&encoded)
    }

    fn encrypt_encoded(&self, encoded: &EncodedNumber) -> Result<EncryptedNumber> {
        self.encrypt_encoded_with_rng(encoded, &mut OsRng)
    }
}
