// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

mod decrypt;
mod encrypt;
pub(crate) mod util;

use crate::encoding::EncodedNumber;
use crate::encrypted::EncryptedNumber;
use crate::error::Result;
use crate::scalar::Scalar;

/// Encodes and encrypts application values.
pub trait Encrypt {
    /// Encode `value` at its native precision and encrypt it.
    ///
    /// Integers must satisfy `|value| <= max_int`; floats are encoded so that
    /// no mantissa bits are lost.
    fn encrypt<S: Into<Scalar>>(&self, value: S) -> Result<EncryptedNumber>;

    /// Encode `value` with the given precision and encrypt it.
    fn encrypt_with_precision<S: Into<Scalar>>(
        &self,
        value: S,
        precision: f64,
    ) -> Result<EncryptedNumber>;

    /// Encrypt an already encoded number, keeping its exponent.
    fn encrypt_encoded(&self, encoded: &EncodedNumber) -> Result<EncryptedNumber>;
}

/// Decrypts and decodes encrypted numbers.
pub trait Decrypt {
    /// Recover the value behind an encrypted number.
    fn decrypt(&self, encrypted: &EncryptedNumber) -> Result<Scalar>;

    /// Recover the encoding behind an encrypted number without decoding it.
    fn decrypt_encoded(&self, encrypted: &EncryptedNumber) -> Result<EncodedNumber>;
}
