// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use num_bigint_dig::BigUint;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid key size: must be at least {min} bits, got {actual}")]
    InvalidKeySize { min: usize, actual: usize },

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid private key")]
    InvalidPrivateKey,

    #[error("Operands were produced under different public keys")]
    KeyMismatch,

    #[error("Encoded value out of range: magnitude must not exceed max_int = {max_int}")]
    EncodingRange { max_int: BigUint },

    #[error("Cannot encode NaN or infinite values")]
    NonFiniteScalar,

    #[error("Overflow detected: encoding lies between the positive and negative ranges")]
    Overflow,

    #[error("Exponent mismatch: cannot rescale exponent {current} to larger exponent {requested}")]
    ExponentMismatch { current: i32, requested: i32 },

    #[error("Exponent {exponent} out of range: magnitude must not exceed {limit}")]
    ExponentRange { exponent: i64, limit: i32 },

    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    #[error("Invalid number: {0:?}")]
    InvalidNumber(String),
}

pub type Result<T> = std::result::Result<T, Error>;
