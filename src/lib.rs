// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Paillier Cryptosystem
//!
//! Probabilistic public-key encryption with additive homomorphism, based on
//! the decisional composite residuosity assumption for n = pq.
//!
//! Reference: [Paillier (1999), EUROCRYPT](https://link.springer.com/chapter/10.1007/3-540-48910-X_16)
//!
//! Signed integers and floats are mapped into `[0, n)` by a base-16
//! fixed-point encoding ([`EncodedNumber`]), so encrypted values can be added
//! to each other and multiplied by plaintext scalars ([`EncryptedNumber`]).
//!
//! ## Security
//!
//! Homomorphic results are not re-randomized until they are disclosed
//! through [`EncryptedNumber::ciphertext`] with `be_secure = true`. The
//! private key is zeroized on drop via the `zeroize` crate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use paillier::{Decrypt, Encrypt, KeyPair, Scalar};
//!
//! let keypair = KeyPair::generate().expect("key generation failed");
//!
//! let a = keypair.encrypt(1.5).expect("encryption failed");
//! let b = keypair.encrypt(-4).expect("encryption failed");
//! let total = a.mul(3).and_then(|a3| a3.add(&b)).expect("homomorphic operation failed");
//!
//! let exposed = total.ciphertext(true);
//! assert_eq!(keypair.decrypt(&total).expect("decryption failed"), Scalar::Float(0.5));
//! # let _ = exposed;
//! ```

mod crypto;
mod encoding;
mod encrypted;
mod error;
mod export;
mod keypair;
mod scalar;

pub use crypto::{Decrypt, Encrypt};
pub use encoding::{BASE, EncodedNumber, MAX_EXPONENT};
pub use encrypted::EncryptedNumber;
pub use error::*;
pub use export::{ExportedPrivateKey, ExportedPublicKey};
pub use keypair::{KeyPair, KeyPairBuilder, PrivateKey, PublicKey};
pub use scalar::Scalar;

pub use num_bigint_dig::{BigInt, BigUint};
