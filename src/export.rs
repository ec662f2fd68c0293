// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decimal-string forms of keys, as exchanged in JSON.
//!
//! A public key travels as `{"g": "...", "n": "..."}` and a private key as
//! `{"lambda": "...", "mu": "..."}`. The private form does not embed its
//! public key; the receiver supplies it again when rebuilding.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::keypair::{PrivateKey, PublicKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPublicKey {
    pub g: String,
    pub n: String,
}

impl From<PublicKey> for ExportedPublicKey {
    fn from(key: PublicKey) -> Self {
        key.to_exported()
    }
}

impl TryFrom<ExportedPublicKey> for PublicKey {
    type Error = Error;

    fn try_from(exported: ExportedPublicKey) -> Result<Self> {
        PublicKey::from_decimal(&exported.g, &exported.n)
    }
}

#[allow(missing_debug_implementations)]
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[cfg_attr(feature = "expose-secret", derive(Debug))]
pub struct ExportedPrivateKey {
    pub lambda: String,
    pub mu: String,
}

impl ExportedPrivateKey {
    /// Rebuild the private key against its public key.
    pub fn to_private_key(&self, public_key: PublicKey) -> Result<PrivateKey> {
        PrivateKey::from_decimal(public_key, &self.lambda, &self.mu)
    }
}

impl PublicKey {
    /// Return the decimal-string form of this key.
    pub fn to_exported(&self) -> ExportedPublicKey {
        ExportedPublicKey { g: self.g().to_str_radix(10), n: self.n().to_str_radix(10) }
    }
}

impl PrivateKey {
    /// Return the decimal-string form of `lambda` and `mu`.
    pub fn to_exported(&self) -> ExportedPrivateKey {
        ExportedPrivateKey { lambda: self.lambda.to_str_radix(10), mu: self.mu.to_str_radix(10) }
    }
}
