// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-point encoding of signed integers and floats into `[0, n)`.
//!
//! A value `v` is stored as `(mantissa, exponent)` with
//! `v ≈ mantissa · 16^exponent`. Negative mantissas wrap to the top of the
//! modular domain, so `-1` is stored as `n - 1`. Values whose encoding falls
//! between `max_int` and `n - max_int` cannot come out of [`EncodedNumber::encode`]
//! and are reported as overflow when decoding.

use num_bigint_dig::{BigInt, BigUint, Sign};
use num_traits::{Float, One, Signed, ToPrimitive, Zero};

use crate::error::{Error, Result};
use crate::keypair::PublicKey;
use crate::scalar::Scalar;

/// Base of the exponent. Larger bases leak less through the exponent.
pub const BASE: u32 = 16;

const LOG2_BASE: i64 = 4;

/// Significand bits of an IEEE-754 double, including the implicit bit.
const FLOAT_MANTISSA_BITS: i64 = 53;

/// Largest exponent magnitude accepted anywhere. Native floats stay within
/// a few hundred; the bound keeps decoding shifts and products finite.
pub const MAX_EXPONENT: i32 = 1 << 20;

/// A signed integer or float encoded for a particular public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedNumber {
    public_key: PublicKey,
    encoding: BigUint,
    exponent: i32,
}

impl EncodedNumber {
    /// Wrap an already encoded value.
    ///
    /// `encoding` must be below `n`.
    pub fn new(public_key: PublicKey, encoding: BigUint, exponent: i32) -> Result<Self> {
        if &encoding >= public_key.n() {
            return Err(Error::InvalidNumber(format!("encoding {encoding} is not below n")));
        }
        let exponent = check_exponent(i64::from(exponent))?;

        Ok(Self { public_key, encoding, exponent })
    }

    /// Encode a value at the precision it natively carries.
    pub fn encode<S: Into<Scalar>>(public_key: &PublicKey, value: S) -> Result<Self> {
        Self::encode_with(public_key, value, None, None)
    }

    /// Encode a value with an optional precision and an upper bound on the
    /// exponent.
    ///
    /// - integers without `precision` use exponent 0;
    /// - floats without `precision` use the exponent of their least
    ///   significant mantissa bit, so no bits are lost;
    /// - `precision` selects `floor(log16(precision))`;
    /// - `max_exponent` caps the result, which lets values share an exponent
    ///   before being added.
    pub fn encode_with<S: Into<Scalar>>(
        public_key: &PublicKey,
        value: S,
        precision: Option<f64>,
        max_exponent: Option<i32>,
    ) -> Result<Self> {
        let scalar = value.into();

        let exponent = match (precision, &scalar) {
            (Some(precision), _) => precision_exponent(precision)?,
            (None, Scalar::Int(_)) => 0,
            (None, Scalar::Float(f)) => float_exponent(*f)?,
        };
        let exponent = max_exponent.map_or(exponent, |max| exponent.min(max));
        let exponent = check_exponent(i64::from(exponent))?;

        // int_rep = round(value · 16^-exponent), computed exactly
        let scale = -LOG2_BASE * i64::from(exponent);
        let int_rep = match scalar {
            Scalar::Int(i) => round_shift(i, scale),
            Scalar::Float(f) => {
                if !f.is_finite() {
                    return Err(Error::NonFiniteScalar);
                }
                let (mantissa, exp2, sign) = f.integer_decode();
                let mut m = BigInt::from(mantissa);
                if sign < 0 {
                    m = -m;
                }
                round_shift(m, i64::from(exp2) + scale)
            }
        };

        let (sign, magnitude) = split_sign(&int_rep);
        if &magnitude > public_key.max_int() {
            return Err(Error::EncodingRange { max_int: public_key.max_int().clone() });
        }

        let encoding = if sign == Sign::Minus { public_key.n() - magnitude } else { magnitude };

        Ok(Self { public_key: public_key.clone(), encoding, exponent })
    }

    /// Recover the encoded value.
    ///
    /// Non-negative exponents yield [`Scalar::Int`], negative ones
    /// [`Scalar::Float`].
    pub fn decode(&self) -> Result<Scalar> {
        let mantissa = self.mantissa()?;

        if self.exponent >= 0 {
            let shift = LOG2_BASE * i64::from(self.exponent);
            Ok(Scalar::Int(round_shift(mantissa, shift)))
        } else {
            Ok(Scalar::Float(big_to_f64(&mantissa, LOG2_BASE * i64::from(self.exponent))))
        }
    }

    /// The signed integer this encoding stands for.
    pub fn mantissa(&self) -> Result<BigInt> {
        let n = self.public_key.n();
        let max_int = self.public_key.max_int();

        if &self.encoding <= max_int {
            Ok(BigInt::from_biguint(Sign::Plus, self.encoding.clone()))
        } else if self.public_key.is_negative(&self.encoding) {
            Ok(-BigInt::from_biguint(Sign::Plus, n - &self.encoding))
        } else {
            Err(Error::Overflow)
        }
    }

    /// Re-encode with a smaller exponent, keeping the value.
    ///
    /// The encoding is multiplied by `16^(exponent - new_exponent)`, so the
    /// result may overflow; that surfaces when decoding.
    pub fn decrease_exponent_to(&self, new_exponent: i32) -> Result<Self> {
        if new_exponent > self.exponent {
            return Err(Error::ExponentMismatch {
                current: self.exponent,
                requested: new_exponent,
            });
        }
        let new_exponent = check_exponent(i64::from(new_exponent))?;

        let factor = rescale_factor(self.exponent, new_exponent, self.public_key.n());
        let encoding = (&self.encoding * factor) % self.public_key.n();

        Ok(Self { public_key: self.public_key.clone(), encoding, exponent: new_exponent })
    }

    /// Return the public key this number is encoded for.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Return the encoded value in `[0, n)`.
    pub fn encoding(&self) -> &BigUint {
        &self.encoding
    }

    /// Return the base-16 exponent.
    pub fn exponent(&self) -> i32 {
        self.exponent
    }
}

/// 16^(from - to) mod n for `to <= from`.
///
/// Reducing mod n keeps the plaintext for both encodings and ciphertexts,
/// since a ciphertext raised to `k` and to `k mod n` decrypts the same.
pub(crate) fn rescale_factor(from: i32, to: i32, n: &BigUint) -> BigUint {
    let diff = (i64::from(from) - i64::from(to)).unsigned_abs();
    BigUint::from(BASE).modpow(&BigUint::from(diff), n)
}

/// Narrow an exponent to `i32`, rejecting anything beyond [`MAX_EXPONENT`].
pub(crate) fn check_exponent(exponent: i64) -> Result<i32> {
    if exponent.unsigned_abs() > MAX_EXPONENT.unsigned_abs() as u64 {
        return Err(Error::ExponentRange { exponent, limit: MAX_EXPONENT });
    }
    Ok(exponent as i32)
}

/// floor(log16(precision)).
fn precision_exponent(precision: f64) -> Result<i32> {
    if !precision.is_finite() || precision <= 0.0 {
        return Err(Error::InvalidNumber(format!("precision {precision}")));
    }

    // log2 is exact on powers of two, so powers of 16 land on integers.
    Ok((precision.log2() / LOG2_BASE as f64).floor() as i32)
}

/// Base-16 exponent of the least significant mantissa bit of `value`.
fn float_exponent(value: f64) -> Result<i32> {
    if !value.is_finite() {
        return Err(Error::NonFiniteScalar);
    }

    let (mantissa, exp2, _) = value.integer_decode();
    // frexp exponent: value = m · 2^e with 0.5 <= |m| < 1, and 0 for zero
    let bin_flt_exponent = if mantissa == 0 {
        0
    } else {
        i64::from(exp2) + i64::from(64 - mantissa.leading_zeros())
    };
    let bin_lsb_exponent = bin_flt_exponent - FLOAT_MANTISSA_BITS;

    Ok(bin_lsb_exponent.div_euclid(LOG2_BASE) as i32)
}

/// value · 2^shift, rounded half to even when `shift` is negative.
fn round_shift(value: BigInt, shift: i64) -> BigInt {
    if shift >= 0 {
        return value << shift as usize;
    }

    let k = shift.unsigned_abs() as usize;
    let magnitude = value.abs();
    let mut quotient = &magnitude >> k;
    let remainder = &magnitude - (&quotient << k);
    let half = BigInt::one() << (k - 1);

    let odd = !(&quotient % BigInt::from(2u32)).is_zero();
    if remainder > half || (remainder == half && odd) {
        quotient += BigInt::one();
    }

    if value.is_negative() { -quotient } else { quotient }
}

fn split_sign(value: &BigInt) -> (Sign, BigUint) {
    let (sign, bytes) = value.to_bytes_be();
    (sign, BigUint::from_bytes_be(&bytes))
}

/// value · 2^pow2 as the nearest `f64`.
///
/// Only the top 64 bits of `value` take part, plus a sticky bit standing in
/// for everything below them, so the final cast rounds once.
pub(crate) fn big_to_f64(value: &BigInt, pow2: i64) -> f64 {
    let (sign, magnitude) = split_sign(value);
    let dropped = magnitude.bits().saturating_sub(64);
    let mut top = (&magnitude >> dropped).to_u64().unwrap_or(u64::MAX);
    if dropped > 0 && !(&magnitude - (BigUint::from(top) << dropped)).is_zero() {
        top |= 1;
    }

    let result = ldexp(top as f64, pow2 + dropped as i64);
    if sign == Sign::Minus { -result } else { result }
}

/// x · 2^exp, scaling in steps so intermediate powers stay representable.
fn ldexp(mut x: f64, mut exp: i64) -> f64 {
    const STEP: i64 = 1000;

    while exp > STEP && x.is_finite() && x != 0.0 {
        x *= 2f64.powi(STEP as i32);
        exp -= STEP;
    }
    while exp < -STEP && x != 0.0 {
        x *= 2f64.powi(-STEP as i32);
        exp += STEP;
    }

    x * 2f64.powi(exp as i32)
}
