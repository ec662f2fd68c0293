// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;
use std::str::FromStr;

use num_bigint_dig::{BigInt, BigUint, Sign};
use num_traits::{Num, ToPrimitive};

use crate::error::{Error, Result};

/// An application value that can be encoded for encryption.
///
/// This is the only place where native numbers, big integers and decimal
/// strings enter the crate. Integers are encoded exactly with exponent 0;
/// floats are encoded at the precision of their binary representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(BigInt),
    Float(f64),
}

impl Scalar {
    /// Return the integer value, if this is an integer.
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Scalar::Int(i) => Some(i),
            Scalar::Float(_) => None,
        }
    }

    /// Return the value as `i64` when it is an integer that fits.
    pub fn to_i64(&self) -> Option<i64> {
        self.as_int().and_then(ToPrimitive::to_i64)
    }

    /// Convert to the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        match self {
            Scalar::Int(i) => crate::encoding::big_to_f64(i, 0),
            Scalar::Float(f) => *f,
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(value: $t) -> Self {
                    Scalar::Int(BigInt::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<BigInt> for Scalar {
    fn from(value: BigInt) -> Self {
        Scalar::Int(value)
    }
}

impl From<&BigInt> for Scalar {
    fn from(value: &BigInt) -> Self {
        Scalar::Int(value.clone())
    }
}

impl From<BigUint> for Scalar {
    fn from(value: BigUint) -> Self {
        Scalar::Int(BigInt::from_biguint(Sign::Plus, value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Scalar::Float(f64::from(value))
    }
}

impl FromStr for Scalar {
    type Err = Error;

    /// Parses a decimal integer, falling back to a decimal float.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(i) = BigInt::from_str_radix(trimmed, 10) {
            return Ok(Scalar::Int(i));
        }

        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Scalar::Float(f)),
            _ => Err(Error::InvalidNumber(s.to_owned())),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
        }
    }
}
