// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use num_bigint_dig::prime::probably_prime;
use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::One;
use rand::{CryptoRng, RngCore};

use crate::error::{Error, Result};

/// Miller-Rabin rounds applied to every prime candidate.
pub(crate) const MILLER_RABIN_ROUNDS: usize = 20;

/// Candidates drawn per requested bit before giving up.
///
/// The density of primes among odd `k`-bit numbers is about `2 / (k ln 2)`,
/// so this leaves a vanishing chance of a spurious failure.
const CANDIDATES_PER_BIT: usize = 64;

/// Generates a random prime of exactly `bits` bits.
///
/// Rejection sampling: draw a random odd candidate whose two top bits are set
/// and test it with Miller-Rabin, retrying until one passes. Setting both top
/// bits guarantees that the product of a `k`-bit and an `l`-bit prime has
/// exactly `k + l` bits.
pub fn generate_prime<R: RngCore + CryptoRng>(bits: usize, rng: &mut R) -> Result<BigUint> {
    if bits < 3 {
        return Err(Error::KeyGeneration(format!("cannot generate a {bits}-bit prime")));
    }

    for _ in 0..bits * CANDIDATES_PER_BIT {
        let candidate = generate_candidate(bits, rng);
        if probably_prime(&candidate, MILLER_RABIN_ROUNDS) {
            return Ok(candidate);
        }
    }

    Err(Error::KeyGeneration(format!("no {bits}-bit prime found within the attempt limit")))
}

/// Random candidate with its two most significant bits and its lowest bit set.
#[inline]
fn generate_candidate<R: RngCore + CryptoRng>(bits: usize, rng: &mut R) -> BigUint {
    let mut candidate = rng.gen_biguint(bits);

    candidate |= BigUint::one() << (bits - 1);
    candidate |= BigUint::one() << (bits - 2);
    candidate |= BigUint::one();

    candidate
}
