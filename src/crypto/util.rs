// Copyright 2025 Nelson Dominguez
// SPDX-License-Identifier: MIT OR Apache-2.0

use num_bigint_dig::{BigUint, ModInverse, RandBigInt};
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use crate::error::{Error, Result};

/// L(u) = (u - 1) / n
///
/// Only defined when `u ≡ 1 (mod n)`, which holds for `u = c^λ mod n²` whenever
/// `c` is a unit modulo `n²`. Anything else means `c` was not produced under
/// this key.
#[inline]
pub fn l_function(u: &BigUint, n: &BigUint) -> Result<BigUint> {
    if u.is_zero() {
        return Err(Error::MalformedCiphertext("c^λ mod n² is zero".into()));
    }

    let u_minus_1 = u - BigUint::one();
    if !(&u_minus_1 % n).is_zero() {
        return Err(Error::MalformedCiphertext("c^λ mod n² is not congruent to 1 mod n".into()));
    }

    Ok(u_minus_1 / n)
}

/// Computes the modular inverse a⁻¹ mod m, if it exists.
pub fn mod_inverse<'i>(a: &'i BigUint, m: &'i BigUint) -> Option<BigUint> {
    a.mod_inverse(m)?.to_biguint()
}

/// Samples `r` uniformly with `1 < r < n`.
///
/// `gen_biguint_range` rejection-samples internally, so the result is
/// unbiased.
pub fn random_lt_n<R: RngCore + CryptoRng>(n: &BigUint, rng: &mut R) -> BigUint {
    rng.gen_biguint_range(&BigUint::from(2u32), n)
}

/// r^n mod n², the factor that masks a ciphertext.
#[inline]
pub fn obfuscator(r: &BigUint, n: &BigUint, nsquare: &BigUint) -> BigUint {
    r.modpow(n, nsquare)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn l_function_divides_exactly() {
        let n = BigUint::from(35u32);
        let u = BigUint::from(1u32 + 3 * 35);
        assert_eq!(l_function(&u, &n).unwrap(), BigUint::from(3u32));
    }

    #[test]
    fn l_function_rejects_non_unit_remainder() {
        let n = BigUint::from(35u32);
        let u = BigUint::from(37u32);
        assert!(matches!(l_function(&u, &n), Err(Error::MalformedCiphertext(_))));
        assert!(matches!(l_function(&BigUint::zero(), &n), Err(Error::MalformedCiphertext(_))));
    }

    #[test]
    fn mod_inverse_of_non_unit_is_none() {
        let m = BigUint::from(35u32);
        assert_eq!(mod_inverse(&BigUint::from(3u32), &m), Some(BigUint::from(12u32)));
        assert_eq!(mod_inverse(&BigUint::from(7u32), &m), None);
    }

    #[test]
    fn random_values_stay_in_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let n = BigUint::from(11u32);
        for _ in 0..200 {
            let r = random_lt_n(&n, &mut rng);
            assert!(r > BigUint::one() && r < n);
        }
    }
}
