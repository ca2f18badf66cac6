// This file implements functionality from FIPS 204 section 7.4 High Order / Low Order Bits and
// Hints

use crate::helpers::full_reduce32;
use crate::{D, GAMMA2, Q};


/// Algorithm 35: `Power2Round(r)` on page 40.
/// Decomposes `r` into `(r1, r0)` such that `r ≡ r1*2^d + r0 mod q`.
///
/// Input: `r ∈ Zq` with `0 <= r < q`. <br>
/// Output: Integers `(r1, r0)` with `-2^{d-1} < r0 <= 2^{d-1}`.
pub(crate) const fn power2round(r: i32) -> (i32, i32) {
    let r1 = (r + (1 << (D - 1)) - 1) >> D;
    (r1, r - (r1 << D))
}


/// Algorithm 36: `Decompose(r)` on page 40, specialized for `γ2 = (q − 1)/32`.
/// Decomposes `r` into `(r1, r0)` such that `r ≡ r1(2γ2) + r0 mod q`, with `0 <= r1 < 16`.
/// Branch-free; the `q − 1` corner case folds into `r1 = 0, r0 = −1`.
///
/// Input: `r ∈ Z` (reduced mod q internally) <br>
/// Output: Integers `(r1, r0)`.
pub(crate) const fn decompose(r: i32) -> (i32, i32) {
    let rp = full_reduce32(r);
    let mut r1 = (rp + 127) >> 7;
    r1 = (r1 * 1025 + (1 << 21)) >> 22;
    r1 &= 15;
    let mut r0 = rp - r1 * 2 * GAMMA2;
    r0 -= (((Q - 1) / 2 - r0) >> 31) & Q;
    (r1, r0)
}


/// Algorithm 37: `HighBits(r)` on page 40.
pub(crate) const fn high_bits(r: i32) -> i32 { decompose(r).0 }


/// Algorithm 38: `LowBits(r)` on page 41.
pub(crate) const fn low_bits(r: i32) -> i32 { decompose(r).1 }


/// Algorithm 39: `MakeHint(z, r)` on page 41.
/// Compute hint bit indicating whether adding `z` to `r` alters the high bits of `r`.
pub(crate) const fn make_hint(z: i32, r: i32) -> bool { high_bits(r) != high_bits(r + z) }


/// Algorithm 40: `UseHint(h, r)` on page 41.
/// Returns the high bits of `r` adjusted according to hint `h`, in `0..16`.
pub(crate) const fn use_hint(h: bool, r: i32) -> i32 {
    let (r1, r0) = decompose(r);
    if !h {
        r1
    } else if r0 > 0 {
        (r1 + 1) & 15
    } else {
        (r1 - 1) & 15
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::{RngCore, SeedableRng};

    // Straight-line version of Decompose from the standard
    fn decompose_reference(r: i32) -> (i32, i32) {
        let rp = r.rem_euclid(Q);
        let mut r0 = rp.rem_euclid(2 * GAMMA2);
        if r0 > GAMMA2 {
            r0 -= 2 * GAMMA2;
        }
        if rp - r0 == Q - 1 {
            (0, r0 - 1)
        } else {
            ((rp - r0) / (2 * GAMMA2), r0)
        }
    }

    #[test]
    fn test_power2round() {
        for r in [0, 1, 4095, 4096, 4097, 8191, 8192, Q - 1] {
            let (r1, r0) = power2round(r);
            assert_eq!(r1 * (1 << D) + r0, r);
            assert!((-(1 << (D - 1)) < r0) & (r0 <= (1 << (D - 1))));
        }
    }

    #[test]
    fn test_decompose_matches_reference() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(31);
        let edges =
            [0, 1, GAMMA2, GAMMA2 + 1, 2 * GAMMA2, Q - GAMMA2, Q - GAMMA2 - 1, Q - 2, Q - 1];
        for r in edges.into_iter().chain((0..20_000).map(|_| (rng.next_u32() % 8_380_417) as i32)) {
            assert_eq!(decompose(r), decompose_reference(r), "r = {r}");
            assert_eq!(high_bits(r), decompose_reference(r).0);
            assert_eq!(low_bits(r), decompose_reference(r).1);
        }
        assert_eq!(decompose(Q - 1), (0, -1));
        assert_eq!(decompose(-1), decompose(Q - 1));
    }

    #[test]
    fn test_hint_recovers_high_bits() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(32);
        for _i in 0..20_000 {
            let r = (rng.next_u32() % 8_380_417) as i32;
            let z = (rng.next_u32() % (2 * GAMMA2 as u32 + 1)) as i32 - GAMMA2;
            let h = make_hint(z, r);
            assert_eq!(use_hint(h, r), high_bits(r + z));
        }
    }
}
