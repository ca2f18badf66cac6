// This file implements functionality from FIPS 204 section 7.5 `NTT` and `NTT^{-1}`

use crate::helpers::{full_reduce32, mont_reduce, ZETA_TABLE_MONT};
use crate::types::{R, T};
use crate::Q;


/// # Algorithm 41 NTT(w) on page 43.
/// Computes the Number-Theoretic Transform of each polynomial in a vector.
/// Zetas are held in Montgomery form, so the output stays in the plain domain.
///
/// **Input**: polynomials `w(X) = ∑_{j=0}^{255} w_j X^j ∈ R_q` with `|w_j| < q` <br>
/// **Output**: `w_hat = (w_hat[0], ... , w_hat[255]) ∈ T_q`, with `|w_hat[j]| < 9q`
pub(crate) fn ntt<const KL: usize>(w: &[R; KL]) -> [T; KL] {
    core::array::from_fn(|i| {
        let mut w_hat = T(w[i].0);
        ntt_poly(&mut w_hat.0);
        w_hat
    })
}


/// # Algorithm 42 NTT−1 (`w_hat`) on page 44.
/// Computes the inverse Number-Theoretic Transform of each polynomial in a vector.
///
/// **Input**: `w_hat = (w_hat[0], . . . , w_hat[255]) ∈ T_q` with `|w_hat[j]| < q` <br>
/// **Output**: polynomial `w(X) = ∑_{j=0}^{255} w_j X^j ∈ R_q` with `0 <= w_j < q`
pub(crate) fn inv_ntt<const KL: usize>(w_hat: &[T; KL]) -> [R; KL] {
    core::array::from_fn(|i| {
        let mut w = R(w_hat[i].0);
        inv_ntt_poly(&mut w.0);
        w
    })
}


// Cooley-Tukey butterflies, len = 128 down to 1
fn ntt_poly(w: &mut [i32; 256]) {
    let mut m = 0;
    let mut len = 128;
    while len >= 1 {
        for start in (0..256).step_by(2 * len) {
            m += 1;
            let zeta = i64::from(ZETA_TABLE_MONT[m]);
            for j in start..(start + len) {
                let t = mont_reduce(zeta * i64::from(w[j + len]));
                w[j + len] = w[j] - t;
                w[j] += t;
            }
        }
        len >>= 1;
    }
}


// Gentleman-Sande butterflies, len = 1 up to 128, then scale by 256^{-1}
fn inv_ntt_poly(w: &mut [i32; 256]) {
    // 256^{-1}·2^32 mod q, so the final Montgomery reduction leaves a plain value
    #[allow(clippy::cast_possible_truncation)]
    const F_MONT: i64 = (8_347_681_i128 << 32).rem_euclid(Q as i128) as i64;

    let mut m = 256;
    let mut len = 1;
    while len < 256 {
        for start in (0..256).step_by(2 * len) {
            m -= 1;
            let zeta = -i64::from(ZETA_TABLE_MONT[m]);
            for j in start..(start + len) {
                let t = w[j];
                w[j] = t + w[j + len];
                w[j + len] = mont_reduce(zeta * i64::from(t - w[j + len]));
            }
        }
        len <<= 1;
    }

    for coeff in w.iter_mut() {
        *coeff = full_reduce32(mont_reduce(F_MONT * i64::from(*coeff)));
    }
}
