use crate::types::{R, T};
use crate::{K, L, Q, ZETA};


/// If the condition is not met, return the given error. Borrowed from the `anyhow` crate.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use ensure; // make available throughout crate


/// Ensure polynomial w is within -lo to +hi (inclusive)
pub(crate) fn is_in_range(w: &R, lo: i32, hi: i32) -> bool {
    w.0.iter().all(|&e| (e >= -lo) & (e <= hi))
}


/// Bit length required to express `a` in bits
#[allow(clippy::cast_sign_loss)]
pub(crate) const fn bit_length(a: i32) -> usize { a.ilog2() as usize + 1 }


/// Montgomery reduction: for `|a| < q·2^31` returns `a·2^{-32} mod q` with `|result| < q`.
#[allow(clippy::cast_possible_truncation)]
#[inline(always)]
#[allow(clippy::inline_always)]
pub(crate) const fn mont_reduce(a: i64) -> i32 {
    const QINV: i32 = 58_728_449; // q^{-1} mod 2^32
    let t = (a as i32).wrapping_mul(QINV);
    ((a - (t as i64) * (Q as i64)) >> 32) as i32
}


/// Reduce 32-bit value mod q ---> `-6283009 <= result <= 6283008`.
/// Requires `a <= 2^31 - 2^22 - 1`.
#[inline(always)]
#[allow(clippy::inline_always)]
pub(crate) const fn partial_reduce32(a: i32) -> i32 {
    let x = (a + (1 << 22)) >> 23; // +2^22 ensures quotient is never 'too low'
    a - x * Q
}


/// Reduce 32-bit value mod q ---> `0 <= result < q`, without branching.
#[inline(always)]
#[allow(clippy::inline_always)]
pub(crate) const fn full_reduce32(a: i32) -> i32 {
    let x = partial_reduce32(a);
    x + ((x >> 31) & Q)
}


/// Mod +/- for `0 <= a < q`: the unique representative in `(-q/2, q/2]`, see page 6.
#[inline(always)]
#[allow(clippy::inline_always)]
pub(crate) const fn center_mod(a: i32) -> i32 { a - ((((Q - 1) / 2 - a) >> 31) & Q) }


/// Multiplies by `2^64 mod q` then Montgomery reduces, giving `a·2^32 mod q`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn to_mont(a: i32) -> i32 {
    const R2: i64 = ((1i128 << 64) % (Q as i128)) as i64;
    mont_reduce(a as i64 * R2)
}


/// Infinity norm of a polynomial vector, with each coefficient first taken mod± q.
pub(crate) fn infinity_norm<const N: usize>(w: &[R; N]) -> i32 {
    w.iter()
        .flat_map(|poly| poly.0.iter())
        .map(|&e| center_mod(full_reduce32(e)).abs())
        .max()
        .unwrap_or(0)
}


/// Pointwise product of two NTT-domain polynomials, where one carries a Montgomery factor,
/// so the result is in the plain NTT domain. See Algorithm 45 `MultiplyNTT`.
pub(crate) fn multiply_ntt(a_hat: &T, b_hat: &T) -> T {
    T(core::array::from_fn(|n| mont_reduce(i64::from(a_hat.0[n]) * i64::from(b_hat.0[n]))))
}


/// Matrix by vector multiplication; See top of page 10, first row: `w_hat` = `A_hat` mul `u_hat`.
/// `A_hat` is in Montgomery form so the result is in the plain NTT domain, partially reduced.
#[must_use]
pub(crate) fn mat_vec_mul(a_hat: &[[T; L]; K], u_hat: &[T; L]) -> [T; K] {
    let mut w_hat = [crate::types::T0; K];
    for (row, w_poly) in a_hat.iter().zip(w_hat.iter_mut()) {
        for (a_poly, u_poly) in row.iter().zip(u_hat) {
            let prod = multiply_ntt(a_poly, u_poly);
            for (w, p) in w_poly.0.iter_mut().zip(prod.0) {
                *w += p;
            }
        }
        for w in &mut w_poly.0 {
            *w = partial_reduce32(*w);
        }
    }
    w_hat
}


/// HAC Algorithm 14.76 Right-to-left binary exponentiation mod Q.
#[must_use]
const fn pow_mod_q(g: i32, e: u8) -> i64 {
    let mut result = 1i64;
    let mut s = g as i64;
    let mut e = e;
    while e != 0 {
        if e & 1 != 0 {
            result = (result * s).rem_euclid(Q as i64);
        };
        e >>= 1;
        if e != 0 {
            s = (s * s).rem_euclid(Q as i64);
        };
    }
    result
}


/// Builds `ζ^{BitRev8(i)}·2^32 mod± q` for the Montgomery-form butterflies.
#[allow(clippy::cast_possible_truncation)]
const fn gen_zeta_table_mont() -> [i32; 256] {
    let mut result = [0i32; 256];
    let mut i = 0;
    while i < 256 {
        let z = (pow_mod_q(ZETA, (i as u8).reverse_bits()) << 32).rem_euclid(Q as i64) as i32;
        result[i] = center_mod(z);
        i += 1;
    }
    result
}

pub(crate) static ZETA_TABLE_MONT: [i32; 256] = gen_zeta_table_mont();
