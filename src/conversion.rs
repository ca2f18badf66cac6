// This file implements functionality from FIPS 204 section 7.1 Conversion Between Data Types

use crate::helpers::{bit_length, is_in_range};
use crate::types::{R, R0};
use crate::{K, OMEGA, Q};


// Algorithms 9 through 12 (`IntegerToBits`, `BitsToInteger`, `BitsToBytes`, `BytesToBits`) are
// folded into the pack and unpack routines below, which work directly on bytes.


/// # Algorithm 14: `CoeffFromThreeBytes(b0,b1,b2)` on page 29.
/// Generates an element of `{0, 1, 2, ... , q − 1} ∪ {⊥}` used in rejection sampling.
/// Only operates on the public `rho`, so need not be constant-time.
///
/// **Input**:  A byte array of length three, representing bytes `b0`, `b1`, `b2`.<br>
/// **Output**: An integer modulo `q` or `⊥` (returned as `None`).
pub(crate) fn coef_from_three_bytes(bbb: [u8; 3]) -> Option<i32> {
    // Set the top bit of b2 to zero
    let bbb2 = i32::from(bbb[2] & 0x7F);
    let z = (bbb2 << 16) | (i32::from(bbb[1]) << 8) | i32::from(bbb[0]);
    (z < Q).then_some(z)
}


/// # Algorithm 15: `CoeffFromHalfByte(b)` on page 30, for `η = 4`.
/// Generates an element of `{−η, −η + 1, ... , η} ∪ {⊥}` used in rejection sampling.
///
/// **Input**:  Integer `b ∈ {0, 1, ... , 15}`. <br>
/// **Output**: An integer between `−4` and `4`, or `⊥` (returned as `None`).
pub(crate) fn coef_from_half_byte(b: u8) -> Option<i32> {
    debug_assert!(b < 16, "Alg 15: b out of range");
    (b < 9).then(|| 4 - i32::from(b))
}


/// # Algorithm 16: `SimpleBitPack(w,b)` on page 30.
/// Encodes a polynomial `w` with coefficients in `[0, b]` into `32·bitlen(b)` bytes.
pub(crate) fn simple_bit_pack(w: &R, b: i32, bytes_out: &mut [u8]) {
    debug_assert!(is_in_range(w, 0, b), "Alg 16: w out of range");
    bit_pack(w, 0, b, bytes_out);
}


/// # Algorithm 17: `BitPack(w,a,b)` on page 30.
/// Encodes a polynomial `w` with coefficients in `[−a, b]` into `32·bitlen(a + b)` bytes,
/// storing `b − w_i` (or `w_i` when `a = 0`) least-significant bit first.
pub(crate) fn bit_pack(w: &R, a: i32, b: i32, bytes_out: &mut [u8]) {
    debug_assert!(
        (0..1 << 20).contains(&a) & (1..1 << 20).contains(&b),
        "Alg 17: a, b out of range"
    );
    debug_assert_eq!(w.0.len() * bit_length(a + b), bytes_out.len() * 8, "Alg 17: bad output size");

    let bitlen = bit_length(a + b);
    let mut temp = 0u32; // new values enter at the top, output bytes leave from the bottom
    let mut byte_index = 0;
    let mut bit_index = 0;

    #[allow(clippy::cast_sign_loss)]
    for coeff in w.0 {
        let value = if a > 0 { b - coeff } else { coeff };
        temp |= (value as u32) << bit_index;
        bit_index += bitlen;
        while bit_index > 7 {
            bytes_out[byte_index] = temp.to_le_bytes()[0];
            temp >>= 8;
            byte_index += 1;
            bit_index -= 8;
        }
    }
}


/// # Algorithm 18: `SimpleBitUnpack(v,b)` on page 31.
/// Reverses `SimpleBitPack`. Returns `None` when a coefficient exceeds `b`.
pub(crate) fn simple_bit_unpack(v: &[u8], b: i32) -> Option<R> { bit_unpack(v, 0, b) }


/// # Algorithm 19: `BitUnpack(v,a,b)` on page 31.
/// Reverses `BitPack`. Takes untrusted input via key and signature decoding, so every
/// coefficient is checked to lie in `[−a, b]`; returns `None` otherwise.
pub(crate) fn bit_unpack(v: &[u8], a: i32, b: i32) -> Option<R> {
    let w_out = bit_unpack_unchecked(v, a, b);
    is_in_range(&w_out, a, b).then_some(w_out)
}


/// `BitUnpack` without the range check, for callers where `a + b + 1` is a power of two so
/// that every bit pattern decodes into `[−a, b]`.
pub(crate) fn bit_unpack_unchecked(v: &[u8], a: i32, b: i32) -> R {
    debug_assert!(
        (0..1 << 20).contains(&a) & (1..1 << 20).contains(&b),
        "Alg 19: a, b out of range"
    );
    debug_assert_eq!(v.len(), 32 * bit_length(a + b), "Alg 19: bad input size");

    let bitlen = bit_length(a + b);
    let mask = (1i32 << bitlen) - 1;
    let mut w_out = R0;
    let mut temp = 0i32;
    let mut r_index = 0;
    let mut bit_index = 0;

    for byte in v {
        temp |= i32::from(*byte) << bit_index;
        bit_index += 8;
        while bit_index >= bitlen {
            let tmask = temp & mask;
            // choice fixed by parameter, so CT
            w_out.0[r_index] = if a == 0 { tmask } else { b - tmask };
            bit_index -= bitlen;
            temp >>= bitlen;
            r_index += 1;
        }
    }
    w_out
}


/// # Algorithm 20: `HintBitPack(h)` on page 32.
/// Encodes a vector `h ∈ R^k_2` with at most `ω` ones into `ω + k` bytes: the indices of the
/// nonzero coefficients, followed by the running index count after each polynomial.
/// Only produces the public signature, so need not be constant-time.
pub(crate) fn hint_bit_pack(h: &[R; K], y_bytes: &mut [u8]) {
    debug_assert_eq!(y_bytes.len(), OMEGA + K, "Alg 20: bad output size");
    debug_assert!(h.iter().all(|r| is_in_range(r, 0, 1)), "Alg 20: h not 0/1");

    y_bytes.fill(0);
    let mut index = 0;
    for (i, poly) in h.iter().enumerate() {
        for (j, &coeff) in poly.0.iter().enumerate() {
            if coeff != 0 {
                y_bytes[index] = j.to_le_bytes()[0];
                index += 1;
            }
        }
        y_bytes[OMEGA + i] = index.to_le_bytes()[0];
    }
}


/// # Algorithm 21: `HintBitUnpack(y)` on page 32.
/// Reverses `HintBitPack`, returning `⊥` (as `None`) for any non-canonical encoding:
/// decreasing or out-of-range counts, indices not strictly increasing within a
/// polynomial, or nonzero padding.
pub(crate) fn hint_bit_unpack(y_bytes: &[u8]) -> Option<[R; K]> {
    debug_assert_eq!(y_bytes.len(), OMEGA + K, "Alg 21: bad input size");

    let mut h = [R0; K];
    let mut index = 0;
    for (i, poly) in h.iter_mut().enumerate() {
        let end = usize::from(y_bytes[OMEGA + i]);
        if (end < index) | (end > OMEGA) {
            return None;
        }
        let first = index;
        while index < end {
            if (index > first) && (y_bytes[index - 1] >= y_bytes[index]) {
                return None;
            }
            poly.0[usize::from(y_bytes[index])] = 1;
            index += 1;
        }
    }

    y_bytes[index..OMEGA].iter().all(|&b| b == 0).then_some(h)
}
