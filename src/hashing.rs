// This file implements functionality from FIPS 204 section 7.3 Pseudorandom Sampling

use crate::conversion::{bit_unpack_unchecked, coef_from_half_byte, coef_from_three_bytes};
use crate::helpers::{is_in_range, to_mont};
use crate::types::{Ph, R, R0, T, T0};
use crate::{GAMMA1, K, L, TAU};
use sha2::{Digest, Sha256, Sha512};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::{Shake128, Shake256};
use zeroize::{Zeroize, Zeroizing};

const SHAKE128_RATE: usize = 168;
const SHAKE256_RATE: usize = 136;


/// # Function H(v,d) on page 14.
/// Takes a reference to a list of byte-slice references and runs them through Shake256.
/// Returns a xof reader for extracting extendable output.
pub(crate) fn h_xof(v: &[&[u8]]) -> impl XofReader {
    let mut hasher = Shake256::default();
    v.iter().for_each(|b| hasher.update(b));
    hasher.finalize_xof()
}


/// # Function `G(v,d)` on page 14.
/// Takes a reference to a list of byte-slice references and runs them through Shake128.
/// Returns a xof reader for extracting extendable output.
pub(crate) fn h128_xof(v: &[&[u8]]) -> impl XofReader {
    let mut hasher = Shake128::default();
    v.iter().for_each(|b| hasher.update(b));
    hasher.finalize_xof()
}


/// # Algorithm 29: `SampleInBall(ρ)` on page 36.
/// Samples a polynomial `c ∈ Rq` with coefficients from `{−1, 0, 1}` and Hamming weight `τ`.
/// Operates on the public `c_tilde`, so need not be constant-time.
///
/// **Input**: A seed `ρ ∈ B^{λ/4}` <br>
/// **Output**: A polynomial `c` in `Rq`.
pub(crate) fn sample_in_ball(rho: &[u8]) -> R {
    let mut c = R0;
    let mut h_ctx = h_xof(&[rho]);

    // The first 8 bytes supply the sign bits
    let mut h = [0u8; 8];
    h_ctx.read(&mut h);
    let signs = u64::from_le_bytes(h);

    for i in (256 - TAU)..256 {
        let mut j = [0u8];
        h_ctx.read(&mut j);
        while usize::from(j[0]) > i {
            h_ctx.read(&mut j);
        }
        let j = usize::from(j[0]);
        c.0[i] = c.0[j];
        let bit = (signs >> (i + TAU - 256)) & 1;
        // bit is 0 or 1, so the sign is +1 or -1
        c.0[j] = 1 - 2 * i32::from(bit == 1);
    }
    c
}


/// # Algorithm 30: `RejNTTPoly(ρ)` on page 37.
/// Samples a polynomial `∈ Tq` by rejection on SHAKE128 output, three bytes per candidate.
///
/// **Input**: A seed `ρ ∈ B^{34}` supplied as a list of byte slices. <br>
/// **Output**: An element `a_hat ∈ Tq` with coefficients in `[0, q)`.
pub(crate) fn rej_ntt_poly(rhos: &[&[u8]]) -> T {
    let mut a_hat = T0;
    let mut xof = h128_xof(rhos);
    let mut block = [0u8; SHAKE128_RATE];
    let mut j = 0;
    while j < 256 {
        xof.read(&mut block);
        for bbb in block.chunks_exact(3) {
            if j == 256 {
                break;
            }
            if let Some(coeff) = coef_from_three_bytes([bbb[0], bbb[1], bbb[2]]) {
                a_hat.0[j] = coeff;
                j += 1;
            }
        }
    }
    a_hat
}


/// # Algorithm 31: `RejBoundedPoly(ρ)` on page 37.
/// Samples a polynomial with coefficients in `[−η, η]` by rejection on SHAKE256 output,
/// taking the low then the high half of each byte.
///
/// **Input**: A seed `ρ ∈ B^{66}` supplied as a list of byte slices. <br>
/// **Output**: A polynomial `a ∈ Rq`.
pub(crate) fn rej_bounded_poly(rhos: &[&[u8]]) -> R {
    let mut a = R0;
    let mut xof = h_xof(rhos);
    let mut block = [0u8; SHAKE256_RATE];
    let mut j = 0;
    while j < 256 {
        xof.read(&mut block);
        for z in block {
            for half in [z & 0x0F, z >> 4] {
                if j < 256 {
                    if let Some(coeff) = coef_from_half_byte(half) {
                        a.0[j] = coeff;
                        j += 1;
                    }
                }
            }
        }
    }
    a
}


/// # Algorithm 32: `ExpandA(ρ)` on page 38.
/// Samples a `k × ℓ` matrix `A_hat` of elements of `T_q`, returned in Montgomery form
/// so pointwise products against plain NTT vectors reduce back to the plain domain.
///
/// **Input**: `ρ ∈ B^{32}`. <br>
/// **Output**: Matrix `A_hat ∈ (T_q)^{k×ℓ}`.
#[allow(clippy::cast_possible_truncation)] // r and s < 256
pub(crate) fn expand_a(rho: &[u8; 32]) -> [[T; L]; K] {
    core::array::from_fn(|r| {
        core::array::from_fn(|s| {
            let a_hat = rej_ntt_poly(&[&rho[..], &[s as u8], &[r as u8]]);
            T(core::array::from_fn(|n| to_mont(a_hat.0[n])))
        })
    })
}


/// # Algorithm 33: `ExpandS(ρ)` on page 38.
/// Samples the secret vectors `s1 ∈ R^ℓ` and `s2 ∈ R^k`, each coefficient in `[−η, η]`.
///
/// **Input**: `ρ′ ∈ B^{64}`. <br>
/// **Output**: Vectors `s1`, `s2` of polynomials in `Rq`, wiped when dropped.
#[allow(clippy::cast_possible_truncation)] // r < 65536
pub(crate) fn expand_s(rho_prime: &[u8; 64]) -> Zeroizing<([R; L], [R; K])> {
    let mut s = Zeroizing::new(([R0; L], [R0; K]));
    let (s1, s2) = &mut *s;
    for (r, poly) in s1.iter_mut().chain(s2.iter_mut()).enumerate() {
        *poly = rej_bounded_poly(&[rho_prime, &(r as u16).to_le_bytes()]);
    }
    debug_assert!(s.0.iter().chain(&s.1).all(|r| is_in_range(r, crate::ETA, crate::ETA)));
    s
}


/// # Algorithm 34: `ExpandMask(ρ,µ)` on page 38.
/// Samples the masking vector `y ∈ R^ℓ` with coefficients in `[−γ1 + 1, γ1]`.
///
/// **Input**: A seed `ρ″ ∈ B^{64}` and a non-negative counter `κ`. <br>
/// **Output**: Vector `y ∈ R^ℓ_q`, wiped when dropped.
#[allow(clippy::cast_possible_truncation)] // r < L
pub(crate) fn expand_mask(rho_pp: &[u8; 64], kappa: u16) -> Zeroizing<[R; L]> {
    let mut y = Zeroizing::new([R0; L]);
    let mut v = [0u8; 32 * 20];
    for (r, poly) in y.iter_mut().enumerate() {
        let n = kappa + r as u16;
        let mut xof = h_xof(&[rho_pp, &n.to_le_bytes()]);
        xof.read(&mut v);
        // γ1 is a power of 2, so all 20-bit patterns land in [−γ1 + 1, γ1]
        *poly = bit_unpack_unchecked(&v, GAMMA1 - 1, GAMMA1);
        debug_assert!(is_in_range(poly, GAMMA1 - 1, GAMMA1));
    }
    v.zeroize();
    y
}


/// Pre-hashes `message` for `HashML-DSA`, writing the digest into `phm`. Returns the DER
/// encoding of the hash function OID and the digest length.
pub(crate) fn hash_message(message: &[u8], ph: Ph, phm: &mut [u8; 64]) -> ([u8; 11], usize) {
    const OID_PREFIX: [u8; 10] = [0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02];
    let (last, len) = match ph {
        Ph::SHA256 => {
            phm[0..32].copy_from_slice(&Sha256::digest(message));
            (0x01, 32)
        }
        Ph::SHA512 => {
            phm.copy_from_slice(&Sha512::digest(message));
            (0x03, 64)
        }
        Ph::SHAKE128 => {
            h128_xof(&[message]).read(&mut phm[0..32]);
            (0x0B, 32)
        }
        Ph::SHAKE256 => {
            h_xof(&[message]).read(phm);
            (0x0C, 64)
        }
    };
    let mut oid = [0u8; 11];
    oid[..10].copy_from_slice(&OID_PREFIX);
    oid[10] = last;
    (oid, len)
}
