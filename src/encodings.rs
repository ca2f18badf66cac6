// This file implements functionality from FIPS 204 section 7.2 Encodings of ML-DSA Keys and
// Signatures

use crate::conversion::{
    bit_pack, bit_unpack, hint_bit_pack, hint_bit_unpack, simple_bit_pack, simple_bit_unpack,
};
use crate::error::{Component, Error};
use crate::helpers::is_in_range;
use crate::types::{R, R0};
use crate::{D, ETA, GAMMA1, GAMMA2, K, L, LAMBDA_DIV4, PK_LEN, Q, SIG_LEN, SK_LEN, W1_LEN};

// Per-polynomial byte widths
const T1_STEP: usize = 320; // 32·(bitlen(q−1) − d)
const ETA_STEP: usize = 128; // 32·bitlen(2η)
const T0_STEP: usize = 416; // 32·d
const Z_STEP: usize = 640; // 32·(1 + bitlen(γ1 − 1))
const W1_STEP: usize = 128; // 32·bitlen((q − 1)/(2γ2) − 1)

const T1_MAX: i32 = (1 << 10) - 1;
const T0_TOP: i32 = 1 << (D - 1);


/// # Algorithm 22: `pkEncode(ρ,t1)` on page 33.
/// Encodes a public key into `PK_LEN` bytes; `t1` coefficients lie in `[0, 2^10 − 1]`.
pub(crate) fn pk_encode(rho: &[u8; 32], t1: &[R; K]) -> [u8; PK_LEN] {
    debug_assert!(t1.iter().all(|t| is_in_range(t, 0, T1_MAX)), "Alg 22: t1 out of range");
    let mut pk = [0u8; PK_LEN];
    pk[0..32].copy_from_slice(rho);
    for (t, chunk) in t1.iter().zip(pk[32..].chunks_exact_mut(T1_STEP)) {
        simple_bit_pack(t, T1_MAX, chunk);
    }
    pk
}


/// # Algorithm 23: `pkDecode(pk)` on page 33.
/// Reverses `pkEncode`. Every 10-bit pattern is a valid `t1` coefficient, so with the length
/// fixed by the type this cannot fail in practice; the check is kept for untrusted input.
///
/// # Errors
/// Returns an error when a decoded coefficient of `t1` is out of range.
pub(crate) fn pk_decode(pk: &[u8; PK_LEN]) -> Result<([u8; 32], [R; K]), Error> {
    let mut rho = [0u8; 32];
    rho.copy_from_slice(&pk[0..32]);
    let mut t1 = [R0; K];
    for (t, chunk) in t1.iter_mut().zip(pk[32..].chunks_exact(T1_STEP)) {
        *t = simple_bit_unpack(chunk, T1_MAX)
            .ok_or(Error::InvalidCoefficients { component: Component::PublicKey })?;
    }
    Ok((rho, t1))
}


/// # Algorithm 24: `skEncode(ρ,K,tr,s1,s2,t0)` on page 34.
/// Encodes a private key into `SK_LEN` bytes: `ρ || K || tr || s1 || s2 || t0`.
pub(crate) fn sk_encode(
    rho: &[u8; 32], cap_k: &[u8; 32], tr: &[u8; 64], s1: &[R; L], s2: &[R; K], t0: &[R; K],
) -> [u8; SK_LEN] {
    debug_assert!(s1.iter().chain(s2).all(|x| is_in_range(x, ETA, ETA)), "Alg 24: s out of range");
    debug_assert!(
        t0.iter().all(|x| is_in_range(x, T0_TOP - 1, T0_TOP)),
        "Alg 24: t0 out of range"
    );

    let mut sk = [0u8; SK_LEN];
    sk[0..32].copy_from_slice(rho);
    sk[32..64].copy_from_slice(cap_k);
    sk[64..128].copy_from_slice(tr);

    let (s_bytes, t0_bytes) = sk[128..].split_at_mut((L + K) * ETA_STEP);
    for (s, chunk) in s1.iter().chain(s2).zip(s_bytes.chunks_exact_mut(ETA_STEP)) {
        bit_pack(s, ETA, ETA, chunk);
    }
    for (t, chunk) in t0.iter().zip(t0_bytes.chunks_exact_mut(T0_STEP)) {
        bit_pack(t, T0_TOP - 1, T0_TOP, chunk);
    }
    sk
}


/// # Algorithm 25: `skDecode(sk)` on page 34.
/// Reverses `skEncode`. Takes untrusted input via deserialization.
///
/// # Errors
/// Returns an error when a decoded coefficient of `s1` or `s2` falls outside `[−η, η]`.
#[allow(clippy::type_complexity)]
pub(crate) fn sk_decode(
    sk: &[u8; SK_LEN],
) -> Result<([u8; 32], [u8; 32], [u8; 64], [R; L], [R; K], [R; K]), Error> {
    const BAD: Error = Error::InvalidCoefficients { component: Component::SecretKey };
    let mut rho = [0u8; 32];
    let mut cap_k = [0u8; 32];
    let mut tr = [0u8; 64];
    rho.copy_from_slice(&sk[0..32]);
    cap_k.copy_from_slice(&sk[32..64]);
    tr.copy_from_slice(&sk[64..128]);

    let (s_bytes, t0_bytes) = sk[128..].split_at((L + K) * ETA_STEP);
    let mut s = [R0; L + K];
    for (poly, chunk) in s.iter_mut().zip(s_bytes.chunks_exact(ETA_STEP)) {
        *poly = bit_unpack(chunk, ETA, ETA).ok_or(BAD)?;
    }
    let mut t0 = [R0; K];
    for (poly, chunk) in t0.iter_mut().zip(t0_bytes.chunks_exact(T0_STEP)) {
        *poly = bit_unpack(chunk, T0_TOP - 1, T0_TOP).ok_or(BAD)?;
    }

    let s1 = core::array::from_fn(|i| s[i]);
    let s2 = core::array::from_fn(|i| s[L + i]);
    Ok((rho, cap_k, tr, s1, s2, t0))
}


/// # Algorithm 26: `sigEncode(c_tilde,z,h)` on page 35.
/// Encodes a signature into `SIG_LEN` bytes; `z` coefficients must lie in `[−γ1 + 1, γ1]`.
pub(crate) fn sig_encode(c_tilde: &[u8; LAMBDA_DIV4], z: &[R; L], h: &[R; K]) -> [u8; SIG_LEN] {
    debug_assert!(
        z.iter().all(|x| is_in_range(x, GAMMA1 - 1, GAMMA1)),
        "Alg 26: z out of range"
    );
    let mut sigma = [0u8; SIG_LEN];
    sigma[..LAMBDA_DIV4].copy_from_slice(c_tilde);
    let (z_bytes, h_bytes) = sigma[LAMBDA_DIV4..].split_at_mut(L * Z_STEP);
    for (poly, chunk) in z.iter().zip(z_bytes.chunks_exact_mut(Z_STEP)) {
        bit_pack(poly, GAMMA1 - 1, GAMMA1, chunk);
    }
    hint_bit_pack(h, h_bytes);
    sigma
}


/// # Algorithm 27: `sigDecode(σ)` on page 35.
/// Reverses `sigEncode`. Used in verification with untrusted input.
///
/// # Errors
/// Returns an error when the hint portion is not a canonical `HintBitPack` output.
#[allow(clippy::type_complexity)]
pub(crate) fn sig_decode(
    sigma: &[u8; SIG_LEN],
) -> Result<([u8; LAMBDA_DIV4], [R; L], [R; K]), Error> {
    const BAD: Error = Error::InvalidCoefficients { component: Component::Signature };
    let mut c_tilde = [0u8; LAMBDA_DIV4];
    c_tilde.copy_from_slice(&sigma[..LAMBDA_DIV4]);
    let (z_bytes, h_bytes) = sigma[LAMBDA_DIV4..].split_at(L * Z_STEP);
    let mut z = [R0; L];
    for (poly, chunk) in z.iter_mut().zip(z_bytes.chunks_exact(Z_STEP)) {
        // always in range, as γ1 is a power of 2
        *poly = bit_unpack(chunk, GAMMA1 - 1, GAMMA1).ok_or(BAD)?;
    }
    let h = hint_bit_unpack(h_bytes).ok_or(BAD)?;
    Ok((c_tilde, z, h))
}


/// # Algorithm 28: `w1Encode(w1)` on page 35.
/// Packs `w1` (coefficients in `[0, 15]`) into `W1_LEN` bytes for hashing.
pub(crate) fn w1_encode(w1: &[R; K]) -> [u8; W1_LEN] {
    const W1_MAX: i32 = (Q - 1) / (2 * GAMMA2) - 1;
    let mut w1_tilde = [0u8; W1_LEN];
    for (poly, chunk) in w1.iter().zip(w1_tilde.chunks_exact_mut(W1_STEP)) {
        simple_bit_pack(poly, W1_MAX, chunk);
    }
    w1_tilde
}
