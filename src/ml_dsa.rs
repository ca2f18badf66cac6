// This file implements functionality from FIPS 204 sections 5 and 6: key generation, signing
// and verification

use crate::encodings::{pk_decode, pk_encode, sig_decode, sig_encode, sk_decode, w1_encode};
use crate::error::Error;
use crate::hashing::{expand_a, expand_mask, expand_s, h_xof, hash_message, sample_in_ball};
use crate::helpers::{
    center_mod, ensure, full_reduce32, infinity_norm, mat_vec_mul, multiply_ntt, partial_reduce32,
    to_mont,
};
use crate::high_low::{high_bits, low_bits, make_hint, power2round, use_hint};
use crate::ntt::{inv_ntt, ntt};
use crate::types::{Ph, PrivateKey, PublicKey, R, T};
use crate::{
    BETA, D, GAMMA1, GAMMA2, K, L, LAMBDA_DIV4, MAX_SIGN_ATTEMPTS, OMEGA, PK_LEN, SIG_LEN, SK_LEN,
};
use rand_core::CryptoRngCore;
use sha3::digest::XofReader;
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

#[allow(clippy::cast_possible_truncation)]
const KAPPA_STEP: u16 = L as u16;


/// Algorithm 1: `ML-DSA.KeyGen()` on page 17.
/// Draws the 32-byte seed `ξ` from `rng` and derives a key pair from it.
///
/// # Errors
/// Returns an error when the random number generator fails.
pub(crate) fn key_gen(rng: &mut impl CryptoRngCore) -> Result<(PublicKey, PrivateKey), Error> {
    let mut xi = Zeroizing::new([0u8; 32]);
    rng.try_fill_bytes(&mut xi[..]).map_err(|_| Error::RandomSource)?;
    Ok(key_gen_internal(&xi))
}


/// Algorithm 6: `ML-DSA.KeyGen_internal(ξ)` on page 25.
/// Deterministically derives a key pair from the seed `ξ`.
pub(crate) fn key_gen_internal(xi: &[u8; 32]) -> (PublicKey, PrivateKey) {
    // 1: (ρ, ρ′, K) ← H(ξ || IntegerToBytes(k, 1) || IntegerToBytes(ℓ, 1), 128)
    let mut h1 = h_xof(&[xi, &[K.to_le_bytes()[0]], &[L.to_le_bytes()[0]]]);
    let mut rho = [0u8; 32];
    h1.read(&mut rho);
    let mut rho_prime = Zeroizing::new([0u8; 64]);
    h1.read(&mut rho_prime[..]);
    let mut cap_k = Zeroizing::new([0u8; 32]);
    h1.read(&mut cap_k[..]);

    // 3: A_hat ← ExpandA(ρ);  4: (s1, s2) ← ExpandS(ρ′)
    let cap_a_hat = expand_a(&rho);
    let s_1_s_2 = expand_s(&rho_prime);
    let (s_1, s_2) = &*s_1_s_2;

    // 5: t ← NTT−1(A_hat ◦ NTT(s1)) + s2;  6: (t1, t0) ← Power2Round(t)
    let s_1_hat = Zeroizing::new(ntt(s_1));
    let (t_1, t_0) = compute_t1_t0(&cap_a_hat, &s_1_hat, s_2);

    // 8: pk ← pkEncode(ρ, t1);  9: tr ← H(pk, 64)
    let pk_bytes = pk_encode(&rho, &t_1);
    let tr = hash_public_key(&pk_bytes);

    let pk = PublicKey { rho, t1: t_1, tr, t1_d2_hat_mont: t1_d2_hat_mont(&t_1) };
    let sk = PrivateKey {
        rho,
        cap_k: *cap_k,
        tr,
        s_1: *s_1,
        s_2: *s_2,
        t_0: *t_0,
        s_1_hat_mont: to_mont_vec(&*s_1_hat),
        s_2_hat_mont: to_mont_vec(&*Zeroizing::new(ntt(s_2))),
        t_0_hat_mont: to_mont_vec(&*Zeroizing::new(ntt(&*t_0))),
    };
    (pk, sk)
}


/// Builds the message representative `µ ← H(tr || M′, 64)`, where `M′` is the domain-separated
/// formatted message of Algorithm 2 (pure, `ph = None`) or Algorithm 4 (`HashML-DSA`).
///
/// # Errors
/// Returns an error when the context string exceeds 255 bytes.
pub(crate) fn message_representative(
    tr: &[u8; 64], message: &[u8], ctx: &[u8], ph: Option<Ph>,
) -> Result<[u8; 64], Error> {
    ensure!(ctx.len() < 256, Error::ContextTooLong { len: ctx.len() });
    let ctx_len = [ctx.len().to_le_bytes()[0]];
    let mut mu = [0u8; 64];
    match ph {
        // M′ ← 0 || |ctx| || ctx || M
        None => h_xof(&[tr, &[0u8], &ctx_len, ctx, message]).read(&mut mu),
        // M′ ← 1 || |ctx| || ctx || OID || PH(M)
        Some(ph) => {
            let mut phm = [0u8; 64];
            let (oid, phm_len) = hash_message(message, ph, &mut phm);
            h_xof(&[tr, &[1u8], &ctx_len, ctx, &oid, &phm[..phm_len]]).read(&mut mu);
        }
    }
    Ok(mu)
}


/// Algorithm 7: `ML-DSA.Sign_internal(sk, M′, rnd)` on page 25, starting from the message
/// representative `µ`. The private key already carries its NTT forms.
///
/// # Errors
/// Returns an error if the rejection loop exceeds `MAX_SIGN_ATTEMPTS` iterations.
pub(crate) fn sign_internal(
    esk: &PrivateKey, mu: &[u8; 64], rnd: &[u8; 32],
) -> Result<[u8; SIG_LEN], Error> {
    sign_internal_bounded(esk, mu, rnd, MAX_SIGN_ATTEMPTS)
}


// Rejection loop of `sign_internal` with an explicit iteration bound. Every intermediate that
// depends on the secret vectors or the mask `y` is held in `Zeroizing`.
#[allow(clippy::similar_names, clippy::many_single_char_names)]
fn sign_internal_bounded(
    esk: &PrivateKey, mu: &[u8; 64], rnd: &[u8; 32], max_attempts: u16,
) -> Result<[u8; SIG_LEN], Error> {
    // 5: A_hat ← ExpandA(ρ)
    let cap_a_hat = expand_a(&esk.rho);

    // 7: ρ″ ← H(K || rnd || µ, 64)
    let mut rho_pp = Zeroizing::new([0u8; 64]);
    h_xof(&[&esk.cap_k, rnd, mu]).read(&mut rho_pp[..]);

    // 8: κ ← 0
    let mut kappa = 0u16;

    for attempt in 1..=max_attempts {
        // 11: y ← ExpandMask(ρ″, κ)
        let y = expand_mask(&rho_pp, kappa);
        let y_hat = Zeroizing::new(ntt(&*y));

        // 12: w ← NTT−1(A_hat ◦ NTT(y));  13: w1 ← HighBits(w)
        let w: Zeroizing<[R; K]> = Zeroizing::new(inv_ntt(&mat_vec_mul(&cap_a_hat, &y_hat)));
        let w_1: [R; K] =
            core::array::from_fn(|k| R(core::array::from_fn(|n| high_bits(w[k].0[n]))));

        // 15: c_tilde ← H(µ || w1Encode(w1), λ/4);  16: c ← SampleInBall(c_tilde)
        let mut c_tilde = [0u8; LAMBDA_DIV4];
        h_xof(&[mu, &w1_encode(&w_1)]).read(&mut c_tilde);
        let c_hat: T = ntt(&[sample_in_ball(&c_tilde)])[0];

        // 18: ⟨⟨cs1⟩⟩ ← NTT−1(c_hat ◦ s1_hat);  19: ⟨⟨cs2⟩⟩ ← NTT−1(c_hat ◦ s2_hat)
        let c_s_1: Zeroizing<[R; L]> =
            Zeroizing::new(inv_ntt(&scale_vec(&c_hat, &esk.s_1_hat_mont)));
        let c_s_2: Zeroizing<[R; K]> =
            Zeroizing::new(inv_ntt(&scale_vec(&c_hat, &esk.s_2_hat_mont)));

        // 20: z ← y + ⟨⟨cs1⟩⟩;  21: r0 ← LowBits(w − ⟨⟨cs2⟩⟩)
        let z: Zeroizing<[R; L]> = Zeroizing::new(core::array::from_fn(|l| {
            R(core::array::from_fn(|n| partial_reduce32(y[l].0[n] + c_s_1[l].0[n])))
        }));
        let r0: Zeroizing<[R; K]> = Zeroizing::new(core::array::from_fn(|k| {
            R(core::array::from_fn(|n| low_bits(w[k].0[n] - c_s_2[k].0[n])))
        }));

        // 31: κ ← κ + ℓ
        kappa += KAPPA_STEP;

        // 23: if ||z||∞ ≥ γ1 − β or ||r0||∞ ≥ γ2 − β then (z, h) ← ⊥
        if (infinity_norm(&*z) >= GAMMA1 - BETA) | (infinity_norm(&*r0) >= GAMMA2 - BETA) {
            continue;
        }

        // 25: ⟨⟨ct0⟩⟩ ← NTT−1(c_hat ◦ t0_hat)
        let c_t_0: Zeroizing<[R; K]> =
            Zeroizing::new(inv_ntt(&scale_vec(&c_hat, &esk.t_0_hat_mont)));

        // 26: h ← MakeHint(−⟨⟨ct0⟩⟩, w − ⟨⟨cs2⟩⟩ + ⟨⟨ct0⟩⟩)
        let h: [R; K] = core::array::from_fn(|k| {
            R(core::array::from_fn(|n| {
                let r = w[k].0[n] - c_s_2[k].0[n] + c_t_0[k].0[n];
                i32::from(make_hint(-c_t_0[k].0[n], r))
            }))
        });

        // 28: if ||⟨⟨ct0⟩⟩||∞ ≥ γ2 or the number of 1's in h is greater than ω, then (z, h) ← ⊥
        let ones: usize = h.iter().map(|h_i| h_i.0.iter().filter(|&&e| e == 1).count()).sum();
        if (infinity_norm(&*c_t_0) >= GAMMA2) | (ones > OMEGA) {
            continue;
        }

        // 33: σ ← sigEncode(c_tilde, z mod± q, h)
        let z_mod_pm: [R; L] = core::array::from_fn(|l| {
            R(core::array::from_fn(|n| center_mod(full_reduce32(z[l].0[n]))))
        });
        trace!(attempts = attempt, "signature found");
        return Ok(sig_encode(&c_tilde, &z_mod_pm, &h));
    }

    warn!(attempts = max_attempts, "signing rejection loop exhausted");
    Err(Error::SigningFailed { attempts: max_attempts })
}


/// Algorithm 8: `ML-DSA.Verify_internal(pk, M′, σ)` on page 27, starting from the message
/// representative `µ`. Every failure mode is reported as `false`.
#[allow(clippy::similar_names)]
pub(crate) fn verify_internal(epk: &PublicKey, mu: &[u8; 64], sig: &[u8; SIG_LEN]) -> bool {
    // 2: (c_tilde, z, h) ← sigDecode(σ);  3: if h = ⊥ then return false
    let Ok((c_tilde, z, h)) = sig_decode(sig) else {
        debug!("signature rejected: malformed hint encoding");
        return false;
    };

    // 13 (first term): ||z||∞ < γ1 − β, checked early as it is cheap
    if infinity_norm(&z) >= GAMMA1 - BETA {
        debug!("signature rejected: response norm out of bounds");
        return false;
    }

    // 5: A_hat ← ExpandA(ρ);  8: c ← SampleInBall(c_tilde)
    let cap_a_hat = expand_a(&epk.rho);
    let c_hat: T = ntt(&[sample_in_ball(&c_tilde)])[0];

    // 9: w′_Approx ← NTT−1(A_hat ◦ NTT(z) − NTT(c) ◦ NTT(t1·2^d))
    let az_hat: [T; K] = mat_vec_mul(&cap_a_hat, &ntt(&z));
    let ct1_hat: [T; K] = scale_vec(&c_hat, &epk.t1_d2_hat_mont);
    let wp_approx: [R; K] = inv_ntt(&core::array::from_fn(|k| {
        T(core::array::from_fn(|n| partial_reduce32(az_hat[k].0[n] - ct1_hat[k].0[n])))
    }));

    // 10: w′1 ← UseHint(h, w′_Approx)
    let wp_1: [R; K] = core::array::from_fn(|k| {
        R(core::array::from_fn(|n| use_hint(h[k].0[n] == 1, wp_approx[k].0[n])))
    });

    // 12: c_tilde′ ← H(µ || w1Encode(w′1), λ/4);  13: return [[c_tilde = c_tilde′]]
    let mut c_tilde_p = [0u8; LAMBDA_DIV4];
    h_xof(&[mu, &w1_encode(&wp_1)]).read(&mut c_tilde_p);
    let valid = c_tilde == c_tilde_p;
    if !valid {
        debug!("signature rejected: commitment hash mismatch");
    }
    valid
}


/// Decodes and expands a public key, precomputing `tr` and `NTT(t1·2^d)` in Montgomery form.
///
/// # Errors
/// Returns an error on a malformed public key.
pub(crate) fn expand_public(pk: &[u8; PK_LEN]) -> Result<PublicKey, Error> {
    let (rho, t_1) = pk_decode(pk)?;
    Ok(PublicKey { rho, t1: t_1, tr: hash_public_key(pk), t1_d2_hat_mont: t1_d2_hat_mont(&t_1) })
}


/// Decodes and expands a private key, precomputing the NTT forms used in signing.
///
/// # Errors
/// Returns an error on a malformed private key.
pub(crate) fn expand_private(sk: &[u8; SK_LEN]) -> Result<PrivateKey, Error> {
    let decoded = Zeroizing::new(sk_decode(sk)?);
    let (rho, cap_k, tr, s_1, s_2, t_0) = &*decoded;
    Ok(PrivateKey {
        rho: *rho,
        cap_k: *cap_k,
        tr: *tr,
        s_1: *s_1,
        s_2: *s_2,
        t_0: *t_0,
        s_1_hat_mont: to_mont_vec(&*Zeroizing::new(ntt(s_1))),
        s_2_hat_mont: to_mont_vec(&*Zeroizing::new(ntt(s_2))),
        t_0_hat_mont: to_mont_vec(&*Zeroizing::new(ntt(t_0))),
    })
}


/// Recomputes the public key from the private key via `t = A·s1 + s2`.
pub(crate) fn public_from_private(esk: &PrivateKey) -> PublicKey {
    let cap_a_hat = expand_a(&esk.rho);
    let s_1_hat = Zeroizing::new(ntt(&esk.s_1));
    let (t_1, _t_0) = compute_t1_t0(&cap_a_hat, &s_1_hat, &esk.s_2);
    let pk_bytes = pk_encode(&esk.rho, &t_1);
    PublicKey {
        rho: esk.rho,
        t1: t_1,
        tr: hash_public_key(&pk_bytes),
        t1_d2_hat_mont: t1_d2_hat_mont(&t_1),
    }
}


/// Encodes a public key.
pub(crate) fn encode_public(epk: &PublicKey) -> [u8; PK_LEN] { pk_encode(&epk.rho, &epk.t1) }


/// Encodes a private key.
pub(crate) fn encode_private(esk: &PrivateKey) -> [u8; SK_LEN] {
    crate::encodings::sk_encode(&esk.rho, &esk.cap_k, &esk.tr, &esk.s_1, &esk.s_2, &esk.t_0)
}


// `t = NTT−1(A_hat ◦ s1_hat) + s2`, fully reduced then split by Power2Round
#[allow(clippy::needless_range_loop)]
fn compute_t1_t0(
    cap_a_hat: &[[T; L]; K], s_1_hat: &[T; L], s_2: &[R; K],
) -> ([R; K], Zeroizing<[R; K]>) {
    let as1: Zeroizing<[R; K]> = Zeroizing::new(inv_ntt(&mat_vec_mul(cap_a_hat, s_1_hat)));
    let mut t_1 = [crate::types::R0; K];
    let mut t_0 = Zeroizing::new([crate::types::R0; K]);
    for k in 0..K {
        for n in 0..256 {
            let (r1, r0) = power2round(full_reduce32(as1[k].0[n] + s_2[k].0[n]));
            t_1[k].0[n] = r1;
            t_0[k].0[n] = r0;
        }
    }
    (t_1, t_0)
}


// tr ← H(pk, 64)
fn hash_public_key(pk: &[u8; PK_LEN]) -> [u8; 64] {
    let mut tr = [0u8; 64];
    h_xof(&[pk]).read(&mut tr);
    tr
}


// NTT(t1·2^d) in Montgomery form, used by every verification
fn t1_d2_hat_mont(t_1: &[R; K]) -> [T; K] {
    let t1_d2: [R; K] = core::array::from_fn(|k| R(core::array::from_fn(|n| t_1[k].0[n] << D)));
    to_mont_vec(&ntt(&t1_d2))
}


fn to_mont_vec<const N: usize>(v_hat: &[T; N]) -> [T; N] {
    core::array::from_fn(|i| T(core::array::from_fn(|n| to_mont(v_hat[i].0[n]))))
}


// Pointwise `c_hat ◦ v_hat[i]` for each element of a Montgomery-form vector
fn scale_vec<const N: usize>(c_hat: &T, v_hat_mont: &[T; N]) -> [T; N] {
    core::array::from_fn(|i| multiply_ntt(c_hat, &v_hat_mont[i]))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::is_in_range;
    use crate::types::R0;
    use zeroize::Zeroize;

    #[test]
    fn test_keygen_deterministic_and_consistent() {
        let (pk1, sk1) = key_gen_internal(&[7u8; 32]);
        let (pk2, sk2) = key_gen_internal(&[7u8; 32]);
        assert!(pk1 == pk2);
        assert!(sk1 == sk2);
        assert!(public_from_private(&sk1) == pk1);
        assert!(sk1.t_0.iter().all(|t| is_in_range(t, (1 << 12) - 1, 1 << 12)));
        assert!(pk1.t1.iter().all(|t| is_in_range(t, 0, 1023)));
    }

    #[test]
    fn test_expand_roundtrip() {
        let (pk, sk) = key_gen_internal(&[8u8; 32]);
        let pk2 = expand_public(&encode_public(&pk)).unwrap();
        let sk2 = expand_private(&encode_private(&sk)).unwrap();
        assert!(pk == pk2);
        assert!(sk == sk2);
        assert_eq!(sk2.s_1_hat_mont, sk.s_1_hat_mont);
        assert_eq!(sk2.t_0_hat_mont, sk.t_0_hat_mont);
    }

    #[test]
    fn test_sign_verify_internal() {
        let (pk, sk) = key_gen_internal(&[9u8; 32]);
        let mu = message_representative(&pk.tr, b"internal", &[], None).unwrap();
        let sig = sign_internal(&sk, &mu, &[0u8; 32]).unwrap();
        assert!(verify_internal(&pk, &mu, &sig));
        let mu2 = message_representative(&pk.tr, b"internal", b"ctx", None).unwrap();
        assert!(!verify_internal(&pk, &mu2, &sig));
        // deterministic for fixed rnd
        assert_eq!(sign_internal(&sk, &mu, &[0u8; 32]).unwrap(), sig);
        assert_ne!(sign_internal(&sk, &mu, &[1u8; 32]).unwrap(), sig);
    }

    #[test]
    fn test_message_representative_domains() {
        let tr = [5u8; 64];
        let pure = message_representative(&tr, b"m", &[], None).unwrap();
        let hashed = message_representative(&tr, b"m", &[], Some(Ph::SHA256)).unwrap();
        assert_ne!(pure, hashed);
        assert!(message_representative(&tr, b"m", &[0u8; 255], None).is_ok());
        assert_eq!(
            message_representative(&tr, b"m", &[0u8; 256], None),
            Err(Error::ContextTooLong { len: 256 })
        );
    }

    #[test]
    fn test_sign_attempt_bound() {
        let (pk, sk) = key_gen_internal(&[12u8; 32]);
        let mu = message_representative(&pk.tr, b"bounded", &[], None).unwrap();
        assert_eq!(
            sign_internal_bounded(&sk, &mu, &[0u8; 32], 0),
            Err(Error::SigningFailed { attempts: 0 })
        );

        // A single attempt yields either the unbounded signature or an error, nothing partial
        let (mut accepted, mut exhausted) = (0, 0);
        for i in 0u8..64 {
            let rnd = [i; 32];
            match sign_internal_bounded(&sk, &mu, &rnd, 1) {
                Ok(sig) => {
                    assert_eq!(sig, sign_internal(&sk, &mu, &rnd).unwrap());
                    accepted += 1;
                }
                Err(err) => {
                    assert_eq!(err, Error::SigningFailed { attempts: 1 });
                    assert!(verify_internal(&pk, &mu, &sign_internal(&sk, &mu, &rnd).unwrap()));
                    exhausted += 1;
                }
            }
        }
        assert!(accepted > 0);
        assert!(exhausted > 0);
    }

    #[test]
    fn test_secret_intermediates_wipe() {
        let (_pk, sk) = key_gen_internal(&[13u8; 32]);
        let (_t_1, mut t_0) = compute_t1_t0(&expand_a(&sk.rho), &ntt(&sk.s_1), &sk.s_2);
        assert_eq!(*t_0, sk.t_0);
        t_0.zeroize();
        assert!(t_0.iter().all(|p| *p == R0));

        let mut s_1_s_2 = expand_s(&[14u8; 64]);
        assert!(s_1_s_2.0.iter().any(|p| *p != R0));
        s_1_s_2.zeroize();
        assert!(s_1_s_2.0.iter().chain(&s_1_s_2.1).all(|p| *p == R0));
    }
}
