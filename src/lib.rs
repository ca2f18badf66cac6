#![no_std]
#![deny(clippy::pedantic, warnings, missing_docs, unsafe_code)]
// Almost all of the 'allow' category...
#![deny(absolute_paths_not_starting_with_crate, dead_code)]
#![deny(elided_lifetimes_in_paths, explicit_outlives_requirements, keyword_idents)]
#![deny(let_underscore_drop, macro_use_extern_crate, meta_variable_misuse, missing_abi)]
#![deny(non_ascii_idents, rust_2021_incompatible_closure_captures)]
#![deny(rust_2021_incompatible_or_patterns, rust_2021_prefixes_incompatible_syntax)]
#![deny(rust_2021_prelude_collisions, single_use_lifetimes, trivial_casts)]
#![deny(trivial_numeric_casts, unreachable_pub, unsafe_op_in_unsafe_fn, unstable_features)]
#![deny(unused_extern_crates, unused_import_braces, unused_lifetimes, unused_macro_rules)]
#![deny(unused_qualifications, unused_results, variant_size_differences)]
//
#![doc = include_str!("../README.md")]

#[cfg(test)]
extern crate std;


// Implements the ML-DSA-65 parameter set of the FIPS 204 Module-Lattice-Based Digital Signature
// Standard.
// See <https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.204.pdf>

// Functionality map per FIPS 204
//
// Algorithm 1 ML-DSA.KeyGen() on page 17                   --> lib.rs to ml_dsa.rs
// Algorithm 2 ML-DSA.Sign(sk,M,ctx) on page 18             --> lib.rs to ml_dsa.rs
// Algorithm 3 ML-DSA.Verify(pk,M,s,ctx) on page 18         --> lib.rs to ml_dsa.rs
// Algorithm 4 HashML-DSA.Sign(sk,M,ctx,PH) on page 20      --> lib.rs, M′ built in ml_dsa.rs
// Algorithm 5 HashML-DSA.Verify(sk,M,s,ctx,PH) on page 21  --> lib.rs, M′ built in ml_dsa.rs
// Algorithm 6 ML-DSA.KeyGen_internal(x) on page 23         --> ml_dsa.rs
// Algorithm 7 ML-DSA.Sign_internal(sk,M',rnd) on page 25   --> ml_dsa.rs
// Algorithm 8 ML-DSA.Verify_internal(pk,M',s) on page 27   --> ml_dsa.rs
// Algorithms 9-13 bit/byte/integer conversions             --> folded into conversion.rs
// Algorithms 14-21 coefficient sampling, packing, hints    --> conversion.rs
// Algorithms 22-28 key, signature and w1 encodings         --> encodings.rs
// Algorithms 29-34 SampleInBall, RejNTTPoly, Expand*       --> hashing.rs
// Algorithms 35-40 Power2Round, Decompose, hints           --> high_low.rs
// Algorithms 41-42 NTT and its inverse                     --> ntt.rs
// Algorithm 43 BitRev8(m) on page 44                       --> folded into the zeta table
// Algorithms 44-48 NTT-domain arithmetic                   --> helpers.rs, ml_dsa.rs
// Algorithm 49 MontgomeryReduce(a) on page 50              --> helpers.rs
// Types are in types.rs, traits are in traits.rs, errors are in error.rs

// Note that debug_assert! statements enforce correct program construction and are not involved
// in any operational dataflow. The ensure! statements implement dataflow validation and do
// not panic.

/// The `rand_core` types are re-exported so that users of mldsa65 do not
/// have to worry about using the exact correct version of `rand_core`.
pub use rand_core::{CryptoRng, Error as RngError, RngCore};

mod conversion;
mod encodings;
mod error;
mod hashing;
mod helpers;
mod high_low;
mod ml_dsa;
mod ntt;
mod types;

/// All functionality is covered by traits, such that consumers can utilize trait objects as
/// desired.
pub mod traits;
pub use crate::error::{Component, Error};
pub use crate::types::{Ph, PrivateKey, PublicKey, Signature};

use crate::traits::{KeyGen, SerDes, Signer, Verifier};
use rand_core::CryptoRngCore;
use tracing::{debug, instrument};
use zeroize::Zeroizing;


// FIPS 204 Table 1, ML-DSA-65 row
const Q: i32 = 8_380_417; // 2^23 - 2^13 + 1 = 0x7FE001
const ZETA: i32 = 1753; // 512th root of unity mod q
const D: i32 = 13; // dropped bits from t
const TAU: usize = 49; // number of ±1's in c
const LAMBDA: usize = 192; // collision strength of c_tilde
const GAMMA1: i32 = 1 << 19; // coefficient range of y
const GAMMA2: i32 = (Q - 1) / 32; // low-order rounding range
const K: usize = 6; // rows of A
const L: usize = 5; // columns of A
const ETA: i32 = 4; // private key range
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const BETA: i32 = TAU as i32 * ETA;
const OMEGA: usize = 55; // max number of 1's in the hint h

const LAMBDA_DIV4: usize = LAMBDA / 4;
const W1_LEN: usize = 32 * K * helpers::bit_length((Q - 1) / (2 * GAMMA2) - 1);

/// Public key length in bytes.
pub const PK_LEN: usize = 32 + 32 * K * 10;
/// Private (secret) key length in bytes.
pub const SK_LEN: usize = 128 + 32 * ((K + L) * 4 + 13 * K);
/// Signature length in bytes.
pub const SIG_LEN: usize = LAMBDA_DIV4 + L * 32 * 20 + OMEGA + K;
/// Key generation seed (`ξ`) length in bytes.
pub const SEED_LEN: usize = 32;
/// Signing randomness (`rnd`) length in bytes.
pub const RND_LEN: usize = 32;
/// Upper bound on rejection-sampling iterations while signing. Each iteration succeeds with
/// probability of about 1/5, so the bound is only reached with probability below 2^-256.
pub const MAX_SIGN_ATTEMPTS: u16 = 814;


/// Empty struct to enable `KeyGen` trait objects. Implements the [`crate::traits::KeyGen`] trait.
#[derive(Clone, Copy, Debug, Default)]
pub struct KG;

impl KeyGen for KG {
    type PublicKey = PublicKey;
    type PrivateKey = PrivateKey;

    #[instrument(level = "debug", skip_all)]
    fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<(PublicKey, PrivateKey), Error> {
        ml_dsa::key_gen(rng)
    }

    #[instrument(level = "debug", skip_all)]
    fn keygen_from_seed(xi: &[u8; SEED_LEN]) -> (PublicKey, PrivateKey) {
        ml_dsa::key_gen_internal(xi)
    }
}


impl Signer for PrivateKey {
    type Signature = Signature;
    type PublicKey = PublicKey;

    // Algorithm 2 in the hedged form: rnd ← {0,1}^256
    fn try_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8],
    ) -> Result<Signature, Error> {
        let mut rnd = Zeroizing::new([0u8; RND_LEN]);
        rng.try_fill_bytes(&mut rnd[..]).map_err(|_| Error::RandomSource)?;
        self.try_sign_with_seed(&rnd, message, ctx)
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(message_len = message.len(), context_len = ctx.len())
    )]
    fn try_sign_with_seed(
        &self, rnd: &[u8; RND_LEN], message: &[u8], ctx: &[u8],
    ) -> Result<Signature, Error> {
        let mu = ml_dsa::message_representative(&self.tr, message, ctx, None)?;
        ml_dsa::sign_internal(self, &mu, rnd).map(Signature)
    }

    // Algorithm 4 in the hedged form
    fn try_hash_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8], ph: &Ph,
    ) -> Result<Signature, Error> {
        let mut rnd = Zeroizing::new([0u8; RND_LEN]);
        rng.try_fill_bytes(&mut rnd[..]).map_err(|_| Error::RandomSource)?;
        self.try_hash_sign_with_seed(&rnd, message, ctx, ph)
    }

    #[instrument(level = "debug", skip_all)]
    fn try_hash_sign_with_seed(
        &self, rnd: &[u8; RND_LEN], message: &[u8], ctx: &[u8], ph: &Ph,
    ) -> Result<Signature, Error> {
        let mu = ml_dsa::message_representative(&self.tr, message, ctx, Some(*ph))?;
        ml_dsa::sign_internal(self, &mu, rnd).map(Signature)
    }

    fn get_public_key(&self) -> PublicKey { ml_dsa::public_from_private(self) }
}


impl Verifier for PublicKey {
    type Signature = Signature;

    // Algorithm 3
    #[instrument(
        level = "debug",
        skip_all,
        fields(message_len = message.len(), context_len = ctx.len())
    )]
    fn verify(&self, message: &[u8], signature: &Signature, ctx: &[u8]) -> bool {
        let Ok(mu) = ml_dsa::message_representative(&self.tr, message, ctx, None) else {
            debug!("signature rejected: context too long");
            return false;
        };
        ml_dsa::verify_internal(self, &mu, &signature.0)
    }

    // Algorithm 5
    #[instrument(level = "debug", skip_all)]
    fn hash_verify(&self, message: &[u8], signature: &Signature, ctx: &[u8], ph: &Ph) -> bool {
        let Ok(mu) = ml_dsa::message_representative(&self.tr, message, ctx, Some(*ph)) else {
            debug!("signature rejected: context too long");
            return false;
        };
        ml_dsa::verify_internal(self, &mu, &signature.0)
    }
}


impl SerDes for PublicKey {
    type ByteArray = [u8; PK_LEN];

    fn into_bytes(self) -> Self::ByteArray { ml_dsa::encode_public(&self) }

    fn try_from_bytes(ba: &[u8]) -> Result<Self, Error> {
        let pk: &[u8; PK_LEN] = ba.try_into().map_err(|_| Error::MalformedEncoding {
            component: Component::PublicKey,
            expected: PK_LEN,
            actual: ba.len(),
        })?;
        ml_dsa::expand_public(pk)
    }
}


impl SerDes for PrivateKey {
    type ByteArray = Zeroizing<[u8; SK_LEN]>;

    fn into_bytes(self) -> Self::ByteArray { Zeroizing::new(ml_dsa::encode_private(&self)) }

    fn try_from_bytes(ba: &[u8]) -> Result<Self, Error> {
        let sk: &[u8; SK_LEN] = ba.try_into().map_err(|_| Error::MalformedEncoding {
            component: Component::SecretKey,
            expected: SK_LEN,
            actual: ba.len(),
        })?;
        ml_dsa::expand_private(sk)
    }
}


impl SerDes for Signature {
    type ByteArray = [u8; SIG_LEN];

    fn into_bytes(self) -> Self::ByteArray { self.0 }

    // Only the length is checked here; content is validated by verification
    fn try_from_bytes(ba: &[u8]) -> Result<Self, Error> {
        let sig: [u8; SIG_LEN] = ba.try_into().map_err(|_| Error::MalformedEncoding {
            component: Component::Signature,
            expected: SIG_LEN,
            actual: ba.len(),
        })?;
        Ok(Signature(sig))
    }
}


/// Deterministically derives a key pair from a 32-byte seed.
///
/// # Errors
/// Returns [`Error::InvalidSeedLength`] unless `seed` is exactly [`SEED_LEN`] bytes.
///
/// # Examples
/// ```rust
/// # fn main() -> Result<(), mldsa65::Error> {
/// let (pk, sk) = mldsa65::generate_keypair(&[0u8; 32])?;
/// let sig = mldsa65::sign(&sk, b"test message", None)?;
/// assert!(mldsa65::verify(&pk, b"test message", &sig));
/// assert!(mldsa65::generate_keypair(&[0u8; 31]).is_err());
/// # Ok(())}
/// ```
#[instrument(level = "debug", skip_all)]
pub fn generate_keypair(seed: &[u8]) -> Result<(PublicKey, PrivateKey), Error> {
    let xi: &[u8; SEED_LEN] = seed
        .try_into()
        .map_err(|_| Error::InvalidSeedLength { expected: SEED_LEN, actual: seed.len() })?;
    Ok(ml_dsa::key_gen_internal(xi))
}


/// Generates a key pair from the OS random number generator.
///
/// # Errors
/// Returns an error when the random number generator fails.
#[cfg(feature = "default-rng")]
pub fn try_keygen() -> Result<(PublicKey, PrivateKey), Error> { KG::try_keygen() }


/// Generates a key pair from the supplied random number generator.
///
/// # Errors
/// Returns an error when the random number generator fails.
pub fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<(PublicKey, PrivateKey), Error> {
    KG::try_keygen_with_rng(rng)
}


/// Signs `message` with the empty context. `randomness` supplies the 32-byte `rnd` input of the
/// hedged variant; `None` selects the deterministic variant (`rnd = {0}^32`).
///
/// # Errors
/// Returns [`Error::SigningFailed`] if the rejection loop is exhausted.
pub fn sign(
    secret_key: &PrivateKey, message: &[u8], randomness: Option<&[u8; RND_LEN]>,
) -> Result<Signature, Error> {
    secret_key.try_sign_with_seed(randomness.unwrap_or(&[0u8; RND_LEN]), message, &[])
}


/// Verifies `signature` on `message` with the empty context.
#[must_use]
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    public_key.verify(message, signature, &[])
}


/// Verifies an encoded signature against an encoded public key, with the empty context.
/// Inputs of the wrong length are reported as `false`.
#[must_use]
pub fn verify_encoded(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let Ok(pk) = PublicKey::try_from_bytes(public_key) else {
        debug!("signature rejected: malformed public key encoding");
        return false;
    };
    let Ok(sig) = Signature::try_from_bytes(signature) else {
        debug!("signature rejected: malformed signature encoding");
        return false;
    };
    verify(&pk, message, &sig)
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;

    #[test]
    fn smoke_test() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
        let message1 = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let message2 = [7u8, 7, 7, 7, 7, 7, 7, 7];

        for _i in 0..8 {
            let (pk, sk) = try_keygen_with_rng(&mut rng).unwrap();
            let sig = sk.try_sign_with_rng(&mut rng, &message1, &[]).unwrap();
            assert!(pk.verify(&message1, &sig, &[]));
            assert!(!pk.verify(&message2, &sig, &[]));
            for ph in [Ph::SHA256, Ph::SHA512, Ph::SHAKE128, Ph::SHAKE256] {
                let sig = sk.try_hash_sign_with_rng(&mut rng, &message1, &[], &ph).unwrap();
                assert!(pk.hash_verify(&message1, &sig, &[], &ph));
                assert!(!pk.verify(&message1, &sig, &[]));
            }
            assert_eq!(pk.clone().into_bytes(), sk.get_public_key().into_bytes());
        }

        let (pk, sk) = try_keygen().unwrap();
        let sig = sk.try_sign(&message1, &[]).unwrap();
        assert!(pk.verify(&message1, &sig, &[]));
        assert!(!pk.verify(&message2, &sig, &[]));
        assert!(!pk.verify(&message1, &sig, &[0u8; 256]));
        assert_eq!(sk.try_sign(&message1, &[0u8; 256]), Err(Error::ContextTooLong { len: 256 }));
    }

    #[test]
    fn test_lengths() {
        assert_eq!(PK_LEN, 1952);
        assert_eq!(SK_LEN, 4032);
        assert_eq!(SIG_LEN, 3309);
        assert_eq!(W1_LEN, 768);
        assert_eq!(BETA, 196);
        assert_eq!(GAMMA2, 261_888);
    }

    #[test]
    fn test_free_functions() {
        let (pk, sk) = generate_keypair(&[0u8; SEED_LEN]).unwrap();
        let sig = sign(&sk, b"test message", None).unwrap();
        assert!(verify(&pk, b"test message", &sig));
        assert_eq!(sig, sign(&sk, b"test message", Some(&[0u8; RND_LEN])).unwrap());
        let (pk_bytes, sig_bytes) = (pk.clone().into_bytes(), sig.clone().into_bytes());
        assert!(verify_encoded(&pk_bytes, b"test message", &sig_bytes));
        assert!(!verify_encoded(&[0u8; 12], b"test message", &sig.into_bytes()));
        assert_eq!(
            generate_keypair(&[0u8; 33]).err(),
            Some(Error::InvalidSeedLength { expected: 32, actual: 33 })
        );
    }

    #[test]
    fn test_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PublicKey>();
        assert_send_sync::<PrivateKey>();
        assert_send_sync::<Signature>();
        assert_send_sync::<KG>();
    }
}
