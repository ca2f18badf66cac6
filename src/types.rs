use crate::{K, L, SIG_LEN};
use core::fmt;
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};


/// Private key with the secret vectors kept in both normal and (Montgomery) NTT form,
/// so repeated signing skips re-expansion. Wiped on drop. <br>
/// Implements the [`crate::traits::Signer`] and [`crate::traits::SerDes`] traits.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    pub(crate) rho: [u8; 32],
    pub(crate) cap_k: [u8; 32],
    pub(crate) tr: [u8; 64],
    pub(crate) s_1: [R; L],
    pub(crate) s_2: [R; K],
    pub(crate) t_0: [R; K],
    pub(crate) s_1_hat_mont: [T; L],
    pub(crate) s_2_hat_mont: [T; K],
    pub(crate) t_0_hat_mont: [T; K],
}


/// Public key carrying the precomputed `tr` hash and `NTT(t1·2^d)` for faster
/// verification. <br>
/// Implements the [`crate::traits::Verifier`] and [`crate::traits::SerDes`] traits.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) rho: [u8; 32],
    pub(crate) t1: [R; K],
    pub(crate) tr: [u8; 64],
    pub(crate) t1_d2_hat_mont: [T; K],
}


/// Fixed-size encoded signature `c_tilde || z || h`. <br>
/// Implements the [`crate::traits::SerDes`] trait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(pub(crate) [u8; SIG_LEN]);


/// Pre-hash function selection for `HashML-DSA`.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ph {
    /// SHA2-256, 32-byte digest
    SHA256,
    /// SHA2-512, 64-byte digest
    SHA512,
    /// SHAKE128 with 256 bits of output
    SHAKE128,
    /// SHAKE256 with 512 bits of output
    SHAKE256,
}


impl ConstantTimeEq for PrivateKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        let polys_eq = |a: &[R], b: &[R]| {
            a.iter().zip(b).fold(Choice::from(1), |acc, (x, y)| acc & x.0[..].ct_eq(&y.0[..]))
        };
        self.rho[..].ct_eq(&other.rho[..])
            & self.cap_k[..].ct_eq(&other.cap_k[..])
            & self.tr[..].ct_eq(&other.tr[..])
            & polys_eq(&self.s_1, &other.s_1)
            & polys_eq(&self.s_2, &other.s_2)
            & polys_eq(&self.t_0, &other.t_0)
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool { self.ct_eq(other).into() }
}

impl Eq for PrivateKey {}

// Never print secret material
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey").finish_non_exhaustive()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey").field("rho", &self.rho).finish_non_exhaustive()
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] { &self.0 }
}


// Internal polynomial representations. `R` holds coefficients in the normal domain
// (usually centered or in [0, q)), `T` holds NTT-domain coefficients.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub(crate) struct R(pub(crate) [i32; 256]);
pub(crate) const R0: R = R([0i32; 256]);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub(crate) struct T(pub(crate) [i32; 256]);
pub(crate) const T0: T = T([0i32; 256]);
