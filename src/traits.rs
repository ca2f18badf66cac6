use crate::error::Error;
use crate::types::Ph;
use crate::{RND_LEN, SEED_LEN};
use rand_core::CryptoRngCore;
#[cfg(feature = "default-rng")]
use rand_core::OsRng;


/// The `KeyGen` trait is defined to allow trait objects.
pub trait KeyGen {
    /// The ML-DSA-65 public key
    type PublicKey;
    /// The ML-DSA-65 private (secret) key, carrying precomputed NTT forms for repeated signing
    type PrivateKey;

    /// Generates a public and private key pair using the OS default random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa65::traits::{KeyGen, Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    ///
    /// let (pk, sk) = mldsa65::KG::try_keygen()?; // Generate both public and secret keys
    /// let sig = sk.try_sign(&message, &[])?; // Use the secret key to generate a message signature
    /// assert!(pk.verify(&message, &sig, &[]));
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen() -> Result<(Self::PublicKey, Self::PrivateKey), Error> {
        Self::try_keygen_with_rng(&mut OsRng)
    }

    /// Generates a public and private key pair using a supplied random number generator.
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa65::traits::{KeyGen, Signer, Verifier};
    /// use rand_chacha::rand_core::SeedableRng;
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    ///
    /// let (pk, sk) = mldsa65::KG::try_keygen_with_rng(&mut rng)?;
    /// let sig = sk.try_sign_with_rng(&mut rng, &message, &[])?;
    /// assert!(pk.verify(&message, &sig, &[]));
    /// # Ok(())}
    /// ```
    fn try_keygen_with_rng(
        rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::PublicKey, Self::PrivateKey), Error>;

    /// Deterministically derives a key pair from the 32-byte seed `ξ`. The same seed always
    /// produces the same keys, so the seed must be kept as secret as the private key.
    /// # Examples
    /// ```rust
    /// use mldsa65::traits::{KeyGen, SerDes};
    ///
    /// let (pk1, _sk1) = mldsa65::KG::keygen_from_seed(&[42u8; 32]);
    /// let (pk2, _sk2) = mldsa65::KG::keygen_from_seed(&[42u8; 32]);
    /// assert_eq!(pk1.into_bytes(), pk2.into_bytes());
    /// ```
    fn keygen_from_seed(xi: &[u8; SEED_LEN]) -> (Self::PublicKey, Self::PrivateKey);
}


/// The Signer trait is implemented for the `PrivateKey` struct.
pub trait Signer {
    /// The signature type produced
    type Signature;
    /// The matching public key type
    type PublicKey;

    /// Attempt to sign the given message with a context string of at most 255 bytes, using the
    /// default OS RNG for the hedged `rnd` input.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails, the context is too long, or
    /// the rejection loop is exhausted.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa65::traits::{KeyGen, Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    ///
    /// let (pk, sk) = mldsa65::KG::try_keygen()?;
    /// let sig = sk.try_sign(&message, b"my context")?;
    /// assert!(pk.verify(&message, &sig, b"my context"));
    /// assert!(!pk.verify(&message, &sig, b"other context"));
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_sign(&self, message: &[u8], ctx: &[u8]) -> Result<Self::Signature, Error> {
        self.try_sign_with_rng(&mut OsRng, message, ctx)
    }

    /// Attempt to sign the given message, drawing the hedged `rnd` input from a supplied RNG.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails, the context is too long, or
    /// the rejection loop is exhausted.
    fn try_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8],
    ) -> Result<Self::Signature, Error>;

    /// Attempt to sign the given message with caller-supplied 32 bytes of randomness `rnd`.
    /// Output is a deterministic function of (key, message, context, `rnd`).
    ///
    /// # Errors
    /// Returns an error when the context is too long or the rejection loop is exhausted.
    fn try_sign_with_seed(
        &self, rnd: &[u8; RND_LEN], message: &[u8], ctx: &[u8],
    ) -> Result<Self::Signature, Error>;

    /// Deterministic signing variant with `rnd = {0}^32`.
    ///
    /// # Errors
    /// Returns an error when the context is too long or the rejection loop is exhausted.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa65::traits::{KeyGen, Signer};
    ///
    /// let (_pk, sk) = mldsa65::KG::keygen_from_seed(&[0u8; 32]);
    /// let sig1 = sk.try_sign_deterministic(b"test message", &[])?;
    /// let sig2 = sk.try_sign_deterministic(b"test message", &[])?;
    /// assert_eq!(sig1, sig2);
    /// # Ok(())}
    /// ```
    fn try_sign_deterministic(&self, message: &[u8], ctx: &[u8]) -> Result<Self::Signature, Error> {
        self.try_sign_with_seed(&[0u8; RND_LEN], message, ctx)
    }

    /// `HashML-DSA` signing of the pre-hashed message, using the default OS RNG.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails, the context is too long, or
    /// the rejection loop is exhausted.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa65::Ph;
    /// use mldsa65::traits::{KeyGen, Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    ///
    /// let (pk, sk) = mldsa65::KG::try_keygen()?;
    /// let sig = sk.try_hash_sign(&message, &[], &Ph::SHA512)?;
    /// assert!(pk.hash_verify(&message, &sig, &[], &Ph::SHA512));
    /// assert!(!pk.hash_verify(&message, &sig, &[], &Ph::SHA256));
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_hash_sign(&self, message: &[u8], ctx: &[u8], ph: &Ph) -> Result<Self::Signature, Error> {
        self.try_hash_sign_with_rng(&mut OsRng, message, ctx, ph)
    }

    /// `HashML-DSA` signing of the pre-hashed message, using a supplied RNG.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails, the context is too long, or
    /// the rejection loop is exhausted.
    fn try_hash_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8], ph: &Ph,
    ) -> Result<Self::Signature, Error>;

    /// `HashML-DSA` signing with caller-supplied randomness `rnd`.
    ///
    /// # Errors
    /// Returns an error when the context is too long or the rejection loop is exhausted.
    fn try_hash_sign_with_seed(
        &self, rnd: &[u8; RND_LEN], message: &[u8], ctx: &[u8], ph: &Ph,
    ) -> Result<Self::Signature, Error>;

    /// Derives the matching public key from the private key.
    /// # Examples
    /// ```rust
    /// use mldsa65::traits::{KeyGen, SerDes, Signer};
    ///
    /// let (pk, sk) = mldsa65::KG::keygen_from_seed(&[1u8; 32]);
    /// assert_eq!(sk.get_public_key().into_bytes(), pk.into_bytes());
    /// ```
    fn get_public_key(&self) -> Self::PublicKey;
}


/// The Verifier trait is implemented for `PublicKey`.
pub trait Verifier {
    /// The signature type accepted
    type Signature;

    /// Verifies a digital signature on `message` under the context string `ctx`. Any failure
    /// (malformed hint, norm violation, challenge mismatch, over-long context) yields `false`.
    /// This function operates in variable time, over public data only.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa65::traits::{KeyGen, Signer, Verifier};
    ///
    /// let (pk, sk) = mldsa65::KG::keygen_from_seed(&[3u8; 32]);
    /// let sig = sk.try_sign_deterministic(b"hello", &[])?;
    /// assert!(pk.verify(b"hello", &sig, &[]));
    /// assert!(!pk.verify(b"hellO", &sig, &[]));
    /// # Ok(())}
    /// ```
    fn verify(&self, message: &[u8], signature: &Self::Signature, ctx: &[u8]) -> bool;

    /// Verifies a `HashML-DSA` signature over the pre-hashed message.
    fn hash_verify(&self, message: &[u8], signature: &Self::Signature, ctx: &[u8], ph: &Ph) -> bool;
}


/// The `SerDes` trait provides for validated serialization and deserialization of fixed-size
/// elements. Deserialization takes a byte slice so that length mismatches surface as
/// [`Error::MalformedEncoding`].
pub trait SerDes {
    /// The fixed-size byte array to be serialized
    type ByteArray;

    /// Produces the fixed-size encoding of the struct.
    /// # Examples
    /// ```rust
    /// use mldsa65::traits::{KeyGen, SerDes};
    ///
    /// let (pk, sk) = mldsa65::KG::keygen_from_seed(&[0u8; 32]);
    /// assert_eq!(pk.into_bytes().len(), mldsa65::PK_LEN);
    /// assert_eq!(sk.into_bytes().len(), mldsa65::SK_LEN);
    /// ```
    fn into_bytes(self) -> Self::ByteArray;

    /// Decodes and validates an encoding of the struct.
    /// # Errors
    /// Returns an error on wrong length or out-of-range coefficients.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa65::traits::{KeyGen, SerDes};
    /// use mldsa65::{PrivateKey, PublicKey};
    ///
    /// let (pk, sk) = mldsa65::KG::keygen_from_seed(&[0u8; 32]);
    /// let pk_bytes = pk.clone().into_bytes();
    /// let sk_bytes = sk.clone().into_bytes();
    /// assert!(PublicKey::try_from_bytes(&pk_bytes)? == pk);
    /// assert!(PrivateKey::try_from_bytes(&sk_bytes[..])? == sk);
    /// assert!(PublicKey::try_from_bytes(&pk_bytes[1..]).is_err());
    /// # Ok(())}
    /// ```
    fn try_from_bytes(ba: &[u8]) -> Result<Self, Error>
    where
        Self: Sized;
}
