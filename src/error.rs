use core::fmt;


/// The encoded object a decoding failure refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    /// Encoded public key, `PK_LEN` bytes.
    PublicKey,
    /// Encoded private (secret) key, `SK_LEN` bytes.
    SecretKey,
    /// Encoded signature, `SIG_LEN` bytes.
    Signature,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PublicKey => "public key",
            Self::SecretKey => "secret key",
            Self::Signature => "signature",
        })
    }
}


/// Errors surfaced by key generation, signing and deserialization.
///
/// Signature verification never produces an error: an invalid signature is a normal
/// `false` outcome of [`crate::traits::Verifier::verify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The key generation seed does not have the required length.
    #[error("invalid seed length: expected {expected} bytes, got {actual}")]
    InvalidSeedLength {
        /// Required seed length.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// A byte string does not have the fixed length of the component it should encode.
    #[error("malformed {component} encoding: expected {expected} bytes, got {actual}")]
    MalformedEncoding {
        /// Which object was being decoded.
        component: Component,
        /// Required encoded length.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// A correctly sized encoding carries coefficients outside their permitted range.
    #[error("{component} encoding carries out-of-range coefficients")]
    InvalidCoefficients {
        /// Which object was being decoded.
        component: Component,
    },

    /// The context string exceeds 255 bytes.
    #[error("context string too long: {len} bytes (maximum 255)")]
    ContextTooLong {
        /// Length that was supplied.
        len: usize,
    },

    /// The random number generator failed to produce bytes.
    #[error("random number generator failed")]
    RandomSource,

    /// The rejection-sampling loop exhausted its iteration bound. This indicates an
    /// implementation or parameter defect, never a condition of correct operation.
    #[error("signing failed after {attempts} rejection-sampling attempts")]
    SigningFailed {
        /// Number of attempts that were made.
        attempts: u16,
    },
}
