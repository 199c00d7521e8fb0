//! Error types for PASETO operations.
//!
//! This module provides a unified error type for every suite. Error messages
//! are intentionally vague for verification failures so that a caller (or an
//! attacker observing a caller) cannot learn which byte region of a token was
//! rejected.

use thiserror::Error;

use crate::core::version::Version;

/// Errors that can occur when building or verifying PASETO tokens.
#[derive(Debug, Error)]
pub enum PasetoError {
    /// The key material is invalid (wrong size, bad point, weak modulus).
    #[error("Invalid key material")]
    InvalidKey,

    /// The key is not usable for the requested version and purpose.
    #[error("Key is not valid for this version and purpose")]
    KeyMismatch,

    /// The version string is not one of `v1`..`v4`.
    #[error("Invalid or unsupported PASETO version")]
    InvalidVersion,

    /// The token header doesn't match the expected version/purpose.
    #[error("Invalid PASETO header")]
    InvalidHeader,

    /// The token has the wrong number of parts or an empty required part.
    #[error("Invalid PASETO format")]
    InvalidFormat,

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// An implicit assertion was supplied to a version that cannot bind one.
    #[error("Implicit assertions are not supported by {0}")]
    ImplicitAssertionUnsupported(Version),

    /// The suite for this version was not compiled in.
    #[error("Support for {0} is not enabled")]
    SuiteDisabled(Version),

    /// Local token authentication failed.
    /// Intentionally vague for security.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Public token signature verification failed.
    /// Intentionally vague for security.
    #[error("Invalid signature")]
    InvalidSignature,

    /// A verified payload was requested as text but is not UTF-8.
    #[error("Payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Generic cryptographic error.
    /// Intentionally vague for security.
    #[error("Cryptographic operation failed")]
    CryptoError,
}

/// Broad classification of a [`PasetoError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad key or bad arguments, detected before any cryptography runs.
    Construction,
    /// Malformed token text, detected before key material is touched.
    Framing,
    /// A MAC, AEAD tag, footer or signature did not verify.
    Verification,
    /// Primitive or entropy failure.
    Internal,
}

impl PasetoError {
    /// Returns the broad class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidKey
            | Self::KeyMismatch
            | Self::ImplicitAssertionUnsupported(_)
            | Self::SuiteDisabled(_) => ErrorKind::Construction,
            Self::InvalidVersion
            | Self::InvalidHeader
            | Self::InvalidFormat
            | Self::Base64Decode(_)
            | Self::InvalidUtf8(_) => ErrorKind::Framing,
            Self::AuthenticationFailed | Self::InvalidSignature => ErrorKind::Verification,
            Self::CryptoError => ErrorKind::Internal,
        }
    }
}

/// Result type alias for PASETO operations.
pub type PasetoResult<T> = Result<T, PasetoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PasetoError::InvalidKey;
        assert_eq!(err.to_string(), "Invalid key material");

        let err = PasetoError::KeyMismatch;
        assert_eq!(err.to_string(), "Key is not valid for this version and purpose");

        let err = PasetoError::InvalidHeader;
        assert_eq!(err.to_string(), "Invalid PASETO header");

        let err = PasetoError::InvalidFormat;
        assert_eq!(err.to_string(), "Invalid PASETO format");

        let err = PasetoError::ImplicitAssertionUnsupported(Version::V2);
        assert_eq!(err.to_string(), "Implicit assertions are not supported by v2");

        let err = PasetoError::SuiteDisabled(Version::V1);
        assert_eq!(err.to_string(), "Support for v1 is not enabled");

        let err = PasetoError::AuthenticationFailed;
        assert_eq!(err.to_string(), "Authentication failed");

        let err = PasetoError::InvalidSignature;
        assert_eq!(err.to_string(), "Invalid signature");

        let err = PasetoError::CryptoError;
        assert_eq!(err.to_string(), "Cryptographic operation failed");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(PasetoError::KeyMismatch.kind(), ErrorKind::Construction);
        assert_eq!(PasetoError::InvalidFormat.kind(), ErrorKind::Framing);
        assert_eq!(PasetoError::AuthenticationFailed.kind(), ErrorKind::Verification);
        assert_eq!(PasetoError::InvalidSignature.kind(), ErrorKind::Verification);
        assert_eq!(PasetoError::CryptoError.kind(), ErrorKind::Internal);

        let decode_err = base64::DecodeError::InvalidLength(1);
        assert_eq!(PasetoError::from(decode_err).kind(), ErrorKind::Framing);
    }

    #[test]
    fn test_error_debug() {
        let err = PasetoError::InvalidFormat;
        let debug_str = format!("{err:?}");
        assert!(debug_str.contains("InvalidFormat"));
    }
}
