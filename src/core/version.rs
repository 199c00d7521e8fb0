//! PASETO version and purpose tags.
//!
//! Every token and every key carries exactly one [`Version`] and one
//! [`Purpose`]. The per-version size constants live here so the framing
//! layer and the suites agree on them.

use core::fmt::{self, Display};
use core::str::FromStr;

use crate::core::error::PasetoError;

/// PASETO protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// NIST original: AES-256-CTR + HMAC-SHA384, RSA-PSS-SHA384.
    V1,
    /// Sodium original: XChaCha20-Poly1305, Ed25519.
    V2,
    /// NIST modern: AES-256-CTR + HMAC-SHA384, ECDSA-P384.
    V3,
    /// Sodium modern: XChaCha20 + keyed BLAKE2b, Ed25519.
    V4,
}

impl Version {
    /// All versions, oldest first.
    pub const ALL: [Self; 4] = [Self::V1, Self::V2, Self::V3, Self::V4];

    /// The version prefix (e.g., "v4").
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
            Self::V3 => "v3",
            Self::V4 => "v4",
        }
    }

    /// The numeric version (1, 2, 3, or 4).
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V4 => 4,
        }
    }

    /// Whether this version binds an implicit assertion into its MAC or signature.
    #[must_use]
    pub const fn supports_implicit_assertions(self) -> bool {
        matches!(self, Self::V3 | Self::V4)
    }

    /// Nonce length of a local token payload.
    #[must_use]
    pub const fn local_nonce_size(self) -> usize {
        match self {
            Self::V2 => 24,
            Self::V1 | Self::V3 | Self::V4 => 32,
        }
    }

    /// Tag length of a local token payload.
    #[must_use]
    pub const fn local_tag_size(self) -> usize {
        match self {
            Self::V1 | Self::V3 => 48,
            Self::V2 => 16,
            Self::V4 => 32,
        }
    }

    /// Signature length of a public token payload.
    #[must_use]
    pub const fn signature_size(self) -> usize {
        match self {
            Self::V1 => 256,
            Self::V2 | Self::V4 => 64,
            Self::V3 => 96,
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Version {
    type Err = PasetoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "v1" => Ok(Self::V1),
            "v2" => Ok(Self::V2),
            "v3" => Ok(Self::V3),
            "v4" => Ok(Self::V4),
            _ => Err(PasetoError::InvalidVersion),
        }
    }
}

// =============================================================================
// Purpose
// =============================================================================

/// PASETO token purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// Symmetric authenticated encryption.
    Local,
    /// Asymmetric signature.
    Public,
}

impl Purpose {
    /// The purpose identifier used in the token header.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Public => "public",
        }
    }
}

impl Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = PasetoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "public" => Ok(Self::Public),
            _ => Err(PasetoError::InvalidHeader),
        }
    }
}
