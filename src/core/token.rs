//! Token framing and parsing.
//!
//! Wire format: `{version}.{purpose}.{base64url(payload)}[.{base64url(footer)}]`
//!
//! This module owns every string-level check on a token. The suites only see
//! the decoded payload bytes after the header, the part count and the footer
//! have been validated here.

use core::fmt::{self, Display};

use base64::prelude::*;
use subtle::ConstantTimeEq;

use crate::core::error::{PasetoError, PasetoResult};
use crate::core::header::{make_header, parse_header, validate_header};
use crate::core::version::{Purpose, Version};

/// A framed PASETO token.
///
/// `payload` is `nonce || ciphertext || tag` for local tokens and
/// `message || signature` for public tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    version: Version,
    purpose: Purpose,
    payload: Vec<u8>,
    footer: Vec<u8>,
}

impl Token {
    /// Creates a token ready to be serialized with [`Display`].
    #[must_use]
    pub fn new(version: Version, purpose: Purpose, payload: Vec<u8>, footer: &[u8]) -> Self {
        Self {
            version,
            purpose,
            payload,
            footer: footer.to_vec(),
        }
    }

    /// Parses and validates a token string.
    ///
    /// `footer` is the footer the caller expects. When it is empty the token
    /// must have exactly three parts; otherwise exactly four, and the embedded
    /// footer must equal `footer` under a constant-time comparison.
    ///
    /// # Errors
    ///
    /// - `InvalidHeader` if the token does not start with `{version}.{purpose}.`
    /// - `InvalidFormat` for a wrong part count or an empty payload
    /// - `Base64Decode` for non-canonical base64url
    /// - `AuthenticationFailed` if the embedded footer differs from `footer`
    pub fn parse(
        token: &str,
        version: Version,
        purpose: Purpose,
        footer: &[u8],
    ) -> PasetoResult<Self> {
        let rest = validate_header(token, version, purpose)?;
        let parts: Vec<&str> = rest.split('.').collect();

        let expected_parts = if footer.is_empty() { 1 } else { 2 };
        if parts.len() != expected_parts {
            tracing::debug!(
                %version,
                %purpose,
                parts = parts.len() + 2,
                "rejecting token with unexpected part count"
            );
            return Err(PasetoError::InvalidFormat);
        }

        if parts[0].is_empty() {
            return Err(PasetoError::InvalidFormat);
        }
        let payload = BASE64_URL_SAFE_NO_PAD.decode(parts[0])?;

        if let Some(encoded_footer) = parts.get(1) {
            let embedded = BASE64_URL_SAFE_NO_PAD.decode(encoded_footer)?;
            if !bool::from(embedded.ct_eq(footer)) {
                tracing::debug!(%version, %purpose, "token footer mismatch");
                return Err(PasetoError::AuthenticationFailed);
            }
        }

        Ok(Self {
            version,
            purpose,
            payload,
            footer: footer.to_vec(),
        })
    }

    /// Returns the version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the purpose.
    #[must_use]
    pub const fn purpose(&self) -> Purpose {
        self.purpose
    }

    /// Returns the header (e.g., "v4.local.").
    #[must_use]
    pub fn header(&self) -> String {
        make_header(self.version, self.purpose)
    }

    /// Returns the raw payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Returns the footer bytes (empty if none).
    #[must_use]
    pub fn footer(&self) -> &[u8] {
        &self.footer
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.header(),
            BASE64_URL_SAFE_NO_PAD.encode(&self.payload)
        )?;
        if !self.footer.is_empty() {
            write!(f, ".{}", BASE64_URL_SAFE_NO_PAD.encode(&self.footer))?;
        }
        Ok(())
    }
}

/// Extracts the footer of a token **without verifying it**.
///
/// Useful to read a key identifier before choosing which key to verify
/// with. The footer is checked again, in constant time, by decrypt/parse.
///
/// # Errors
///
/// Returns a framing error if the token is not well-formed.
pub fn footer(token: &str) -> PasetoResult<Vec<u8>> {
    let (_, _, rest) = parse_header(token)?;
    let parts: Vec<&str> = rest.split('.').collect();

    match parts.as_slice() {
        [payload] if !payload.is_empty() => Ok(Vec::new()),
        [payload, footer] if !payload.is_empty() => Ok(BASE64_URL_SAFE_NO_PAD.decode(footer)?),
        _ => Err(PasetoError::InvalidFormat),
    }
}
