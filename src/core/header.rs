//! Header parsing and generation utilities for PASETO tokens.
//!
//! PASETO tokens follow the format: `v{version}.{purpose}.{payload}[.{footer}]`
//! where version is 1-4 and purpose is `local` or `public`.

use crate::core::error::PasetoError;
use crate::core::version::{Purpose, Version};

/// Parses a PASETO header and returns the version, purpose and the remainder.
///
/// # Errors
///
/// Returns `PasetoError::InvalidFormat` if the string has fewer than three parts.
/// Returns `PasetoError::InvalidVersion` for an unknown version prefix.
/// Returns `PasetoError::InvalidHeader` for an unknown purpose.
pub fn parse_header(token: &str) -> Result<(Version, Purpose, &str), PasetoError> {
    let parts: Vec<&str> = token.splitn(3, '.').collect();

    if parts.len() < 3 {
        return Err(PasetoError::InvalidFormat);
    }

    let version = parts[0].parse::<Version>()?;
    let purpose = parts[1].parse::<Purpose>()?;

    Ok((version, purpose, parts[2]))
}

/// Validates that a token starts with exactly the expected header.
///
/// Returns everything after the header (`payload[.footer]`).
///
/// # Errors
///
/// Returns `PasetoError::InvalidHeader` if the token does not begin with
/// `{version}.{purpose}.`.
pub fn validate_header(
    token: &str,
    expected_version: Version,
    expected_purpose: Purpose,
) -> Result<&str, PasetoError> {
    let header = make_header(expected_version, expected_purpose);
    token
        .strip_prefix(header.as_str())
        .ok_or(PasetoError::InvalidHeader)
}

/// Constructs a PASETO header string.
///
/// # Returns
///
/// The header string with trailing dot (e.g., "v4.local.")
#[must_use]
pub fn make_header(version: Version, purpose: Purpose) -> String {
    format!("{version}.{purpose}.")
}
