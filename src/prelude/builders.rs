//! Builder patterns for PASETO operations.
//!
//! The suite modules take a concrete key type and are fixed to one version.
//! The builders here take any [`Key`] and route to the matching suite at
//! runtime, which suits hosts that load keys of mixed versions from config.
//!
//! # Example
//!
//! ```rust
//! use paseto_tokens::prelude::*;
//!
//! let key: Key = SymmetricKey::generate(Version::V4)?.into();
//!
//! let token = TokenBuilder::new()
//!     .payload(r#"{"sub":"alice"}"#)
//!     .footer("kid-1")
//!     .implicit_assertion("tenant-7")
//!     .build(&key)?;
//!
//! let claims = TokenDecoder::new()
//!     .footer("kid-1")
//!     .implicit_assertion("tenant-7")
//!     .decode_to_string(&key, &token)?;
//! assert_eq!(claims, r#"{"sub":"alice"}"#);
//! # Ok::<(), PasetoError>(())
//! ```

use crate::core::error::{PasetoError, PasetoResult};
use crate::core::key::{Key, PrivateKey, PublicKey, SymmetricKey};
use crate::core::version::Version;

#[cfg(feature = "v1")]
use crate::core::operations::v1;
#[cfg(feature = "v2")]
use crate::core::operations::v2;
#[cfg(feature = "v3")]
use crate::core::operations::v3;
#[cfg(feature = "v4")]
use crate::core::operations::v4;

/// Builder for creating a token from any [`Key`].
///
/// A symmetric key produces a `local` token, a private key a `public` one.
#[derive(Debug, Clone, Default)]
pub struct TokenBuilder {
    payload: Vec<u8>,
    footer: Vec<u8>,
    implicit_assertion: Vec<u8>,
}

impl TokenBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message to encrypt or sign.
    #[must_use]
    pub fn payload(mut self, payload: impl AsRef<[u8]>) -> Self {
        self.payload = payload.as_ref().to_vec();
        self
    }

    /// Sets the footer. Footers are authenticated but not encrypted.
    #[must_use]
    pub fn footer(mut self, footer: impl AsRef<[u8]>) -> Self {
        self.footer = footer.as_ref().to_vec();
        self
    }

    /// Sets the implicit assertion (v3 and v4 only).
    #[must_use]
    pub fn implicit_assertion(mut self, implicit_assertion: impl AsRef<[u8]>) -> Self {
        self.implicit_assertion = implicit_assertion.as_ref().to_vec();
        self
    }

    /// Builds the token with `key`.
    ///
    /// # Errors
    ///
    /// - `KeyMismatch` if `key` is a public key
    /// - `ImplicitAssertionUnsupported` for a non-empty assertion with v1/v2
    /// - `SuiteDisabled` if the key's version was not compiled in
    /// - any error of the underlying suite
    pub fn build(&self, key: &Key) -> PasetoResult<String> {
        ensure_implicit_supported(key.version(), &self.implicit_assertion)?;

        match key {
            Key::Symmetric(key) => {
                encrypt(key, &self.payload, &self.footer, &self.implicit_assertion)
            }
            Key::Private(key) => sign(key, &self.payload, &self.footer, &self.implicit_assertion),
            Key::Public(_) => Err(PasetoError::KeyMismatch),
        }
    }
}

/// Builder for verifying (and decrypting) a token with any [`Key`].
///
/// A private key is accepted for `public` tokens and verifies with its
/// public half.
#[derive(Debug, Clone, Default)]
pub struct TokenDecoder {
    footer: Vec<u8>,
    implicit_assertion: Vec<u8>,
}

impl TokenDecoder {
    /// Creates a decoder expecting no footer and no implicit assertion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the expected footer.
    #[must_use]
    pub fn footer(mut self, footer: impl AsRef<[u8]>) -> Self {
        self.footer = footer.as_ref().to_vec();
        self
    }

    /// Sets the implicit assertion the token was bound to.
    #[must_use]
    pub fn implicit_assertion(mut self, implicit_assertion: impl AsRef<[u8]>) -> Self {
        self.implicit_assertion = implicit_assertion.as_ref().to_vec();
        self
    }

    /// Verifies `token` and returns its message.
    ///
    /// # Errors
    ///
    /// - `ImplicitAssertionUnsupported` for a non-empty assertion with v1/v2
    /// - `SuiteDisabled` if the key's version was not compiled in
    /// - any error of the underlying suite
    pub fn decode(&self, key: &Key, token: &str) -> PasetoResult<Vec<u8>> {
        ensure_implicit_supported(key.version(), &self.implicit_assertion)?;

        match key {
            Key::Symmetric(key) => decrypt(key, token, &self.footer, &self.implicit_assertion),
            Key::Private(key) => parse(
                &key.public_key(),
                token,
                &self.footer,
                &self.implicit_assertion,
            ),
            Key::Public(key) => parse(key, token, &self.footer, &self.implicit_assertion),
        }
    }

    /// Like [`TokenDecoder::decode`], requiring a UTF-8 message.
    ///
    /// # Errors
    ///
    /// As [`TokenDecoder::decode`], plus `InvalidUtf8` if the verified
    /// message is not valid UTF-8.
    pub fn decode_to_string(&self, key: &Key, token: &str) -> PasetoResult<String> {
        let message = self.decode(key, token)?;
        Ok(String::from_utf8(message)?)
    }
}

fn ensure_implicit_supported(version: Version, implicit_assertion: &[u8]) -> PasetoResult<()> {
    if implicit_assertion.is_empty() || version.supports_implicit_assertions() {
        Ok(())
    } else {
        Err(PasetoError::ImplicitAssertionUnsupported(version))
    }
}

#[allow(unused_variables)]
fn encrypt(
    key: &SymmetricKey,
    message: &[u8],
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<String> {
    match key.version() {
        #[cfg(feature = "v1")]
        Version::V1 => v1::encrypt(key, message, footer),
        #[cfg(feature = "v2")]
        Version::V2 => v2::encrypt(key, message, footer),
        #[cfg(feature = "v3")]
        Version::V3 => v3::encrypt(key, message, footer, implicit_assertion),
        #[cfg(feature = "v4")]
        Version::V4 => v4::encrypt(key, message, footer, implicit_assertion),
        #[allow(unreachable_patterns)]
        version => Err(PasetoError::SuiteDisabled(version)),
    }
}

#[allow(unused_variables)]
fn decrypt(
    key: &SymmetricKey,
    token: &str,
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<Vec<u8>> {
    match key.version() {
        #[cfg(feature = "v1")]
        Version::V1 => v1::decrypt(key, token, footer),
        #[cfg(feature = "v2")]
        Version::V2 => v2::decrypt(key, token, footer),
        #[cfg(feature = "v3")]
        Version::V3 => v3::decrypt(key, token, footer, implicit_assertion),
        #[cfg(feature = "v4")]
        Version::V4 => v4::decrypt(key, token, footer, implicit_assertion),
        #[allow(unreachable_patterns)]
        version => Err(PasetoError::SuiteDisabled(version)),
    }
}

#[allow(unused_variables)]
fn sign(
    key: &PrivateKey,
    message: &[u8],
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<String> {
    match key.version() {
        #[cfg(feature = "v1")]
        Version::V1 => v1::sign(key, message, footer),
        #[cfg(feature = "v2")]
        Version::V2 => v2::sign(key, message, footer),
        #[cfg(feature = "v3")]
        Version::V3 => v3::sign(key, message, footer, implicit_assertion),
        #[cfg(feature = "v4")]
        Version::V4 => v4::sign(key, message, footer, implicit_assertion),
        #[allow(unreachable_patterns)]
        version => Err(PasetoError::SuiteDisabled(version)),
    }
}

#[allow(unused_variables)]
fn parse(
    key: &PublicKey,
    token: &str,
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<Vec<u8>> {
    match key.version() {
        #[cfg(feature = "v1")]
        Version::V1 => v1::parse(key, token, footer),
        #[cfg(feature = "v2")]
        Version::V2 => v2::parse(key, token, footer),
        #[cfg(feature = "v3")]
        Version::V3 => v3::parse(key, token, footer, implicit_assertion),
        #[cfg(feature = "v4")]
        Version::V4 => v4::parse(key, token, footer, implicit_assertion),
        #[allow(unreachable_patterns)]
        version => Err(PasetoError::SuiteDisabled(version)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_key(version: Version) -> Key {
        SymmetricKey::from_bytes(version, [0x42; 32]).into()
    }

    #[test]
    fn test_local_builder_roundtrip_all_versions() -> PasetoResult<()> {
        for version in [Version::V1, Version::V2, Version::V3, Version::V4] {
            let key = local_key(version);
            let token = TokenBuilder::new()
                .payload("hello")
                .footer("kid")
                .build(&key)?;
            assert!(token.starts_with(&format!("{version}.local.")));

            let message = TokenDecoder::new().footer("kid").decode(&key, &token)?;
            assert_eq!(message, b"hello");
        }
        Ok(())
    }

    #[test]
    fn test_public_builder_roundtrip() -> PasetoResult<()> {
        let private = PrivateKey::v4_from_seed(&[7u8; 32]);
        let public: Key = private.public_key().into();
        let private: Key = private.into();

        let token = TokenBuilder::new()
            .payload("signed")
            .implicit_assertion("ctx")
            .build(&private)?;
        assert!(token.starts_with("v4.public."));

        let decoder = TokenDecoder::new().implicit_assertion("ctx");
        assert_eq!(decoder.decode_to_string(&public, &token)?, "signed");
        assert_eq!(decoder.decode_to_string(&private, &token)?, "signed");
        Ok(())
    }

    #[test]
    fn test_build_with_public_key_fails() {
        let public: Key = PrivateKey::v2_from_seed(&[1u8; 32]).public_key().into();
        let result = TokenBuilder::new().payload("m").build(&public);
        assert!(matches!(result, Err(PasetoError::KeyMismatch)));
    }

    #[test]
    fn test_implicit_assertion_rejected_for_v1_and_v2() {
        for version in [Version::V1, Version::V2] {
            let key = local_key(version);
            let result = TokenBuilder::new()
                .payload("m")
                .implicit_assertion("ctx")
                .build(&key);
            assert!(matches!(
                result,
                Err(PasetoError::ImplicitAssertionUnsupported(v)) if v == version
            ));

            let result = TokenDecoder::new()
                .implicit_assertion("ctx")
                .decode(&key, "v1.local.AAAA");
            assert!(matches!(result, Err(PasetoError::ImplicitAssertionUnsupported(_))));
        }
    }

    #[test]
    fn test_decode_to_string_rejects_non_utf8() -> PasetoResult<()> {
        let key = local_key(Version::V4);
        let token = TokenBuilder::new().payload([0xffu8, 0xfe]).build(&key)?;
        let result = TokenDecoder::new().decode_to_string(&key, &token);
        assert!(matches!(result, Err(PasetoError::InvalidUtf8(_))));
        Ok(())
    }

    #[test]
    fn test_decoder_footer_mismatch() -> PasetoResult<()> {
        let key = local_key(Version::V3);
        let token = TokenBuilder::new().payload("m").footer("a").build(&key)?;
        let result = TokenDecoder::new().footer("b").decode(&key, &token);
        assert!(matches!(result, Err(PasetoError::AuthenticationFailed)));
        Ok(())
    }

    #[test]
    fn test_decoder_cross_version_key() -> PasetoResult<()> {
        let token = TokenBuilder::new()
            .payload("m")
            .build(&local_key(Version::V4))?;
        let result = TokenDecoder::new().decode(&local_key(Version::V2), &token);
        assert!(matches!(result, Err(PasetoError::InvalidHeader)));
        Ok(())
    }
}
