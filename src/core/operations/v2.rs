//! PASETO v2 ("Sodium Original").
//!
//! - `v2.local`: XChaCha20-Poly1305 with `PAE(h, n, f)` as associated data.
//!   The 24-byte nonce is `BLAKE2b(msg=m, key=random 24 bytes, len=24)`.
//! - `v2.public`: Ed25519 over `PAE(h, m, f)`.
//!
//! v2 has no implicit assertions.

use crate::core::error::{PasetoError, PasetoResult};
use crate::core::header::make_header;
use crate::core::key::{PrivateKey, PublicKey, SymmetricKey};
use crate::core::pae::PreAuthEncoded;
use crate::core::provider::random_bytes;
use crate::core::token::Token;
use crate::core::version::{Purpose, Version};

const VERSION: Version = Version::V2;

/// Nonce size for `v2.local` (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size.
pub const TAG_SIZE: usize = 16;

/// Ed25519 signature size.
pub const SIGNATURE_SIZE: usize = 64;

// =============================================================================
// Local
// =============================================================================

/// Encrypts `message` into a `v2.local` token.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v2 key and
/// `PasetoError::CryptoError` if the entropy source fails.
pub fn encrypt(key: &SymmetricKey, message: &[u8], footer: &[u8]) -> PasetoResult<String> {
    let nonce_key = random_bytes::<NONCE_SIZE>()?;
    encrypt_with_nonce(key, message, footer, &nonce_key)
}

/// Encrypts `message` with a caller-supplied BLAKE2b nonce key.
///
/// The actual nonce is still derived from `nonce_key` and the message.
/// Use this only to reproduce known-answer vectors.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v2 key.
pub fn encrypt_with_nonce(
    key: &SymmetricKey,
    message: &[u8],
    footer: &[u8],
    nonce_key: &[u8; NONCE_SIZE],
) -> PasetoResult<String> {
    use chacha20poly1305::aead::{AeadInPlace, KeyInit};
    use chacha20poly1305::{XChaCha20Poly1305, XNonce};

    let key = key.material_for(VERSION)?;
    let header = make_header(VERSION, Purpose::Local);
    let nonce = derive_nonce(nonce_key, message)?;

    let pre_auth = PreAuthEncoded::encode(&[header.as_bytes(), &nonce, footer]);

    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| PasetoError::CryptoError)?;
    let mut ciphertext = message.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(XNonce::from_slice(&nonce), pre_auth.as_bytes(), &mut ciphertext)
        .map_err(|_| PasetoError::CryptoError)?;

    let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len() + TAG_SIZE);
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);
    payload.extend_from_slice(&tag);

    Ok(Token::new(VERSION, Purpose::Local, payload, footer).to_string())
}

/// Verifies and decrypts a `v2.local` token.
///
/// The Poly1305 tag is verified in constant time before decryption.
///
/// # Errors
///
/// - `KeyMismatch` if `key` is not a v2 key
/// - a framing error if the token is malformed
/// - `AuthenticationFailed` for a short payload, a footer mismatch, or a bad tag
pub fn decrypt(key: &SymmetricKey, token: &str, footer: &[u8]) -> PasetoResult<Vec<u8>> {
    use chacha20poly1305::aead::{AeadInPlace, KeyInit};
    use chacha20poly1305::{Tag, XChaCha20Poly1305, XNonce};

    let key = key.material_for(VERSION)?;
    let token = Token::parse(token, VERSION, Purpose::Local, footer)?;

    let payload = token.payload();
    if payload.len() < NONCE_SIZE + TAG_SIZE {
        return Err(PasetoError::AuthenticationFailed);
    }
    let (nonce, rest) = payload.split_at(NONCE_SIZE);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_SIZE);

    let pre_auth = PreAuthEncoded::encode(&[token.header().as_bytes(), nonce, footer]);

    let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| PasetoError::CryptoError)?;
    let mut plaintext = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            XNonce::from_slice(nonce),
            pre_auth.as_bytes(),
            &mut plaintext,
            Tag::from_slice(tag),
        )
        .map_err(|_| {
            tracing::debug!(version = %VERSION, "local token authentication failed");
            PasetoError::AuthenticationFailed
        })?;

    Ok(plaintext)
}

/// `n = BLAKE2b(msg=m, key=nonce_key, len=24)`
fn derive_nonce(nonce_key: &[u8; NONCE_SIZE], message: &[u8]) -> PasetoResult<[u8; NONCE_SIZE]> {
    use blake2::digest::{FixedOutput, KeyInit, Update};

    type Blake2bMac24 = blake2::Blake2bMac<blake2::digest::consts::U24>;

    let mut mac =
        <Blake2bMac24 as KeyInit>::new_from_slice(nonce_key).map_err(|_| PasetoError::CryptoError)?;
    <Blake2bMac24 as Update>::update(&mut mac, message);
    Ok(<Blake2bMac24 as FixedOutput>::finalize_fixed(mac).into())
}

// =============================================================================
// Public
// =============================================================================

/// Signs `message` into a `v2.public` token.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v2 signing key.
pub fn sign(key: &PrivateKey, message: &[u8], footer: &[u8]) -> PasetoResult<String> {
    use ed25519_dalek::Signer;

    let signing_key = key.ed25519(VERSION)?;
    let header = make_header(VERSION, Purpose::Public);

    let pre_auth = PreAuthEncoded::encode(&[header.as_bytes(), message, footer]);
    let signature = signing_key.sign(pre_auth.as_bytes());

    let mut payload = Vec::with_capacity(message.len() + SIGNATURE_SIZE);
    payload.extend_from_slice(message);
    payload.extend_from_slice(&signature.to_bytes());

    Ok(Token::new(VERSION, Purpose::Public, payload, footer).to_string())
}

/// Verifies a `v2.public` token and returns its message.
///
/// # Errors
///
/// - `KeyMismatch` if `key` is not a v2 verification key
/// - a framing error if the token is malformed
/// - `AuthenticationFailed` on a footer mismatch
/// - `InvalidSignature` if the signature does not verify
pub fn parse(key: &PublicKey, token: &str, footer: &[u8]) -> PasetoResult<Vec<u8>> {
    let verifying_key = key.ed25519(VERSION)?;
    let token = Token::parse(token, VERSION, Purpose::Public, footer)?;

    let payload = token.payload();
    if payload.len() < SIGNATURE_SIZE {
        return Err(PasetoError::InvalidSignature);
    }
    let (message, signature) = payload.split_at(payload.len() - SIGNATURE_SIZE);
    let signature =
        ed25519_dalek::Signature::from_slice(signature).map_err(|_| PasetoError::InvalidSignature)?;

    let pre_auth = PreAuthEncoded::encode(&[token.header().as_bytes(), message, footer]);
    verifying_key
        .verify_strict(pre_auth.as_bytes(), &signature)
        .map_err(|_| {
            tracing::debug!(version = %VERSION, "public token signature rejected");
            PasetoError::InvalidSignature
        })?;

    Ok(message.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: [u8; 32] = [
        0x70, 0x71, 0x72, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x7b, 0x7c, 0x7d, 0x7e,
        0x7f, 0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8a, 0x8b, 0x8c, 0x8d,
        0x8e, 0x8f,
    ];

    // v2.local with an all-zero nonce key, "secret" plaintext, no footer
    const ZERO_NONCE_TOKEN: &str = "v2.local.CH50H-HM5tzdK4kOmQ8KbIvrzJfjYUGuu5Vy9ARSFHy9owVDMYg3-8rwtJZQjN9ABHb2njzFkvpr5cOYuRyt7CRXnHt42L5yZ7siD-4l-FoNsC7J2OlvLlIwlG06mzQVunrFNb7Z3_CHM0PK5w";
    const SECRET_PAYLOAD: &[u8] =
        br#"{"data":"this is a secret message","exp":"2019-01-01T00:00:00+00:00"}"#;

    fn local_key() -> SymmetricKey {
        SymmetricKey::from_bytes(Version::V2, TEST_KEY)
    }

    #[test]
    fn test_local_known_answer() -> PasetoResult<()> {
        let key = local_key();
        let token = encrypt_with_nonce(&key, SECRET_PAYLOAD, b"", &[0u8; NONCE_SIZE])?;
        assert_eq!(token, ZERO_NONCE_TOKEN);
        assert_eq!(decrypt(&key, ZERO_NONCE_TOKEN, b"")?, SECRET_PAYLOAD);
        Ok(())
    }

    #[test]
    fn test_local_roundtrip() -> PasetoResult<()> {
        let key = local_key();
        let token = encrypt(&key, b"hello", b"footer")?;
        assert!(token.starts_with("v2.local."));
        assert_eq!(decrypt(&key, &token, b"footer")?, b"hello");
        Ok(())
    }

    #[test]
    fn test_local_nonce_depends_on_message() -> PasetoResult<()> {
        let nonce_key = [7u8; NONCE_SIZE];
        assert_ne!(derive_nonce(&nonce_key, b"a")?, derive_nonce(&nonce_key, b"b")?);
        assert_eq!(derive_nonce(&nonce_key, b"a")?, derive_nonce(&nonce_key, b"a")?);
        Ok(())
    }

    #[test]
    fn test_local_truncated_payload() {
        let key = local_key();
        // 39 bytes: one short of nonce + tag
        let token = format!("v2.local.{}", "A".repeat(52));
        assert!(matches!(decrypt(&key, &token, b""), Err(PasetoError::AuthenticationFailed)));
    }

    #[test]
    fn test_local_wrong_key_and_footer() -> PasetoResult<()> {
        let token = encrypt(&local_key(), b"hello", b"f1")?;
        let other = SymmetricKey::from_bytes(Version::V2, [0u8; 32]);
        assert!(matches!(decrypt(&other, &token, b"f1"), Err(PasetoError::AuthenticationFailed)));
        assert!(matches!(
            decrypt(&local_key(), &token, b"f2"),
            Err(PasetoError::AuthenticationFailed)
        ));
        Ok(())
    }

    #[test]
    fn test_local_rejects_v4_key() {
        let key = SymmetricKey::from_bytes(Version::V4, TEST_KEY);
        assert!(matches!(encrypt(&key, b"m", b""), Err(PasetoError::KeyMismatch)));
        assert!(matches!(decrypt(&key, ZERO_NONCE_TOKEN, b""), Err(PasetoError::KeyMismatch)));
    }

    #[test]
    fn test_public_roundtrip() -> PasetoResult<()> {
        let key = PrivateKey::v2_from_seed(&[0x33u8; 32]);
        let token = sign(&key, b"Frank Denis rocks", b"Cuon Alpinus")?;
        assert_eq!(parse(&key.public_key(), &token, b"Cuon Alpinus")?, b"Frank Denis rocks");
        Ok(())
    }

    #[test]
    fn test_public_is_deterministic() -> PasetoResult<()> {
        let key = PrivateKey::v2_from_seed(&[0x33u8; 32]);
        assert_eq!(sign(&key, b"m", b"")?, sign(&key, b"m", b"")?);
        Ok(())
    }

    #[test]
    fn test_public_rejects_local_token() -> PasetoResult<()> {
        let key = PrivateKey::v2_from_seed(&[0x33u8; 32]);
        let token = encrypt(&local_key(), b"m", b"")?;
        assert!(matches!(
            parse(&key.public_key(), &token, b""),
            Err(PasetoError::InvalidHeader)
        ));
        Ok(())
    }
}
