//! PASETO v3 ("NIST Modern").
//!
//! - `v3.local`: AES-256-CTR + HMAC-SHA384 over `PAE(h, n, c, f, i)`, with
//!   unsalted HKDF-SHA384 keyed by `info || n`.
//! - `v3.public`: ECDSA over P-384 with SHA-384 (RFC 6979 nonces), signing
//!   `PAE(pk, h, m, f, i)` where `pk` is the 49-byte compressed public point.
//!   Signatures are `r || s`, 48 bytes each, and are not low-s normalized.

use zeroize::Zeroize;

use crate::core::error::{PasetoError, PasetoResult};
use crate::core::header::make_header;
use crate::core::key::{compressed_point, PrivateKey, PublicKey, SymmetricKey};
use crate::core::pae::PreAuthEncoded;
use crate::core::provider::random_bytes;
use crate::core::token::Token;
use crate::core::version::{Purpose, Version};

const VERSION: Version = Version::V3;

/// Nonce size for `v3.local` (32 bytes).
pub const NONCE_SIZE: usize = 32;

/// Tag size for `v3.local` (HMAC-SHA384).
pub const TAG_SIZE: usize = 48;

/// ECDSA P-384 signature size (`r || s`).
pub const SIGNATURE_SIZE: usize = 96;

/// HKDF info prefix for the encryption key and counter nonce.
const ENCRYPTION_KEY_INFO: &[u8] = b"paseto-encryption-key";

/// HKDF info prefix for the authentication key.
const AUTH_KEY_INFO: &[u8] = b"paseto-auth-key-for-aead";

type HmacSha384 = hmac::Hmac<sha2::Sha384>;
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

// =============================================================================
// Local
// =============================================================================

/// Encrypts `message` into a `v3.local` token with a random nonce.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v3 key and
/// `PasetoError::CryptoError` if the entropy source fails.
pub fn encrypt(
    key: &SymmetricKey,
    message: &[u8],
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<String> {
    let nonce = random_bytes::<NONCE_SIZE>()?;
    encrypt_with_nonce(key, message, footer, implicit_assertion, &nonce)
}

/// Encrypts `message` into a `v3.local` token with a caller-supplied nonce.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v3 key.
pub fn encrypt_with_nonce(
    key: &SymmetricKey,
    message: &[u8],
    footer: &[u8],
    implicit_assertion: &[u8],
    nonce: &[u8; NONCE_SIZE],
) -> PasetoResult<String> {
    use aes::cipher::{KeyIvInit, StreamCipher};

    let key = key.material_for(VERSION)?;
    let header = make_header(VERSION, Purpose::Local);

    let mut keys = DerivedKeys::new(key, nonce)?;

    let mut ciphertext = message.to_vec();
    let mut cipher = Aes256Ctr::new_from_slices(keys.encryption_key(), keys.counter_nonce())
        .map_err(|_| PasetoError::CryptoError)?;
    cipher.apply_keystream(&mut ciphertext);

    let pre_auth = PreAuthEncoded::encode(&[
        header.as_bytes(),
        nonce,
        &ciphertext,
        footer,
        implicit_assertion,
    ]);
    let tag = authenticate(&keys.auth_key, &pre_auth)?;
    keys.zeroize();

    let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len() + TAG_SIZE);
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(&ciphertext);
    payload.extend_from_slice(&tag);

    Ok(Token::new(VERSION, Purpose::Local, payload, footer).to_string())
}

/// Verifies and decrypts a `v3.local` token.
///
/// The HMAC tag is compared in constant time before decryption.
///
/// # Errors
///
/// - `KeyMismatch` if `key` is not a v3 key
/// - a framing error if the token is malformed
/// - `AuthenticationFailed` for a short payload, a footer mismatch, or a bad tag
pub fn decrypt(
    key: &SymmetricKey,
    token: &str,
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<Vec<u8>> {
    use aes::cipher::{KeyIvInit, StreamCipher};
    use subtle::ConstantTimeEq;

    let key = key.material_for(VERSION)?;
    let token = Token::parse(token, VERSION, Purpose::Local, footer)?;

    let payload = token.payload();
    if payload.len() < NONCE_SIZE + TAG_SIZE {
        return Err(PasetoError::AuthenticationFailed);
    }
    let (nonce, rest) = payload.split_at(NONCE_SIZE);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_SIZE);

    let mut keys = DerivedKeys::new(key, nonce)?;

    let pre_auth = PreAuthEncoded::encode(&[
        token.header().as_bytes(),
        nonce,
        ciphertext,
        footer,
        implicit_assertion,
    ]);
    let computed_tag = authenticate(&keys.auth_key, &pre_auth)?;

    if !bool::from(computed_tag.as_slice().ct_eq(tag)) {
        keys.zeroize();
        tracing::debug!(version = %VERSION, "local token authentication failed");
        return Err(PasetoError::AuthenticationFailed);
    }

    let mut plaintext = ciphertext.to_vec();
    let mut cipher = Aes256Ctr::new_from_slices(keys.encryption_key(), keys.counter_nonce())
        .map_err(|_| PasetoError::CryptoError)?;
    cipher.apply_keystream(&mut plaintext);
    keys.zeroize();

    Ok(plaintext)
}

/// `tmp = HKDF-SHA384(ikm=k, info="paseto-encryption-key" || n, len=48)`
/// split into `Ek = tmp[0..32]` and `n2 = tmp[32..48]`, plus
/// `Ak = HKDF-SHA384(ikm=k, info="paseto-auth-key-for-aead" || n, len=48)`.
#[derive(Zeroize)]
struct DerivedKeys {
    encryption_material: [u8; 48],
    auth_key: [u8; 48],
}

impl DerivedKeys {
    fn new(key: &[u8; 32], nonce: &[u8]) -> PasetoResult<Self> {
        use hkdf::Hkdf;

        let hkdf = Hkdf::<sha2::Sha384>::new(None, key);

        let mut encryption_material = [0u8; 48];
        hkdf.expand_multi_info(&[ENCRYPTION_KEY_INFO, nonce], &mut encryption_material)
            .map_err(|_| PasetoError::CryptoError)?;

        let mut auth_key = [0u8; 48];
        hkdf.expand_multi_info(&[AUTH_KEY_INFO, nonce], &mut auth_key)
            .map_err(|_| PasetoError::CryptoError)?;

        Ok(Self {
            encryption_material,
            auth_key,
        })
    }

    fn encryption_key(&self) -> &[u8] {
        &self.encryption_material[..32]
    }

    fn counter_nonce(&self) -> &[u8] {
        &self.encryption_material[32..]
    }
}

fn authenticate(auth_key: &[u8; 48], pre_auth: &PreAuthEncoded) -> PasetoResult<[u8; TAG_SIZE]> {
    use hmac::Mac;

    let mut mac = HmacSha384::new_from_slice(auth_key).map_err(|_| PasetoError::CryptoError)?;
    mac.update(pre_auth.as_bytes());

    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    Ok(tag)
}

// =============================================================================
// Public
// =============================================================================

/// Signs `message` into a `v3.public` token.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v3 signing key and
/// `PasetoError::CryptoError` if ECDSA signing fails.
pub fn sign(
    key: &PrivateKey,
    message: &[u8],
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<String> {
    use p384::ecdsa::signature::Signer;
    use p384::ecdsa::Signature;

    let signing_key = key.p384()?;
    let header = make_header(VERSION, Purpose::Public);
    let public_point = compressed_point(signing_key.verifying_key());

    let pre_auth = PreAuthEncoded::encode(&[
        &public_point,
        header.as_bytes(),
        message,
        footer,
        implicit_assertion,
    ]);
    let signature: Signature = signing_key
        .try_sign(pre_auth.as_bytes())
        .map_err(|_| PasetoError::CryptoError)?;

    let mut payload = Vec::with_capacity(message.len() + SIGNATURE_SIZE);
    payload.extend_from_slice(message);
    payload.extend_from_slice(&signature.to_bytes());

    Ok(Token::new(VERSION, Purpose::Public, payload, footer).to_string())
}

/// Verifies a `v3.public` token and returns its message.
///
/// # Errors
///
/// - `KeyMismatch` if `key` is not a v3 verification key
/// - a framing error if the token is malformed
/// - `AuthenticationFailed` on a footer mismatch
/// - `InvalidSignature` if the signature does not verify
pub fn parse(
    key: &PublicKey,
    token: &str,
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<Vec<u8>> {
    use p384::ecdsa::signature::Verifier;
    use p384::ecdsa::Signature;

    let verifying_key = key.p384()?;
    let token = Token::parse(token, VERSION, Purpose::Public, footer)?;

    let payload = token.payload();
    if payload.len() < SIGNATURE_SIZE {
        return Err(PasetoError::InvalidSignature);
    }
    let (message, signature) = payload.split_at(payload.len() - SIGNATURE_SIZE);
    let signature = Signature::from_slice(signature).map_err(|_| PasetoError::InvalidSignature)?;

    let public_point = compressed_point(verifying_key);
    let pre_auth = PreAuthEncoded::encode(&[
        &public_point,
        token.header().as_bytes(),
        message,
        footer,
        implicit_assertion,
    ]);
    verifying_key
        .verify(pre_auth.as_bytes(), &signature)
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

    fn local_key() -> SymmetricKey {
        SymmetricKey::from_bytes(Version::V3, TEST_KEY)
    }

    fn signing_key() -> PasetoResult<PrivateKey> {
        let mut scalar = [0u8; 48];
        scalar[47] = 0x2a;
        scalar[0] = 0x01;
        PrivateKey::v3_from_bytes(&scalar)
    }

    #[test]
    fn test_local_roundtrip() -> PasetoResult<()> {
        let key = local_key();
        let token = encrypt(&key, b"secret", b"footer", b"assertion")?;
        assert!(token.starts_with("v3.local."));
        assert_eq!(decrypt(&key, &token, b"footer", b"assertion")?, b"secret");
        Ok(())
    }

    #[test]
    fn test_local_fixed_nonce_layout() -> PasetoResult<()> {
        let key = local_key();
        let nonce = [0x5au8; NONCE_SIZE];
        let token = encrypt_with_nonce(&key, b"0123456789", b"", b"", &nonce)?;
        let parsed = Token::parse(&token, VERSION, Purpose::Local, b"")?;
        assert_eq!(parsed.payload().len(), NONCE_SIZE + 10 + TAG_SIZE);
        assert_eq!(&parsed.payload()[..NONCE_SIZE], &nonce);
        Ok(())
    }

    #[test]
    fn test_local_derived_keys_depend_on_nonce() -> PasetoResult<()> {
        let a = DerivedKeys::new(&TEST_KEY, &[0u8; NONCE_SIZE])?;
        let b = DerivedKeys::new(&TEST_KEY, &[1u8; NONCE_SIZE])?;
        assert_ne!(a.encryption_material, b.encryption_material);
        assert_ne!(a.auth_key, b.auth_key);
        assert_ne!(a.encryption_material, a.auth_key);
        Ok(())
    }

    #[test]
    fn test_local_implicit_assertion_binding() -> PasetoResult<()> {
        let key = local_key();
        let token = encrypt(&key, b"secret", b"", b"ctx-1")?;
        assert!(matches!(
            decrypt(&key, &token, b"", b"ctx-2"),
            Err(PasetoError::AuthenticationFailed)
        ));
        Ok(())
    }

    #[test]
    fn test_local_rejects_other_keys() {
        let key = SymmetricKey::from_bytes(Version::V1, TEST_KEY);
        assert!(matches!(encrypt(&key, b"m", b"", b""), Err(PasetoError::KeyMismatch)));
    }

    #[test]
    fn test_public_roundtrip() -> PasetoResult<()> {
        let key = signing_key()?;
        let public = key.public_key();
        let token = sign(&key, b"message", b"footer", b"assertion")?;
        assert!(token.starts_with("v3.public."));
        assert_eq!(parse(&public, &token, b"footer", b"assertion")?, b"message");
        Ok(())
    }

    #[test]
    fn test_public_is_deterministic() -> PasetoResult<()> {
        let key = signing_key()?;
        assert_eq!(sign(&key, b"m", b"", b"")?, sign(&key, b"m", b"", b"")?);
        Ok(())
    }

    #[test]
    fn test_public_signature_size() -> PasetoResult<()> {
        let key = signing_key()?;
        let token = sign(&key, b"abc", b"", b"")?;
        let parsed = Token::parse(&token, VERSION, Purpose::Public, b"")?;
        assert_eq!(parsed.payload().len(), 3 + SIGNATURE_SIZE);
        Ok(())
    }

    #[test]
    fn test_public_binds_public_key() -> PasetoResult<()> {
        let token = sign(&signing_key()?, b"message", b"", b"")?;
        let other = PrivateKey::generate(Version::V3)?.public_key();
        assert!(matches!(parse(&other, &token, b"", b""), Err(PasetoError::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn test_public_implicit_assertion_binding() -> PasetoResult<()> {
        let key = signing_key()?;
        let token = sign(&key, b"message", b"", b"a")?;
        assert!(matches!(
            parse(&key.public_key(), &token, b"", b""),
            Err(PasetoError::InvalidSignature)
        ));
        Ok(())
    }

    #[test]
    fn test_public_zero_signature_rejected() -> PasetoResult<()> {
        use base64::prelude::*;

        let key = signing_key()?;
        let mut payload = b"message".to_vec();
        payload.extend_from_slice(&[0u8; SIGNATURE_SIZE]);
        let token = format!("v3.public.{}", BASE64_URL_SAFE_NO_PAD.encode(payload));
        assert!(matches!(
            parse(&key.public_key(), &token, b"", b""),
            Err(PasetoError::InvalidSignature)
        ));
        Ok(())
    }
}
