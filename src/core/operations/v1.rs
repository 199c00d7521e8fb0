//! PASETO v1 ("NIST Original").
//!
//! - `v1.local`: AES-256-CTR + HMAC-SHA384 over `PAE(h, n, c, f)`.
//!   `n = HMAC-SHA384(key=b, msg=m)[0..32]` for random `b`; `Ek`/`Ak` come
//!   from HKDF-SHA384 salted with `n[0..16]`; the CTR IV is `n[16..32]`.
//! - `v1.public`: RSASSA-PSS with SHA-384 and MGF1-SHA384 over `PAE(h, m, f)`,
//!   2048-bit keys only.
//!
//! # Security Warning
//!
//! **v1 public tokens use the `rsa` crate which is affected by
//! [RUSTSEC-2023-0071] (Marvin Attack).** Use v4 for new deployments.
//!
//! [RUSTSEC-2023-0071]: https://rustsec.org/advisories/RUSTSEC-2023-0071

use zeroize::Zeroize;

use crate::core::error::{PasetoError, PasetoResult};
use crate::core::header::make_header;
use crate::core::key::{PrivateKey, PublicKey, SymmetricKey};
use crate::core::pae::PreAuthEncoded;
use crate::core::provider::random_bytes;
use crate::core::token::Token;
use crate::core::version::{Purpose, Version};

const VERSION: Version = Version::V1;

/// Nonce size for `v1.local` (32 bytes).
pub const NONCE_SIZE: usize = 32;

/// Tag size for `v1.local` (HMAC-SHA384).
pub const TAG_SIZE: usize = 48;

/// RSA-2048 signature size.
pub const SIGNATURE_SIZE: usize = 256;

/// HKDF info for the encryption key.
const ENCRYPTION_KEY_INFO: &[u8] = b"paseto-encryption-key";

/// HKDF info for the authentication key.
const AUTH_KEY_INFO: &[u8] = b"paseto-auth-key-for-aead";

type HmacSha384 = hmac::Hmac<sha2::Sha384>;
type Aes256Ctr = ctr::Ctr128BE<aes::Aes256>;

// =============================================================================
// Local
// =============================================================================

/// Encrypts `message` into a `v1.local` token.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v1 key and
/// `PasetoError::CryptoError` if the entropy source fails.
pub fn encrypt(key: &SymmetricKey, message: &[u8], footer: &[u8]) -> PasetoResult<String> {
    let nonce_key = random_bytes::<NONCE_SIZE>()?;
    encrypt_with_nonce(key, message, footer, &nonce_key)
}

/// Encrypts `message` with a caller-supplied HMAC nonce key.
///
/// The nonce is still derived from `nonce_key` and the message.
/// Use this only to reproduce known-answer vectors.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v1 key.
pub fn encrypt_with_nonce(
    key: &SymmetricKey,
    message: &[u8],
    footer: &[u8],
    nonce_key: &[u8; NONCE_SIZE],
) -> PasetoResult<String> {
    use aes::cipher::{KeyIvInit, StreamCipher};

    let key = key.material_for(VERSION)?;
    let header = make_header(VERSION, Purpose::Local);

    let nonce = derive_nonce(nonce_key, message)?;
    let (mut encryption_key, mut auth_key) = derive_keys(key, &nonce)?;

    let mut ciphertext = message.to_vec();
    let mut cipher = Aes256Ctr::new_from_slices(&encryption_key, &nonce[16..])
        .map_err(|_| PasetoError::CryptoError)?;
    cipher.apply_keystream(&mut ciphertext);
    encryption_key.zeroize();

    let pre_auth = PreAuthEncoded::encode(&[header.as_bytes(), &nonce, &ciphertext, footer]);
    let tag = authenticate(&auth_key, &pre_auth)?;
    auth_key.zeroize();

    let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len() + TAG_SIZE);
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);
    payload.extend_from_slice(&tag);

    Ok(Token::new(VERSION, Purpose::Local, payload, footer).to_string())
}

/// Verifies and decrypts a `v1.local` token.
///
/// The HMAC tag is compared in constant time before decryption.
///
/// # Errors
///
/// - `KeyMismatch` if `key` is not a v1 key
/// - a framing error if the token is malformed
/// - `AuthenticationFailed` for a short payload, a footer mismatch, or a bad tag
pub fn decrypt(key: &SymmetricKey, token: &str, footer: &[u8]) -> PasetoResult<Vec<u8>> {
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

    let (mut encryption_key, mut auth_key) = derive_keys(key, nonce)?;

    let pre_auth =
        PreAuthEncoded::encode(&[token.header().as_bytes(), nonce, ciphertext, footer]);
    let computed_tag = authenticate(&auth_key, &pre_auth)?;
    auth_key.zeroize();

    if !bool::from(computed_tag.as_slice().ct_eq(tag)) {
        encryption_key.zeroize();
        tracing::debug!(version = %VERSION, "local token authentication failed");
        return Err(PasetoError::AuthenticationFailed);
    }

    let mut plaintext = ciphertext.to_vec();
    let mut cipher = Aes256Ctr::new_from_slices(&encryption_key, &nonce[16..])
        .map_err(|_| PasetoError::CryptoError)?;
    cipher.apply_keystream(&mut plaintext);
    encryption_key.zeroize();

    Ok(plaintext)
}

/// `n = HMAC-SHA384(key=nonce_key, msg=m)[0..32]`
fn derive_nonce(nonce_key: &[u8; NONCE_SIZE], message: &[u8]) -> PasetoResult<[u8; NONCE_SIZE]> {
    use hmac::Mac;

    let mut mac = HmacSha384::new_from_slice(nonce_key).map_err(|_| PasetoError::CryptoError)?;
    mac.update(message);
    let digest = mac.finalize().into_bytes();

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&digest[..NONCE_SIZE]);
    Ok(nonce)
}

/// `Ek`, `Ak` = HKDF-SHA384(ikm=k, salt=n[0..16], info), 32 bytes each.
fn derive_keys(key: &[u8; 32], nonce: &[u8]) -> PasetoResult<([u8; 32], [u8; 32])> {
    use hkdf::Hkdf;

    let hkdf = Hkdf::<sha2::Sha384>::new(Some(&nonce[..16]), key);

    let mut encryption_key = [0u8; 32];
    hkdf.expand(ENCRYPTION_KEY_INFO, &mut encryption_key)
        .map_err(|_| PasetoError::CryptoError)?;

    let mut auth_key = [0u8; 32];
    hkdf.expand(AUTH_KEY_INFO, &mut auth_key)
        .map_err(|_| PasetoError::CryptoError)?;

    Ok((encryption_key, auth_key))
}

fn authenticate(auth_key: &[u8; 32], pre_auth: &PreAuthEncoded) -> PasetoResult<[u8; TAG_SIZE]> {
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

/// Signs `message` into a `v1.public` token.
///
/// PSS signing is randomized, so two signatures of the same message differ.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v1 signing key and
/// `PasetoError::CryptoError` if RSA signing fails.
pub fn sign(key: &PrivateKey, message: &[u8], footer: &[u8]) -> PasetoResult<String> {
    use rsa::rand_core::OsRng;
    use rsa::signature::{RandomizedSigner, SignatureEncoding};

    let signing_key = key.rsa()?;
    let header = make_header(VERSION, Purpose::Public);

    let pre_auth = PreAuthEncoded::encode(&[header.as_bytes(), message, footer]);
    let signature = signing_key
        .try_sign_with_rng(&mut OsRng, pre_auth.as_bytes())
        .map_err(|_| PasetoError::CryptoError)?
        .to_bytes();

    if signature.len() != SIGNATURE_SIZE {
        return Err(PasetoError::CryptoError);
    }

    let mut payload = Vec::with_capacity(message.len() + SIGNATURE_SIZE);
    payload.extend_from_slice(message);
    payload.extend_from_slice(&signature);

    Ok(Token::new(VERSION, Purpose::Public, payload, footer).to_string())
}

/// Verifies a `v1.public` token and returns its message.
///
/// # Errors
///
/// - `KeyMismatch` if `key` is not a v1 verification key
/// - a framing error if the token is malformed
/// - `AuthenticationFailed` on a footer mismatch
/// - `InvalidSignature` if the signature does not verify
pub fn parse(key: &PublicKey, token: &str, footer: &[u8]) -> PasetoResult<Vec<u8>> {
    use rsa::pss::Signature;
    use rsa::signature::Verifier;

    let verifying_key = key.rsa()?;
    let token = Token::parse(token, VERSION, Purpose::Public, footer)?;

    let payload = token.payload();
    if payload.len() < SIGNATURE_SIZE {
        return Err(PasetoError::InvalidSignature);
    }
    let (message, signature) = payload.split_at(payload.len() - SIGNATURE_SIZE);
    let signature = Signature::try_from(signature).map_err(|_| PasetoError::InvalidSignature)?;

    let pre_auth = PreAuthEncoded::encode(&[token.header().as_bytes(), message, footer]);
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

    const SIGNED_PAYLOAD: &[u8] =
        br#"{"data":"this is a signed message","exp":"2019-01-01T00:00:00+00:00"}"#;

    // v1.local with an all-zero nonce key, signed-message plaintext, no footer
    const ZERO_NONCE_TOKEN: &str = "v1.local.WzhIh1MpbqVNXNt7-HbWvL-JwAym3Tomad9Pc2nl7wK87vGraUVvn2bs8BBNo7jbukCNrkVID0jCK2vr5bP18G78j1bOTbBcP9HZzqnraEdspcjd_PvrxDEhj9cS2MG5fmxtvuoHRp3M24HvxTtql9z26KTfPWxJN5bAJaAM6gos8fnfjJO8oKiqQMaiBP_Cqncmqw8";

    fn local_key() -> SymmetricKey {
        SymmetricKey::from_bytes(Version::V1, TEST_KEY)
    }

    #[test]
    fn test_local_known_answer() -> PasetoResult<()> {
        let key = local_key();
        let token = encrypt_with_nonce(&key, SIGNED_PAYLOAD, b"", &[0u8; NONCE_SIZE])?;
        assert_eq!(token, ZERO_NONCE_TOKEN);
        assert_eq!(decrypt(&key, ZERO_NONCE_TOKEN, b"")?, SIGNED_PAYLOAD);
        Ok(())
    }

    #[test]
    fn test_local_roundtrip() -> PasetoResult<()> {
        let key = local_key();
        let footer = br#"{"kid":"UbkK8Y6iv4GZhFp6Tx3IWLWLfNXSEvJcdT3zdR65YZxo"}"#;
        let token = encrypt(&key, SIGNED_PAYLOAD, footer)?;
        assert_eq!(decrypt(&key, &token, footer)?, SIGNED_PAYLOAD);
        Ok(())
    }

    #[test]
    fn test_local_wrong_footer() -> PasetoResult<()> {
        let key = local_key();
        let token = encrypt(&key, SIGNED_PAYLOAD, b"Test case footer")?;
        assert!(matches!(
            decrypt(&key, &token, b"Wrong footer"),
            Err(PasetoError::AuthenticationFailed)
        ));
        Ok(())
    }

    #[test]
    fn test_local_short_payload() {
        // 79 bytes decoded: one short of nonce + tag
        let token = format!("v1.local.{}", "A".repeat(106));
        assert!(matches!(
            decrypt(&local_key(), &token, b""),
            Err(PasetoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_local_empty_token() {
        assert!(matches!(
            decrypt(&local_key(), "v1.local.", b""),
            Err(PasetoError::InvalidFormat)
        ));
    }

    #[test]
    fn test_local_rejects_other_keys() {
        let key = SymmetricKey::from_bytes(Version::V3, TEST_KEY);
        assert!(matches!(encrypt(&key, b"m", b""), Err(PasetoError::KeyMismatch)));
        assert!(matches!(decrypt(&key, ZERO_NONCE_TOKEN, b""), Err(PasetoError::KeyMismatch)));
    }

    #[test]
    fn test_public_rejects_other_keys() {
        let ed25519 = PrivateKey::v2_from_seed(&[1u8; 32]);
        assert!(matches!(sign(&ed25519, b"m", b""), Err(PasetoError::KeyMismatch)));
        assert!(matches!(
            parse(&ed25519.public_key(), "v1.public.AAAA", b""),
            Err(PasetoError::KeyMismatch)
        ));
    }
}
