//! PASETO v4 ("Sodium Modern").
//!
//! - `v4.local`: XChaCha20 with keys derived by keyed BLAKE2b, tagged with
//!   keyed BLAKE2b-256 over `PAE(h, n, c, f, i)`.
//! - `v4.public`: Ed25519 over `PAE(h, m, f, i)`.
//!
//! Both purposes bind an implicit assertion `i` that is never transmitted.

use zeroize::Zeroize;

use crate::core::error::{PasetoError, PasetoResult};
use crate::core::header::make_header;
use crate::core::key::{PrivateKey, PublicKey, SymmetricKey};
use crate::core::pae::PreAuthEncoded;
use crate::core::provider::random_bytes;
use crate::core::token::Token;
use crate::core::version::{Purpose, Version};

const VERSION: Version = Version::V4;

/// Nonce size for `v4.local` (32 bytes).
pub const NONCE_SIZE: usize = 32;

/// Tag size for `v4.local` (keyed BLAKE2b-256).
pub const TAG_SIZE: usize = 32;

/// Ed25519 signature size.
pub const SIGNATURE_SIZE: usize = 64;

/// Domain separation string for encryption key derivation.
const ENCRYPTION_KEY_DOMAIN: &[u8] = b"paseto-encryption-key";

/// Domain separation string for authentication key derivation.
const AUTH_KEY_DOMAIN: &[u8] = b"paseto-auth-key-for-aead";

type Blake2bMac32 = blake2::Blake2bMac<blake2::digest::consts::U32>;
type Blake2bMac56 = blake2::Blake2bMac<blake2::digest::consts::U56>;

// =============================================================================
// Local
// =============================================================================

/// Encrypts `message` into a `v4.local` token with a random nonce.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v4 key and
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

/// Encrypts `message` into a `v4.local` token with a caller-supplied nonce.
///
/// Reusing a nonce under the same key breaks confidentiality. Use this only
/// to reproduce known-answer vectors.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v4 key.
pub fn encrypt_with_nonce(
    key: &SymmetricKey,
    message: &[u8],
    footer: &[u8],
    implicit_assertion: &[u8],
    nonce: &[u8; NONCE_SIZE],
) -> PasetoResult<String> {
    use chacha20::cipher::{KeyIvInit, StreamCipher};
    use chacha20::XChaCha20;

    let key = key.material_for(VERSION)?;
    let header = make_header(VERSION, Purpose::Local);

    let (mut encryption_key, xchacha_nonce, mut auth_key) = derive_keys(key, nonce)?;

    // c = XChaCha20(key=Ek, nonce=n2, plaintext=m)
    let mut ciphertext = message.to_vec();
    let mut cipher = XChaCha20::new(&encryption_key.into(), &xchacha_nonce.into());
    cipher.apply_keystream(&mut ciphertext);
    encryption_key.zeroize();

    // t = BLAKE2b-MAC(key=Ak, msg=PAE(h, n, c, f, i), len=32)
    let pre_auth = PreAuthEncoded::encode(&[
        header.as_bytes(),
        nonce,
        &ciphertext,
        footer,
        implicit_assertion,
    ]);
    let tag = authenticate(&auth_key, &pre_auth)?;
    auth_key.zeroize();

    let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len() + TAG_SIZE);
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(&ciphertext);
    payload.extend_from_slice(&tag);

    Ok(Token::new(VERSION, Purpose::Local, payload, footer).to_string())
}

/// Verifies and decrypts a `v4.local` token.
///
/// The tag is checked in constant time before any keystream is applied.
///
/// # Errors
///
/// - `KeyMismatch` if `key` is not a v4 key
/// - a framing error if the token is malformed
/// - `AuthenticationFailed` for a short payload, a footer mismatch, or a bad tag
pub fn decrypt(
    key: &SymmetricKey,
    token: &str,
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<Vec<u8>> {
    use chacha20::cipher::{KeyIvInit, StreamCipher};
    use chacha20::XChaCha20;
    use subtle::ConstantTimeEq;

    let key = key.material_for(VERSION)?;
    let token = Token::parse(token, VERSION, Purpose::Local, footer)?;

    let payload = token.payload();
    if payload.len() < NONCE_SIZE + TAG_SIZE {
        return Err(PasetoError::AuthenticationFailed);
    }
    let (nonce, rest) = payload.split_at(NONCE_SIZE);
    let (ciphertext, tag) = rest.split_at(rest.len() - TAG_SIZE);
    let nonce: &[u8; NONCE_SIZE] = nonce
        .try_into()
        .map_err(|_| PasetoError::AuthenticationFailed)?;

    let (mut encryption_key, xchacha_nonce, mut auth_key) = derive_keys(key, nonce)?;

    let pre_auth = PreAuthEncoded::encode(&[
        token.header().as_bytes(),
        nonce,
        ciphertext,
        footer,
        implicit_assertion,
    ]);
    let computed_tag = authenticate(&auth_key, &pre_auth)?;
    auth_key.zeroize();

    if !bool::from(computed_tag.as_slice().ct_eq(tag)) {
        encryption_key.zeroize();
        tracing::debug!(version = %VERSION, "local token authentication failed");
        return Err(PasetoError::AuthenticationFailed);
    }

    let mut plaintext = ciphertext.to_vec();
    let mut cipher = XChaCha20::new(&encryption_key.into(), &xchacha_nonce.into());
    cipher.apply_keystream(&mut plaintext);
    encryption_key.zeroize();

    Ok(plaintext)
}

/// Derives `(Ek, n2, Ak)` from the key and nonce.
///
/// - `tmp = BLAKE2b-MAC(key=k, msg="paseto-encryption-key" || n, len=56)`,
///   `Ek = tmp[0..32]`, `n2 = tmp[32..56]`
/// - `Ak = BLAKE2b-MAC(key=k, msg="paseto-auth-key-for-aead" || n, len=32)`
fn derive_keys(
    key: &[u8; 32],
    nonce: &[u8; NONCE_SIZE],
) -> PasetoResult<([u8; 32], [u8; 24], [u8; 32])> {
    use blake2::digest::{FixedOutput, KeyInit, Update};

    let mut kdf_mac =
        <Blake2bMac56 as KeyInit>::new_from_slice(key).map_err(|_| PasetoError::CryptoError)?;
    <Blake2bMac56 as Update>::update(&mut kdf_mac, ENCRYPTION_KEY_DOMAIN);
    <Blake2bMac56 as Update>::update(&mut kdf_mac, nonce);
    let mut tmp = <Blake2bMac56 as FixedOutput>::finalize_fixed(kdf_mac);

    let mut encryption_key = [0u8; 32];
    encryption_key.copy_from_slice(&tmp[..32]);

    let mut xchacha_nonce = [0u8; 24];
    xchacha_nonce.copy_from_slice(&tmp[32..56]);
    tmp.as_mut_slice().zeroize();

    let mut auth_mac =
        <Blake2bMac32 as KeyInit>::new_from_slice(key).map_err(|_| PasetoError::CryptoError)?;
    <Blake2bMac32 as Update>::update(&mut auth_mac, AUTH_KEY_DOMAIN);
    <Blake2bMac32 as Update>::update(&mut auth_mac, nonce);
    let auth_key: [u8; 32] = <Blake2bMac32 as FixedOutput>::finalize_fixed(auth_mac).into();

    Ok((encryption_key, xchacha_nonce, auth_key))
}

fn authenticate(auth_key: &[u8; 32], pre_auth: &PreAuthEncoded) -> PasetoResult<[u8; TAG_SIZE]> {
    use blake2::digest::{FixedOutput, KeyInit, Update};

    let mut tag_mac =
        <Blake2bMac32 as KeyInit>::new_from_slice(auth_key).map_err(|_| PasetoError::CryptoError)?;
    <Blake2bMac32 as Update>::update(&mut tag_mac, pre_auth.as_bytes());
    Ok(<Blake2bMac32 as FixedOutput>::finalize_fixed(tag_mac).into())
}

// =============================================================================
// Public
// =============================================================================

/// Signs `message` into a `v4.public` token.
///
/// # Errors
///
/// Returns `PasetoError::KeyMismatch` if `key` is not a v4 signing key.
pub fn sign(
    key: &PrivateKey,
    message: &[u8],
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<String> {
    use ed25519_dalek::Signer;

    let signing_key = key.ed25519(VERSION)?;
    let header = make_header(VERSION, Purpose::Public);

    let pre_auth =
        PreAuthEncoded::encode(&[header.as_bytes(), message, footer, implicit_assertion]);
    let signature = signing_key.sign(pre_auth.as_bytes());

    let mut payload = Vec::with_capacity(message.len() + SIGNATURE_SIZE);
    payload.extend_from_slice(message);
    payload.extend_from_slice(&signature.to_bytes());

    Ok(Token::new(VERSION, Purpose::Public, payload, footer).to_string())
}

/// Verifies a `v4.public` token and returns its message.
///
/// # Errors
///
/// - `KeyMismatch` if `key` is not a v4 verification key
/// - a framing error if the token is malformed
/// - `AuthenticationFailed` on a footer mismatch
/// - `InvalidSignature` if the signature does not verify
pub fn parse(
    key: &PublicKey,
    token: &str,
    footer: &[u8],
    implicit_assertion: &[u8],
) -> PasetoResult<Vec<u8>> {
    let verifying_key = key.ed25519(VERSION)?;
    let token = Token::parse(token, VERSION, Purpose::Public, footer)?;

    let payload = token.payload();
    if payload.len() < SIGNATURE_SIZE {
        return Err(PasetoError::InvalidSignature);
    }
    let (message, signature) = payload.split_at(payload.len() - SIGNATURE_SIZE);
    let signature =
        ed25519_dalek::Signature::from_slice(signature).map_err(|_| PasetoError::InvalidSignature)?;

    let pre_auth = PreAuthEncoded::encode(&[
        token.header().as_bytes(),
        message,
        footer,
        implicit_assertion,
    ]);
    verifying_key
        .verify_strict(pre_auth.as_bytes(), &signature)
        .map_err(|_| {
            tracing::debug!(version = %VERSION, "public token signature rejected");
            PasetoError::InvalidSignature
        })?;

    Ok(message.to_vec())
}
