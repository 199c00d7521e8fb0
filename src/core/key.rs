//! Key model.
//!
//! Three key kinds, each bound to exactly one [`Version`]:
//!
//! | Kind | Purpose | V1 | V2 / V4 | V3 |
//! |------|---------|----|---------|----|
//! | [`SymmetricKey`] | local | 32 bytes | 32 bytes | 32 bytes |
//! | [`PrivateKey`] | public | RSA-2048 | Ed25519, 64-byte keypair | P-384 scalar (48 bytes) |
//! | [`PublicKey`] | public | RSA-2048 | Ed25519, 32 bytes | P-384 point (49-byte compressed) |
//!
//! Length and material checks happen when a key is constructed. The
//! version/purpose check happens in the suites before any primitive is
//! called. No key type prints its material.

use core::fmt::{self, Debug};

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::core::error::{PasetoError, PasetoResult};
use crate::core::provider::random_bytes;
use crate::core::version::{Purpose, Version};

/// Length of every symmetric key.
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Length of an Ed25519 keypair (`seed || public key`).
pub const ED25519_KEYPAIR_SIZE: usize = 64;

/// Length of an Ed25519 public key.
pub const ED25519_PUBLIC_KEY_SIZE: usize = 32;

/// Length of a P-384 secret scalar.
pub const P384_SECRET_KEY_SIZE: usize = 48;

/// Length of a compressed P-384 public point.
pub const P384_COMPRESSED_PUBLIC_KEY_SIZE: usize = 49;

/// Uncompressed SEC1 P-384 point: `0x04 || x || y`.
pub const P384_UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 97;

/// Required RSA modulus size for V1.
pub const RSA_MODULUS_BITS: usize = 2048;

fn check_rsa_modulus(n: &rsa::BigUint) -> PasetoResult<()> {
    if n.bits() != RSA_MODULUS_BITS {
        return Err(PasetoError::InvalidKey);
    }
    Ok(())
}

// =============================================================================
// Symmetric keys
// =============================================================================

/// A 32-byte key for local (encrypted) tokens.
///
/// # Security
///
/// - Key material is zeroized on drop
/// - Debug output redacts the key
/// - Equality comparison uses constant-time comparison
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SymmetricKey {
    material: [u8; SYMMETRIC_KEY_SIZE],
    #[zeroize(skip)]
    version: Version,
}

impl SymmetricKey {
    /// Creates a key from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::InvalidKey` unless `bytes` is exactly 32 bytes.
    pub fn new(version: Version, bytes: &[u8]) -> PasetoResult<Self> {
        let material: [u8; SYMMETRIC_KEY_SIZE] =
            bytes.try_into().map_err(|_| PasetoError::InvalidKey)?;
        Ok(Self::from_bytes(version, material))
    }

    /// Creates a key from an array.
    #[must_use]
    pub const fn from_bytes(version: Version, material: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
        Self { material, version }
    }

    /// Generates a random key.
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::CryptoError` if the OS entropy source fails.
    pub fn generate(version: Version) -> PasetoResult<Self> {
        let mut material = random_bytes::<SYMMETRIC_KEY_SIZE>()?;
        let key = Self::from_bytes(version, material);
        material.zeroize();
        Ok(key)
    }

    /// Returns the version this key is bound to.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns a reference to the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.material
    }

    /// Returns the material if this key is bound to `version`.
    pub(crate) fn material_for(&self, version: Version) -> PasetoResult<&[u8; SYMMETRIC_KEY_SIZE]> {
        if self.version != version {
            tracing::debug!(key = %self.version, requested = %version, "symmetric key version mismatch");
            return Err(PasetoError::KeyMismatch);
        }
        Ok(&self.material)
    }
}

impl Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("version", &self.version.prefix())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && bool::from(self.material.ct_eq(&other.material))
    }
}

impl Eq for SymmetricKey {}

// =============================================================================
// Private (signing) keys
// =============================================================================

/// PSS signing key; salt length is the SHA-384 output size.
type RsaSigningKey = rsa::pss::SigningKey<sha2::Sha384>;
type RsaVerifyingKey = rsa::pss::VerifyingKey<sha2::Sha384>;

#[derive(Clone)]
enum SigningMaterial {
    V1(RsaSigningKey),
    V2(ed25519_dalek::SigningKey),
    V3(p384::ecdsa::SigningKey),
    V4(ed25519_dalek::SigningKey),
}

/// A signing key for public tokens.
#[derive(Clone)]
pub struct PrivateKey(SigningMaterial);

impl PrivateKey {
    /// Wraps an RSA private key for V1.
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::InvalidKey` unless the modulus is 2048 bits.
    pub fn v1_from_rsa(key: rsa::RsaPrivateKey) -> PasetoResult<Self> {
        use rsa::traits::PublicKeyParts;

        check_rsa_modulus(key.n())?;
        Ok(Self(SigningMaterial::V1(RsaSigningKey::new(key))))
    }

    /// Creates a V2 key from a 64-byte Ed25519 keypair (`seed || public key`).
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::InvalidKey` for a wrong length or if the public
    /// half does not belong to the seed.
    pub fn v2_from_bytes(bytes: &[u8]) -> PasetoResult<Self> {
        Ok(Self(SigningMaterial::V2(ed25519_from_keypair(bytes)?)))
    }

    /// Creates a V2 key from a 32-byte Ed25519 seed.
    #[must_use]
    pub fn v2_from_seed(seed: &[u8; 32]) -> Self {
        Self(SigningMaterial::V2(ed25519_dalek::SigningKey::from_bytes(seed)))
    }

    /// Creates a V3 key from a 48-byte big-endian P-384 scalar.
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::InvalidKey` for a wrong length, zero or an
    /// out-of-range scalar.
    pub fn v3_from_bytes(bytes: &[u8]) -> PasetoResult<Self> {
        if bytes.len() != P384_SECRET_KEY_SIZE {
            return Err(PasetoError::InvalidKey);
        }
        let key = p384::ecdsa::SigningKey::from_slice(bytes).map_err(|_| PasetoError::InvalidKey)?;
        Ok(Self(SigningMaterial::V3(key)))
    }

    /// Wraps an existing P-384 secret key for V3.
    #[must_use]
    pub fn v3_from_secret_key(key: p384::SecretKey) -> Self {
        Self(SigningMaterial::V3(p384::ecdsa::SigningKey::from(key)))
    }

    /// Creates a V4 key from a 64-byte Ed25519 keypair (`seed || public key`).
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::InvalidKey` for a wrong length or if the public
    /// half does not belong to the seed.
    pub fn v4_from_bytes(bytes: &[u8]) -> PasetoResult<Self> {
        Ok(Self(SigningMaterial::V4(ed25519_from_keypair(bytes)?)))
    }

    /// Creates a V4 key from a 32-byte Ed25519 seed.
    #[must_use]
    pub fn v4_from_seed(seed: &[u8; 32]) -> Self {
        Self(SigningMaterial::V4(ed25519_dalek::SigningKey::from_bytes(seed)))
    }

    /// Generates a random signing key.
    ///
    /// V1 generation builds a fresh RSA-2048 key and is slow.
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::CryptoError` if the OS entropy source fails.
    pub fn generate(version: Version) -> PasetoResult<Self> {
        match version {
            Version::V1 => {
                use rsa::rand_core::OsRng;

                let key = rsa::RsaPrivateKey::new(&mut OsRng, RSA_MODULUS_BITS)
                    .map_err(|_| PasetoError::CryptoError)?;
                Self::v1_from_rsa(key)
            }
            Version::V2 | Version::V4 => {
                let mut seed = random_bytes::<32>()?;
                let key = if version == Version::V2 {
                    Self::v2_from_seed(&seed)
                } else {
                    Self::v4_from_seed(&seed)
                };
                seed.zeroize();
                Ok(key)
            }
            Version::V3 => {
                // A uniformly random 48-byte string is a valid scalar with
                // overwhelming probability; retry the rare miss.
                for _ in 0..8 {
                    let mut scalar = random_bytes::<P384_SECRET_KEY_SIZE>()?;
                    let key = Self::v3_from_bytes(&scalar);
                    scalar.zeroize();
                    if key.is_ok() {
                        return key;
                    }
                }
                Err(PasetoError::CryptoError)
            }
        }
    }

    /// Returns the version this key is bound to.
    #[must_use]
    pub const fn version(&self) -> Version {
        match self.0 {
            SigningMaterial::V1(_) => Version::V1,
            SigningMaterial::V2(_) => Version::V2,
            SigningMaterial::V3(_) => Version::V3,
            SigningMaterial::V4(_) => Version::V4,
        }
    }

    /// Derives the matching verification key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(match &self.0 {
            SigningMaterial::V1(key) => {
                VerifyingMaterial::V1(RsaVerifyingKey::new(rsa_private(key).to_public_key()))
            }
            SigningMaterial::V2(key) => VerifyingMaterial::V2(key.verifying_key()),
            SigningMaterial::V3(key) => VerifyingMaterial::V3(key.verifying_key().clone()),
            SigningMaterial::V4(key) => VerifyingMaterial::V4(key.verifying_key()),
        })
    }

    /// Length of the key material in bytes (modulus size for RSA).
    #[must_use]
    pub fn material_len(&self) -> usize {
        match self.0 {
            SigningMaterial::V1(_) => RSA_MODULUS_BITS / 8,
            SigningMaterial::V2(_) | SigningMaterial::V4(_) => ED25519_KEYPAIR_SIZE,
            SigningMaterial::V3(_) => P384_SECRET_KEY_SIZE,
        }
    }

    pub(crate) fn rsa(&self) -> PasetoResult<&RsaSigningKey> {
        match &self.0 {
            SigningMaterial::V1(key) => Ok(key),
            _ => Err(self.mismatch(Version::V1)),
        }
    }

    pub(crate) fn ed25519(&self, version: Version) -> PasetoResult<&ed25519_dalek::SigningKey> {
        match (&self.0, version) {
            (SigningMaterial::V2(key), Version::V2) | (SigningMaterial::V4(key), Version::V4) => {
                Ok(key)
            }
            _ => Err(self.mismatch(version)),
        }
    }

    pub(crate) fn p384(&self) -> PasetoResult<&p384::ecdsa::SigningKey> {
        match &self.0 {
            SigningMaterial::V3(key) => Ok(key),
            _ => Err(self.mismatch(Version::V3)),
        }
    }

    fn mismatch(&self, requested: Version) -> PasetoError {
        tracing::debug!(key = %self.version(), %requested, "private key version mismatch");
        PasetoError::KeyMismatch
    }
}

fn ed25519_from_keypair(bytes: &[u8]) -> PasetoResult<ed25519_dalek::SigningKey> {
    let mut keypair: [u8; ED25519_KEYPAIR_SIZE] =
        bytes.try_into().map_err(|_| PasetoError::InvalidKey)?;
    let key = ed25519_dalek::SigningKey::from_keypair_bytes(&keypair)
        .map_err(|_| PasetoError::InvalidKey);
    keypair.zeroize();
    key
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("version", &self.version().prefix())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Public (verification) keys
// =============================================================================

#[derive(Clone)]
enum VerifyingMaterial {
    V1(RsaVerifyingKey),
    V2(ed25519_dalek::VerifyingKey),
    V3(p384::ecdsa::VerifyingKey),
    V4(ed25519_dalek::VerifyingKey),
}

impl PartialEq for VerifyingMaterial {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::V1(a), Self::V1(b)) => rsa_public(a) == rsa_public(b),
            (Self::V2(a), Self::V2(b)) | (Self::V4(a), Self::V4(b)) => a == b,
            (Self::V3(a), Self::V3(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for VerifyingMaterial {}

fn rsa_private(key: &RsaSigningKey) -> &rsa::RsaPrivateKey {
    key.as_ref()
}

fn rsa_public(key: &RsaVerifyingKey) -> &rsa::RsaPublicKey {
    key.as_ref()
}

/// A verification key for public tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(VerifyingMaterial);

impl PublicKey {
    /// Wraps an RSA public key for V1.
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::InvalidKey` unless the modulus is 2048 bits.
    pub fn v1_from_rsa(key: rsa::RsaPublicKey) -> PasetoResult<Self> {
        use rsa::traits::PublicKeyParts;

        check_rsa_modulus(key.n())?;
        Ok(Self(VerifyingMaterial::V1(RsaVerifyingKey::new(key))))
    }

    /// Creates a V2 key from 32 Ed25519 public key bytes.
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::InvalidKey` for a wrong length or an invalid point.
    pub fn v2_from_bytes(bytes: &[u8]) -> PasetoResult<Self> {
        Ok(Self(VerifyingMaterial::V2(ed25519_public(bytes)?)))
    }

    /// Creates a V3 key from a SEC1-encoded P-384 point.
    ///
    /// Accepts the 49-byte compressed form (`0x02`/`0x03`) and the 97-byte
    /// uncompressed form (`0x04`). Compact and identity encodings are refused.
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::InvalidKey` for any other encoding or if the
    /// bytes are not a point on the curve.
    pub fn v3_from_sec1_bytes(bytes: &[u8]) -> PasetoResult<Self> {
        match (bytes.first(), bytes.len()) {
            (Some(0x02 | 0x03), P384_COMPRESSED_PUBLIC_KEY_SIZE)
            | (Some(0x04), P384_UNCOMPRESSED_PUBLIC_KEY_SIZE) => {}
            _ => return Err(PasetoError::InvalidKey),
        }
        let point = p384::PublicKey::from_sec1_bytes(bytes).map_err(|_| PasetoError::InvalidKey)?;
        Ok(Self(VerifyingMaterial::V3(p384::ecdsa::VerifyingKey::from(point))))
    }

    /// Creates a V4 key from 32 Ed25519 public key bytes.
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::InvalidKey` for a wrong length or an invalid point.
    pub fn v4_from_bytes(bytes: &[u8]) -> PasetoResult<Self> {
        Ok(Self(VerifyingMaterial::V4(ed25519_public(bytes)?)))
    }

    /// Returns the version this key is bound to.
    #[must_use]
    pub const fn version(&self) -> Version {
        match self.0 {
            VerifyingMaterial::V1(_) => Version::V1,
            VerifyingMaterial::V2(_) => Version::V2,
            VerifyingMaterial::V3(_) => Version::V3,
            VerifyingMaterial::V4(_) => Version::V4,
        }
    }

    /// Returns the canonical encoding of the key.
    ///
    /// Ed25519 keys are 32 raw bytes, P-384 keys the 49-byte compressed
    /// point, RSA keys the big-endian modulus.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        use rsa::traits::PublicKeyParts;

        match &self.0 {
            VerifyingMaterial::V1(key) => rsa_public(key).n().to_bytes_be(),
            VerifyingMaterial::V2(key) | VerifyingMaterial::V4(key) => key.to_bytes().to_vec(),
            VerifyingMaterial::V3(key) => compressed_point(key).to_vec(),
        }
    }

    /// Length of the key material in bytes (modulus size for RSA).
    #[must_use]
    pub fn material_len(&self) -> usize {
        match self.0 {
            VerifyingMaterial::V1(_) => RSA_MODULUS_BITS / 8,
            VerifyingMaterial::V2(_) | VerifyingMaterial::V4(_) => ED25519_PUBLIC_KEY_SIZE,
            VerifyingMaterial::V3(_) => P384_COMPRESSED_PUBLIC_KEY_SIZE,
        }
    }

    pub(crate) fn rsa(&self) -> PasetoResult<&RsaVerifyingKey> {
        match &self.0 {
            VerifyingMaterial::V1(key) => Ok(key),
            _ => Err(self.mismatch(Version::V1)),
        }
    }

    pub(crate) fn ed25519(&self, version: Version) -> PasetoResult<&ed25519_dalek::VerifyingKey> {
        match (&self.0, version) {
            (VerifyingMaterial::V2(key), Version::V2) | (VerifyingMaterial::V4(key), Version::V4) => {
                Ok(key)
            }
            _ => Err(self.mismatch(version)),
        }
    }

    pub(crate) fn p384(&self) -> PasetoResult<&p384::ecdsa::VerifyingKey> {
        match &self.0 {
            VerifyingMaterial::V3(key) => Ok(key),
            _ => Err(self.mismatch(Version::V3)),
        }
    }

    fn mismatch(&self, requested: Version) -> PasetoError {
        tracing::debug!(key = %self.version(), %requested, "public key version mismatch");
        PasetoError::KeyMismatch
    }
}

/// SEC1 compressed encoding of a P-384 verifying key (49 bytes, `0x02`/`0x03` prefix).
pub(crate) fn compressed_point(key: &p384::ecdsa::VerifyingKey) -> [u8; P384_COMPRESSED_PUBLIC_KEY_SIZE] {
    use p384::elliptic_curve::sec1::ToEncodedPoint;

    let point = key.as_affine().to_encoded_point(true);
    let mut out = [0u8; P384_COMPRESSED_PUBLIC_KEY_SIZE];
    out.copy_from_slice(point.as_bytes());
    out
}

fn ed25519_public(bytes: &[u8]) -> PasetoResult<ed25519_dalek::VerifyingKey> {
    let bytes: [u8; ED25519_PUBLIC_KEY_SIZE] =
        bytes.try_into().map_err(|_| PasetoError::InvalidKey)?;
    ed25519_dalek::VerifyingKey::from_bytes(&bytes).map_err(|_| PasetoError::InvalidKey)
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKey")
            .field("version", &self.version().prefix())
            .field("key", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Tagged union over all keys
// =============================================================================

/// The kind of a [`Key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// Shared secret for local tokens.
    Symmetric,
    /// Signing key for public tokens.
    PrivateAsymmetric,
    /// Verification key for public tokens.
    PublicAsymmetric,
}

/// Any key, tagged with its kind and version.
#[derive(Debug, Clone)]
pub enum Key {
    /// Shared secret for local tokens.
    Symmetric(SymmetricKey),
    /// Signing key for public tokens.
    Private(PrivateKey),
    /// Verification key for public tokens.
    Public(PublicKey),
}

impl Key {
    /// Returns the kind of key.
    #[must_use]
    pub const fn kind(&self) -> KeyKind {
        match self {
            Self::Symmetric(_) => KeyKind::Symmetric,
            Self::Private(_) => KeyKind::PrivateAsymmetric,
            Self::Public(_) => KeyKind::PublicAsymmetric,
        }
    }

    /// Returns the version this key is bound to.
    #[must_use]
    pub const fn version(&self) -> Version {
        match self {
            Self::Symmetric(key) => key.version(),
            Self::Private(key) => key.version(),
            Self::Public(key) => key.version(),
        }
    }

    /// Returns the purpose this key serves.
    #[must_use]
    pub const fn purpose(&self) -> Purpose {
        match self {
            Self::Symmetric(_) => Purpose::Local,
            Self::Private(_) | Self::Public(_) => Purpose::Public,
        }
    }

    /// True only if the key is bound to exactly this version and purpose.
    #[must_use]
    pub fn is_valid_for(&self, version: Version, purpose: Purpose) -> bool {
        self.version() == version && self.purpose() == purpose
    }

    /// True if the key material is `expected` bytes long.
    #[must_use]
    pub fn has_length(&self, expected: usize) -> bool {
        let len = match self {
            Self::Symmetric(key) => key.as_bytes().len(),
            Self::Private(key) => key.material_len(),
            Self::Public(key) => key.material_len(),
        };
        len == expected
    }

    /// Like [`Key::is_valid_for`] but as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns `PasetoError::KeyMismatch` if the key is bound elsewhere.
    pub fn validate(&self, version: Version, purpose: Purpose) -> PasetoResult<()> {
        if self.is_valid_for(version, purpose) {
            Ok(())
        } else {
            Err(PasetoError::KeyMismatch)
        }
    }
}

impl From<SymmetricKey> for Key {
    fn from(key: SymmetricKey) -> Self {
        Self::Symmetric(key)
    }
}

impl From<PrivateKey> for Key {
    fn from(key: PrivateKey) -> Self {
        Self::Private(key)
    }
}

impl From<PublicKey> for Key {
    fn from(key: PublicKey) -> Self {
        Self::Public(key)
    }
}
