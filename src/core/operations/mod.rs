//! Protocol suites.
//!
//! Each module is a flat set of functions for one PASETO version:
//!
//! - [`v1`] - NIST Original (AES-256-CTR + HMAC-SHA384, RSASSA-PSS)
//! - [`v2`] - Sodium Original (XChaCha20-Poly1305, Ed25519)
//! - [`v3`] - NIST Modern (AES-256-CTR + HMAC-SHA384, ECDSA P-384)
//! - [`v4`] - Sodium Modern (XChaCha20 + BLAKE2b-MAC, Ed25519)
//!
//! Every operation checks the key's version before touching the token, so a
//! key bound to another version fails with `KeyMismatch` regardless of input.

#[cfg(feature = "v1")]
pub mod v1;

#[cfg(feature = "v2")]
pub mod v2;

#[cfg(feature = "v3")]
pub mod v3;

#[cfg(feature = "v4")]
pub mod v4;
