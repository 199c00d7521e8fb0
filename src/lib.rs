//! Platform-Agnostic Security Tokens (PASETO) for Rust.
//!
//! PASETO is a stateless token format with versioned, fixed cipher suites.
//! A token looks like `v{n}.{local|public}.{base64url payload}[.{base64url footer}]`
//! and carries no algorithm negotiation: the header alone selects the suite.
//!
//! # Quick Start
//!
//! ```rust
//! use paseto_tokens::{v4, SymmetricKey, Version};
//!
//! let key = SymmetricKey::generate(Version::V4)?;
//!
//! let token = v4::encrypt(&key, b"{\"sub\":\"alice\"}", b"kid-1", b"")?;
//! assert!(token.starts_with("v4.local."));
//!
//! let message = v4::decrypt(&key, &token, b"kid-1", b"")?;
//! assert_eq!(message, b"{\"sub\":\"alice\"}");
//! # Ok::<(), paseto_tokens::PasetoError>(())
//! ```
//!
//! # Versions
//!
//! | Version | `local` | `public` |
//! |---------|---------|----------|
//! | **V1** | AES-256-CTR + HMAC-SHA384 | RSASSA-PSS 2048 / SHA-384 |
//! | **V2** | XChaCha20-Poly1305 | Ed25519 |
//! | **V3** | AES-256-CTR + HMAC-SHA384 | ECDSA P-384 / SHA-384 |
//! | **V4** | XChaCha20 + BLAKE2b-MAC | Ed25519 - **Recommended** |
//!
//! V3 and V4 additionally bind an *implicit assertion*: bytes that are
//! authenticated but never transmitted. V1 and V2 have no such parameter.
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! paseto-tokens = { version = "0.1", default-features = false, features = ["v4"] }
//! ```
//!
//! # Security
//!
//! - Keys are bound to one version; using them with another fails before any
//!   cryptographic work
//! - Key material is zeroized on drop and redacted in `Debug` output
//! - Tags and footers are compared in constant time
//! - Local tokens are authenticated before decryption
//! - No unsafe code
//!
//! # Modules
//!
//! - [`core`] - Core types, framing and the protocol suites
//! - [`prelude`] - Version-dispatching builders (requires `prelude` feature)

pub mod core;

#[cfg(feature = "prelude")]
pub mod prelude;

// Re-export commonly used items at crate root
pub use core::error::{ErrorKind, PasetoError, PasetoResult};
pub use core::key::{Key, KeyKind, PrivateKey, PublicKey, SymmetricKey};
pub use core::provider::{initialize, Provider};
pub use core::token::Token;
pub use core::version::{Purpose, Version};

// Suites, gated by version feature
#[cfg(feature = "v1")]
pub use core::operations::v1;
#[cfg(feature = "v2")]
pub use core::operations::v2;
#[cfg(feature = "v3")]
pub use core::operations::v3;
#[cfg(feature = "v4")]
pub use core::operations::v4;
