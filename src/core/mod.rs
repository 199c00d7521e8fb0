//! Core PASETO types and operations.
//!
//! - [`version`] - Version and purpose identifiers
//! - [`error`] - Error types for PASETO operations
//! - [`header`] - Header parsing and generation utilities
//! - [`pae`] - Pre-authentication encoding
//! - [`token`] - Token framing (header, payload, footer)
//! - [`key`] - Version-bound key types
//! - [`provider`] - One-time primitive initialization
//! - [`operations`] - The v1 through v4 protocol suites

pub mod error;
pub mod header;
pub mod key;
pub mod operations;
pub mod pae;
pub mod provider;
pub mod token;
pub mod version;

// Re-export commonly used items
pub use error::{ErrorKind, PasetoError, PasetoResult};
pub use key::{Key, KeyKind, PrivateKey, PublicKey, SymmetricKey};
pub use token::Token;
pub use version::{Purpose, Version};
