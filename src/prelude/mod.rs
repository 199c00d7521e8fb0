//! Ergonomic layer for PASETO operations.
//!
//! The prelude re-exports the key and error types together with
//! [`TokenBuilder`] and [`TokenDecoder`], which dispatch on a [`Key`]'s
//! version and kind at runtime.
//!
//! # Usage
//!
//! ```rust
//! use paseto_tokens::prelude::*;
//! ```

mod builders;

pub use builders::{TokenBuilder, TokenDecoder};

// Re-export core types for convenience
pub use crate::core::error::{ErrorKind, PasetoError, PasetoResult};
pub use crate::core::key::{Key, KeyKind, PrivateKey, PublicKey, SymmetricKey};
pub use crate::core::token::{footer, Token};
pub use crate::core::version::{Purpose, Version};
