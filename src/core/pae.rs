//! Pre-Authentication Encoding.
//!
//! `PAE(pieces)` = `LE64(count) || for each piece: LE64(len) || piece`.
//! The length prefixes make the encoding unambiguous, so no separators or
//! escaping are needed. Every MAC and signature in every suite is computed
//! over a [`PreAuthEncoded`] buffer and nothing else.

/// Bytes produced by the PAE algorithm.
///
/// The only constructor is [`PreAuthEncoded::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreAuthEncoded(Vec<u8>);

impl PreAuthEncoded {
    /// Encodes a list of byte strings.
    #[must_use]
    pub fn encode(pieces: &[&[u8]]) -> Self {
        let capacity = 8 + pieces.iter().map(|p| 8 + p.len()).sum::<usize>();
        let mut out = Vec::with_capacity(capacity);

        out.extend_from_slice(&le64(pieces.len()));
        for piece in pieces {
            out.extend_from_slice(&le64(piece.len()));
            out.extend_from_slice(piece);
        }

        Self(out)
    }

    /// Returns the encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the encoding and returns the bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for PreAuthEncoded {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Little-endian 64-bit length with the top bit cleared.
fn le64(n: usize) -> [u8; 8] {
    ((n as u64) & (u64::MAX >> 1)).to_le_bytes()
}
