//! Test vector types for PASETO known-answer tests.
//!
//! The JSON files follow the layout of the paseto-standard/test-vectors
//! repository: a named suite with a list of cases keyed by `expect-fail`.

// Some fields are required for deserialization but not directly used in tests
#![allow(dead_code)]

use serde::Deserialize;

/// A test vector suite (top-level JSON structure).
#[derive(Debug, Deserialize)]
pub struct TestVectorSuite<T> {
    pub name: String,
    pub tests: Vec<T>,
}

/// Test vector for `local` tokens.
#[derive(Debug, Deserialize)]
pub struct LocalTestVector {
    pub name: String,
    #[serde(rename = "expect-fail")]
    pub expect_fail: bool,
    #[serde(default)]
    pub comment: Option<String>,
    /// Hex-encoded symmetric key
    pub key: String,
    /// Hex-encoded nonce input (v1 and v2: the nonce key, v3 and v4: the nonce)
    pub nonce: String,
    /// Null for vectors that must fail
    pub payload: Option<String>,
    pub footer: String,
    #[serde(rename = "implicit-assertion", default)]
    pub implicit_assertion: String,
    pub token: String,
}

impl LocalTestVector {
    pub fn payload_bytes(&self) -> &[u8] {
        self.payload.as_deref().unwrap_or_default().as_bytes()
    }
}

/// Test vector for `public` tokens.
#[derive(Debug, Deserialize)]
pub struct PublicTestVector {
    pub name: String,
    #[serde(rename = "expect-fail")]
    pub expect_fail: bool,
    #[serde(default)]
    pub comment: Option<String>,
    /// Hex-encoded secret key (v1: PKCS#8 DER, v2/v4: `seed || public key`,
    /// v3: the 48-byte scalar)
    #[serde(rename = "secret-key")]
    pub secret_key: String,
    #[serde(rename = "secret-key-seed", default)]
    pub secret_key_seed: Option<String>,
    /// Hex-encoded public key (v1: SubjectPublicKeyInfo DER, v3: compressed SEC1)
    #[serde(rename = "public-key")]
    pub public_key: String,
    /// Null for vectors that must fail
    pub payload: Option<String>,
    pub footer: String,
    #[serde(rename = "implicit-assertion", default)]
    pub implicit_assertion: String,
    /// Expected token; null for randomized signature schemes
    pub token: Option<String>,
}

impl PublicTestVector {
    pub fn payload_bytes(&self) -> &[u8] {
        self.payload.as_deref().unwrap_or_default().as_bytes()
    }
}

/// Decode a hex string to bytes.
pub fn hex_decode(s: &str) -> Option<Vec<u8>> {
    hex::decode(s).ok()
}

/// Decode a hex string into a fixed-size array.
pub fn hex_array<const N: usize>(s: &str) -> Option<[u8; N]> {
    hex_decode(s)?.try_into().ok()
}

/// Load a test vector suite from a JSON file.
pub fn load_vectors<T: serde::de::DeserializeOwned>(path: &str) -> TestVectorSuite<T> {
    let content = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read test vector file {path}: {e}"));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse test vector file {path}: {e}"))
}
