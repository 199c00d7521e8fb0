#![no_main]

use libfuzzer_sys::fuzz_target;
use paseto_tokens::{v1, v2, v3, v4, SymmetricKey, Version};

fuzz_target!(|data: &str| {
    // Arbitrary input must be rejected without panicking, for every suite
    let key = [0x42u8; 32];
    let _ = v1::decrypt(&SymmetricKey::from_bytes(Version::V1, key), data, b"");
    let _ = v2::decrypt(&SymmetricKey::from_bytes(Version::V2, key), data, b"");
    let _ = v3::decrypt(&SymmetricKey::from_bytes(Version::V3, key), data, b"", b"");
    let _ = v4::decrypt(&SymmetricKey::from_bytes(Version::V4, key), data, b"kid", b"");
});
