#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use paseto_tokens::{v2, v3, v4, PrivateKey, PublicKey};

struct Keys {
    v2: PublicKey,
    v3: PublicKey,
    v4: PublicKey,
}

static KEYS: OnceLock<Keys> = OnceLock::new();

fn keys() -> &'static Keys {
    KEYS.get_or_init(|| {
        let mut scalar = [0x11u8; 48];
        scalar[47] = 0x01;
        Keys {
            v2: PrivateKey::v2_from_seed(&[7u8; 32]).public_key(),
            v3: PrivateKey::v3_from_bytes(&scalar)
                .expect("valid scalar")
                .public_key(),
            v4: PrivateKey::v4_from_seed(&[7u8; 32]).public_key(),
        }
    })
}

fuzz_target!(|data: &str| {
    let keys = keys();
    let _ = v2::parse(&keys.v2, data, b"");
    let _ = v3::parse(&keys.v3, data, b"", b"");
    let _ = v4::parse(&keys.v4, data, b"", b"");
});
