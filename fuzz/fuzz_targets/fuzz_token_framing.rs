#![no_main]

use libfuzzer_sys::fuzz_target;
use paseto_tokens::core::token::footer;
use paseto_tokens::{Purpose, Token, Version};

fuzz_target!(|data: &str| {
    let _ = footer(data);

    for version in Version::ALL {
        for purpose in [Purpose::Local, Purpose::Public] {
            if let Ok(token) = Token::parse(data, version, purpose, b"") {
                // A token that parses must re-serialize to the same string
                assert_eq!(token.to_string(), data);
            }
        }
    }
});
