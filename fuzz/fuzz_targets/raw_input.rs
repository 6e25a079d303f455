#![no_main]

use libfuzzer_sys::fuzz_target;
use saphyr_composer::{Error, compose_all_str};

// Arbitrary text must never panic or break an internal invariant.
fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    if let Err(Error::Internal { msg }) = compose_all_str(s) {
        panic!("internal error: {msg}");
    }
});
