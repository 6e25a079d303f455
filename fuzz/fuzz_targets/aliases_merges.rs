#![no_main]

use libfuzzer_sys::fuzz_target;
use saphyr_composer::{Error, compose_all_str_with_options, limits, options};

// Biases inputs toward anchors, aliases, self-references and merge keys (<<), and checks that
// composition either succeeds or fails with a proper error under tight limits.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }

    let s = String::from_utf8_lossy(data);
    let options = options! {
        limits: limits! { max_depth: 64, max_aliases_for_collections: 16 },
    };

    let yaml = format!(
        "a: &A {s}\nb: *A\nseq: &S [1, *S, {s}]\nbase: &B {{k: 1, v: {s}}}\nmerged: {{<<: [*B, *S], extra: 3}}\n"
    );

    match compose_all_str_with_options(&yaml, options) {
        Ok(docs) => {
            for doc in docs {
                for (_, node) in doc.iter() {
                    for child in node.child_ids() {
                        assert!(doc.get(child).is_some(), "dangling child id");
                    }
                }
            }
        }
        Err(Error::Internal { msg }) => panic!("internal error: {msg}"),
        Err(_) => {}
    }
});
