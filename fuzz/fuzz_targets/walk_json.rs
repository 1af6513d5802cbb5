#![no_main]

use libfuzzer_sys::fuzz_target;
use node_path::{WalkOptions, Walker};

fuzz_target!(|s: String| {
    if let Ok(document) = serde_json::from_str::<serde_json::Value>(&s) {
        let options = WalkOptions {
            max_nodes: 10_000,
            ..WalkOptions::new(16)
        };
        let walker = Walker::with_options(&document, options);
        let _ = walker.resolve();
    }
});
