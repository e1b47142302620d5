//! Fuzz target for the upload parser.
//!
//! The parser must never panic on malformed input, with either a fixed or an
//! auto-detected delimiter.

#![no_main]

use ingot::{Parser, ParserConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let _ = Parser::new().parse_source("fuzz.csv", data);

    let detecting = Parser::with_config(ParserConfig {
        delimiter: None,
        ..Default::default()
    });
    let _ = detecting.parse_source("fuzz.csv", data);
});
