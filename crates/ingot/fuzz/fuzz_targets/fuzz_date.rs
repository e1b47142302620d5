//! Fuzz target for date detection and type inference.
//!
//! Regex-based date detection must not crash on pathological input, and a
//! matched date must be a real calendar date.

#![no_main]

use ingot::inference::parse_date;
use ingot::TypeInferrer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_date(content);

        let values: Vec<&str> = content.lines().collect();
        let _ = TypeInferrer::new().infer(values.into_iter().map(Some));
    }
});
