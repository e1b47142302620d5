//! Fuzz target for identifier sanitizing.
//!
//! Whatever the header or table label, the produced identifiers must pass
//! the safe identifier check.

#![no_main]

use ingot::sanitize::{
    dedupe_column_names, is_safe_identifier, sanitize_column_name, sanitize_physical_table_name,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(content) = std::str::from_utf8(data) {
        let columns: Vec<String> = content.split(',').map(sanitize_column_name).collect();
        for name in dedupe_column_names(&columns) {
            assert!(is_safe_identifier(&name), "unsafe column {:?}", name);
        }

        let table = sanitize_physical_table_name("fuzzowner", content);
        assert!(is_safe_identifier(&table), "unsafe table {:?}", table);
    }
});
