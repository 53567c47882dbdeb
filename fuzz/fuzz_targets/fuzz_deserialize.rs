#![no_main]

use dyntable::Table;
use libfuzzer_sys::fuzz_target;

/// Keep the harness itself bounded.
const MAX_INPUT_BYTES: usize = 64 * 1024;

fuzz_target!(|data: &[u8]| {
    if data.len() > MAX_INPUT_BYTES {
        return;
    }

    // Anything that decodes must encode back to the same bytes.
    if let Ok(table) = Table::deserialize(data) {
        assert_eq!(table.serialized_len(), data.len());
        assert_eq!(table.serialize(), data);
    }
});
