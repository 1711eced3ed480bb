//! Fuzz target: time topic payload parsing
//!
//! Arbitrary broker payloads must never panic, and a payload with no ASCII
//! digits must always yield the unknown timestamp.
//!
//! cargo fuzz run fuzz_time_payload

#![no_main]

use feedlog::feeding_log::CompactDateTime;
use feedlog::sync::payload::parse_time_payload;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let parsed = parse_time_payload(data);
    if !data.iter().any(u8::is_ascii_digit) {
        assert_eq!(parsed, CompactDateTime::UNKNOWN);
    }
});
