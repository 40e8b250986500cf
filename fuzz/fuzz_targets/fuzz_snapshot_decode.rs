#![no_main]

use libfuzzer_sys::fuzz_target;
use tribunal_court::CourtSnapshot;

// Decoding arbitrary bytes as a court snapshot must never panic, and
// anything that decodes must encode again.
fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = CourtSnapshot::decode(data) {
        assert!(snapshot.encode().is_ok());
    }
});
