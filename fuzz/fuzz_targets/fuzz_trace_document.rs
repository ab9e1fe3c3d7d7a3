#![no_main]

use libfuzzer_sys::fuzz_target;
use sortviz_core::TraceDocument;

fuzz_target!(|data: &[u8]| {
    // Arbitrary text must decode to a document or an error, never a panic.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = TraceDocument::from_json(text) else {
        return;
    };

    // Replay rejects bad steps with an error.
    if let Ok(out) = doc.final_array() {
        assert_eq!(out.len(), doc.initial.len(), "replay changed length");
        let mut expected = out.clone();
        expected.sort_unstable();
        let _ = doc.verify(&expected);
    }
});
