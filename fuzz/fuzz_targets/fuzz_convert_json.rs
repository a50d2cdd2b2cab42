#![no_main]

use ebwandler::convert::convert;
use ebwandler::core::{Settings, SourceDocument, TargetVersion};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = serde_json::from_slice::<SourceDocument>(data) else {
        return;
    };
    for version in [TargetVersion::V40, TargetVersion::V61] {
        let conversion = convert(&doc, &Settings::default().target(version));
        if conversion.document.is_none() {
            assert!(conversion.diagnostics.has_errors());
        }
    }
});
