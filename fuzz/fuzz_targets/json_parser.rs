#![no_main]

use libfuzzer_sys::fuzz_target;
use sluice_core::metadata::{Metadata, message_record};
use sluice_core::stage::FormatParser;
use sluice_pipeline::CollectSink;
use sluice_pipeline::parser::JsonParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let parser = JsonParser::new();
        let mut sink = CollectSink::new();
        let _ = parser.recv(Metadata::new(), message_record(text), &mut sink);
    }
});
