#![no_main]

use libfuzzer_sys::fuzz_target;
use sluice_core::metadata::{Metadata, message_record};
use sluice_core::stage::FormatParser;
use sluice_pipeline::CollectSink;
use sluice_pipeline::parser::PaloAltoParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // CSV 따옴표 처리와 열 zip 경로가 임의 입력에도 패닉하지 않아야 한다
        let parser = PaloAltoParser::new();
        let mut sink = CollectSink::new();
        let _ = parser.recv(Metadata::new(), message_record(text), &mut sink);
    }
});
