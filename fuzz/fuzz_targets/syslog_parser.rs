#![no_main]

use libfuzzer_sys::fuzz_target;
use sluice_core::metadata::{Metadata, message_record};
use sluice_core::stage::FormatParser;
use sluice_pipeline::CollectSink;
use sluice_pipeline::parser::{SyslogParser, YearStrategy};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
        let parser = SyslogParser::new().with_year(YearStrategy::Fixed(2018));
        let mut sink = CollectSink::new();
        let _ = parser.recv(Metadata::new(), message_record(text), &mut sink);
    }
});
