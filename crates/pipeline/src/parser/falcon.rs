//! CrowdStrike Falcon 이벤트 파서
//!
//! `timestamp` 필드는 epoch 밀리초입니다 (문자열/숫자 모두 허용).
//! 이벤트 대상은 `RemoteAddressIP4` → `TargetFileName` → `DomainName` →
//! `CommandLine` 순으로 처음 존재하는 값을 사용합니다.

use serde_json::Value;

use sluice_core::error::{ParseError, SluiceError};
use sluice_core::metadata::{Metadata, Record};
use sluice_core::stage::{FormatParser, Sink};

use super::str_or_dash;

/// 대상 후보 필드 (우선순위 순)
const TARGET_FIELDS: [&str; 4] = [
    "RemoteAddressIP4",
    "TargetFileName",
    "DomainName",
    "CommandLine",
];

/// Falcon 이벤트 파서 (`falcon`)
#[derive(Debug, Default)]
pub struct FalconParser;

impl FalconParser {
    /// 새 FalconParser를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// epoch 밀리초 값을 epoch 초로 해석합니다.
    fn epoch_millis(&self, value: &Value) -> Result<i64, SluiceError> {
        let millis = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse::<i64>().ok(),
            _ => None,
        };
        millis.map(|ms| ms / 1000).ok_or_else(|| {
            SluiceError::Parse(ParseError::Timestamp {
                format: "falcon".to_owned(),
                value: value.to_string(),
                reason: "expected epoch milliseconds".to_owned(),
            })
        })
    }
}

impl FormatParser for FalconParser {
    fn name(&self) -> &'static str {
        "falcon"
    }

    fn recv(
        &self,
        mut meta: Metadata,
        mut record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        meta.tag = Some("falcon".to_owned());
        if let Some(value) = record.get("timestamp") {
            meta.timestamp = self.epoch_millis(value)?;
        }

        let target = TARGET_FIELDS
            .iter()
            .filter_map(|field| record.get(*field).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .unwrap_or("-");

        let message = format!(
            "{} at {} to {}",
            str_or_dash(&record, "name"),
            str_or_dash(&record, "aip"),
            target,
        );
        record.insert("message".to_owned(), Value::String(message));

        out.recv(meta, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testutil::{record, run_parser};
    use serde_json::json;

    #[test]
    fn stamps_from_epoch_millis_string() {
        let input = record(json!({
            "timestamp": "1526104824123",
            "name": "DnsRequest",
            "aip": "198.51.100.7",
            "DomainName": "evil.example",
        }));
        let output = run_parser(&FalconParser::new(), vec![input]);

        let (meta, data) = &output[0];
        assert_eq!(meta.tag.as_deref(), Some("falcon"));
        assert_eq!(meta.timestamp, 1_526_104_824);
        assert_eq!(
            data["message"],
            json!("DnsRequest at 198.51.100.7 to evil.example")
        );
    }

    #[test]
    fn target_prefers_remote_address() {
        let input = record(json!({
            "name": "NetworkConnect",
            "aip": "198.51.100.7",
            "RemoteAddressIP4": "203.0.113.99",
            "CommandLine": "curl http://x",
        }));
        let output = run_parser(&FalconParser::new(), vec![input]);
        assert!(output[0].1["message"]
            .as_str()
            .expect("message")
            .ends_with("to 203.0.113.99"));
    }

    #[test]
    fn empty_target_candidates_fall_through() {
        let input = record(json!({
            "name": "ProcessRollup",
            "aip": "198.51.100.7",
            "RemoteAddressIP4": "",
            "CommandLine": "/usr/bin/true",
        }));
        let output = run_parser(&FalconParser::new(), vec![input]);
        assert!(output[0].1["message"]
            .as_str()
            .expect("message")
            .ends_with("to /usr/bin/true"));
    }

    #[test]
    fn missing_timestamp_keeps_prior_value() {
        let before = sluice_core::metadata::now_epoch();
        let input = record(json!({"name": "Event", "aip": "1.2.3.4"}));
        let output = run_parser(&FalconParser::new(), vec![input]);
        assert!(output[0].0.timestamp >= before);
    }

    #[test]
    fn garbage_timestamp_is_error() {
        let mut sink = crate::handler::CollectSink::new();
        let result = FalconParser::new().recv(
            Metadata::new(),
            record(json!({"timestamp": "noon"})),
            &mut sink,
        );
        assert!(matches!(
            result,
            Err(SluiceError::Parse(ParseError::Timestamp { .. }))
        ));
    }
}
