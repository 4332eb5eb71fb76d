//! AWS 감사/위협 로그 파서
//!
//! [`CloudTrailParser`]는 배치 파일 하나를 레코드 N개로 팬아웃하는 대표적
//! 파서입니다. [`GuardDutyParser`]는 태그만 붙이는 통과 파서입니다.

use serde_json::Value;
use tracing::debug;

use sluice_core::error::{ParseError, SluiceError};
use sluice_core::metadata::{Metadata, Record};
use sluice_core::stage::{FormatParser, Sink};

use super::{message_of, naive_epoch, str_or_dash};

/// CloudTrail 배치 파서 (`cloudtrail`)
///
/// `message`를 JSON으로 해석해 최상위 `Records` 배열을 요구합니다.
/// 배열의 각 원소가 독립된 메타데이터 사본과 함께 방출되므로, 입력
/// 하나가 N개의 출력으로 팬아웃됩니다. 배열이 없거나 배열이 아니면
/// 파싱 에러입니다.
#[derive(Debug, Default)]
pub struct CloudTrailParser;

impl CloudTrailParser {
    /// 새 CloudTrailParser를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for CloudTrailParser {
    fn name(&self) -> &'static str {
        "cloudtrail"
    }

    fn recv(
        &self,
        meta: Metadata,
        record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        let msg = message_of(&record, self.name())?;
        let body: Value = serde_json::from_str(msg).map_err(|e| {
            SluiceError::Parse(ParseError::Json {
                format: self.name().to_owned(),
                reason: e.to_string(),
            })
        })?;

        let entries = body
            .get("Records")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                SluiceError::Parse(ParseError::MissingField {
                    format: self.name().to_owned(),
                    field: "Records".to_owned(),
                })
            })?;

        debug!(count = entries.len(), "fanning out cloudtrail records");

        for entry in entries {
            let mut rec = match entry {
                Value::Object(map) => map.clone(),
                other => {
                    return Err(SluiceError::Parse(ParseError::Json {
                        format: self.name().to_owned(),
                        reason: format!("Records element is not an object: {other}"),
                    }));
                }
            };

            let mut rec_meta = meta.clone();
            if let Some(time) = rec.get("eventTime").and_then(Value::as_str) {
                rec_meta.timestamp = naive_epoch(time, "%Y-%m-%dT%H:%M:%SZ", self.name())?;
            }

            let event_type = rec
                .get("eventType")
                .and_then(Value::as_str)
                .unwrap_or("-")
                .to_owned();
            let description = format!(
                "{} {} by {} on {}",
                event_type,
                str_or_dash(&rec, "eventName"),
                str_or_dash(&rec, "userIdentity.arn"),
                str_or_dash(&rec, "sourceIPAddress"),
            );
            rec.insert("description".to_owned(), Value::String(description));

            rec_meta.tag = Some(format!("aws.cloudtrail.{event_type}"));
            out.recv(rec_meta, rec)?;
        }

        Ok(())
    }
}

/// GuardDuty 파서 (`guardduty`) -- 태그 `aws.guardduty`만 붙여 통과시킵니다.
#[derive(Debug, Default)]
pub struct GuardDutyParser;

impl GuardDutyParser {
    /// 새 GuardDutyParser를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for GuardDutyParser {
    fn name(&self) -> &'static str {
        "guardduty"
    }

    fn recv(
        &self,
        mut meta: Metadata,
        record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        meta.tag = Some("aws.guardduty".to_owned());
        out.recv(meta, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testutil::{record, run_parser};
    use serde_json::json;

    fn trail_body(n: usize) -> String {
        let entries: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "eventTime": "2018-03-08T13:35:13Z",
                    "eventType": "AwsApiCall",
                    "eventName": format!("GetObject{i}"),
                    "userIdentity": {"arn": "arn:aws:iam::123456789012:user/alice"},
                    "sourceIPAddress": "203.0.113.10",
                })
            })
            .collect();
        json!({"Records": entries}).to_string()
    }

    #[test]
    fn fans_out_one_output_per_array_element() {
        let input = record(json!({"message": trail_body(3)}));
        let output = run_parser(&CloudTrailParser::new(), vec![input]);

        assert_eq!(output.len(), 3);
        for (meta, data) in &output {
            assert_eq!(meta.tag.as_deref(), Some("aws.cloudtrail.AwsApiCall"));
            assert!(data["description"]
                .as_str()
                .expect("description")
                .contains("arn:aws:iam::123456789012:user/alice"));
        }
        assert_eq!(output[1].1["eventName"], json!("GetObject1"));
    }

    #[test]
    fn fanned_out_metadata_is_independent() {
        let input = record(json!({"message": trail_body(2)}));
        let mut output = run_parser(&CloudTrailParser::new(), vec![input]);

        output[0].0.tag = Some("mutated".to_owned());
        output[0].0.source.insert("k".to_owned(), "v".to_owned());

        assert_eq!(output[1].0.tag.as_deref(), Some("aws.cloudtrail.AwsApiCall"));
        assert!(output[1].0.source.is_empty());
    }

    #[test]
    fn event_time_sets_timestamp() {
        let input = record(json!({"message": trail_body(1)}));
        let output = run_parser(&CloudTrailParser::new(), vec![input]);
        // 2018-03-08T13:35:13Z
        assert_eq!(output[0].0.timestamp, 1_520_516_113);
    }

    #[test]
    fn missing_records_array_is_parse_error() {
        let input = record(json!({"message": "{\"NotRecords\": []}"}));
        let mut sink = crate::handler::CollectSink::new();
        let result = CloudTrailParser::new().recv(Metadata::new(), input, &mut sink);
        assert!(matches!(
            result,
            Err(SluiceError::Parse(ParseError::MissingField { .. }))
        ));
    }

    #[test]
    fn records_must_be_an_array() {
        let input = record(json!({"message": "{\"Records\": \"nope\"}"}));
        let mut sink = crate::handler::CollectSink::new();
        let result = CloudTrailParser::new().recv(Metadata::new(), input, &mut sink);
        assert!(result.is_err());
    }

    #[test]
    fn empty_array_emits_nothing() {
        let input = record(json!({"message": "{\"Records\": []}"}));
        let output = run_parser(&CloudTrailParser::new(), vec![input]);
        assert!(output.is_empty());
    }

    #[test]
    fn guardduty_tags_and_passes_through() {
        let input = record(json!({"detail": {"severity": 5}}));
        let output = run_parser(&GuardDutyParser::new(), vec![input]);
        assert_eq!(output[0].0.tag.as_deref(), Some("aws.guardduty"));
        assert_eq!(output[0].1["detail"]["severity"], json!(5));
    }
}
