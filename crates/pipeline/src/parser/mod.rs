//! 형식별 파서 모듈 -- syslog, JSON, 벤더 보안 제품 로그의 정규화
//!
//! 각 파서는 core의 [`FormatParser`](sluice_core::stage::FormatParser) trait을
//! 구현하며, (메타데이터, 레코드) 하나를 받아 0개 이상을 다음 스테이지로
//! 밀어 넣습니다. 타임스탬프는 모두 UTC로 해석해 epoch 초로 정규화합니다.
//!
//! # 지원 형식
//! - [`JsonParser`], [`FluentdJsonParser`]: 범용 JSON / fluentd TSV
//! - [`SyslogParser`]: 전통적 syslog 라인 (`Nov 21 06:00:24 host proc[pid]: ...`)
//! - [`PaloAltoParser`]: PAN-OS CSV (TRAFFIC/THREAT)
//! - [`CloudTrailParser`], [`GuardDutyParser`]: AWS 감사/위협 로그
//! - [`FieldStampParser`]: 타임스탬프 필드 + 고정 태그형 벤더 로그
//!   (GSuite, Azure AD, Cylance, ECS)
//! - [`PacketBeatParser`], [`AuditBeatParser`]: Beats 계열
//! - [`KeaParser`]: ISC Kea DHCP 로그
//! - [`FalconParser`]: CrowdStrike Falcon 이벤트

pub mod aws;
pub mod beats;
pub mod falcon;
pub mod json;
pub mod kea;
pub mod paloalto;
pub mod syslog;
pub mod vendor;

pub use aws::{CloudTrailParser, GuardDutyParser};
pub use beats::{AuditBeatParser, PacketBeatParser};
pub use falcon::FalconParser;
pub use json::{FluentdJsonParser, JsonParser};
pub use kea::KeaParser;
pub use paloalto::PaloAltoParser;
pub use syslog::{SyslogParser, YearStrategy};
pub use vendor::FieldStampParser;

use chrono::NaiveDateTime;
use serde_json::Value;

use sluice_core::error::{ParseError, SluiceError};
use sluice_core::metadata::Record;

/// 레코드의 `message` 필드를 문자열로 꺼냅니다. 없으면 파싱 에러입니다.
pub(crate) fn message_of<'a>(record: &'a Record, parser: &str) -> Result<&'a str, SluiceError> {
    record
        .get("message")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            SluiceError::Parse(ParseError::MissingField {
                format: parser.to_owned(),
                field: "message".to_owned(),
            })
        })
}

/// dot 표기 경로로 중첩 문자열 필드를 찾습니다 (예: `"id.time"`).
pub(crate) fn str_path<'a>(record: &'a Record, path: &str) -> Option<&'a str> {
    let mut parts = path.split('.');
    let mut current = record.get(parts.next()?)?;
    for part in parts {
        current = current.get(part)?;
    }
    current.as_str()
}

/// 요약 메시지 합성용 -- 필드가 없거나 문자열이 아니면 `"-"`를 반환합니다.
pub(crate) fn str_or_dash<'a>(record: &'a Record, path: &str) -> &'a str {
    str_path(record, path).unwrap_or("-")
}

/// 주어진 chrono 포맷으로 naive 타임스탬프를 UTC epoch 초로 해석합니다.
pub(crate) fn naive_epoch(
    text: &str,
    fmt: &str,
    parser: &str,
) -> Result<i64, SluiceError> {
    NaiveDateTime::parse_from_str(text, fmt)
        .map(|dt| dt.and_utc().timestamp())
        .map_err(|e| {
            SluiceError::Parse(ParseError::Timestamp {
                format: parser.to_owned(),
                value: text.to_owned(),
                reason: e.to_string(),
            })
        })
}

/// ISO-8601 텍스트를 초 단위로 잘라 UTC epoch 초로 해석합니다.
///
/// 밀리초·타임존 접미사는 무시합니다 (`2018-06-10T19:27:47.123Z` →
/// `2018-06-10T19:27:47`).
pub(crate) fn iso_prefix_epoch(text: &str, parser: &str) -> Result<i64, SluiceError> {
    let prefix = text.get(..19).ok_or_else(|| {
        SluiceError::Parse(ParseError::Timestamp {
            format: parser.to_owned(),
            value: text.to_owned(),
            reason: "shorter than seconds precision".to_owned(),
        })
    })?;
    naive_epoch(prefix, "%Y-%m-%dT%H:%M:%S", parser)
}

#[cfg(test)]
pub(crate) mod testutil {
    //! 파서 단위 테스트 헬퍼 -- 파서 하나에 입력을 넣고 산출물을 수집합니다.

    use sluice_core::metadata::{Metadata, Record};
    use sluice_core::stage::FormatParser;

    use crate::handler::CollectSink;

    /// JSON 객체 리터럴을 [`Record`]로 변환합니다.
    pub fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("record fixture must be a JSON object: {other}"),
        }
    }

    /// 파서 하나에 레코드들을 흘려 보내고 산출물을 반환합니다.
    pub fn run_parser(
        parser: &dyn FormatParser,
        inputs: Vec<Record>,
    ) -> Vec<(Metadata, Record)> {
        let mut sink = CollectSink::new();
        for input in inputs {
            parser
                .recv(Metadata::new(), input, &mut sink)
                .expect("parser should accept fixture input");
        }
        sink.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn str_path_traverses_nested_objects() {
        let record = testutil::record(json!({"id": {"time": "2018-06-10T19:27:47.000Z"}}));
        assert_eq!(str_path(&record, "id.time"), Some("2018-06-10T19:27:47.000Z"));
        assert_eq!(str_path(&record, "id.missing"), None);
        assert_eq!(str_path(&record, "nope"), None);
    }

    #[test]
    fn iso_prefix_truncates_subseconds_and_zone() {
        let epoch = iso_prefix_epoch("2018-06-10T19:27:47.123+09:00", "test").unwrap();
        assert_eq!(epoch, 1_528_658_867);
    }

    #[test]
    fn iso_prefix_rejects_short_text() {
        let result = iso_prefix_epoch("2018-06-10", "test");
        assert!(result.is_err());
    }

    #[test]
    fn naive_epoch_rejects_garbage() {
        assert!(naive_epoch("not a date", "%Y-%m-%d %H:%M:%S", "test").is_err());
    }
}
