//! 범용 JSON 파서
//!
//! [`JsonParser`]는 `message` 필드를 JSON 객체로 해석해 레코드 전체를
//! 교체합니다. [`FluentdJsonParser`]는 fluentd가 기록한
//! `<time>\t<tag>\t<json>` 탭 구분 라인을 해석합니다.

use chrono::DateTime;
use serde_json::Value;

use sluice_core::error::{ParseError, SluiceError};
use sluice_core::metadata::{Metadata, Record};
use sluice_core::stage::{FormatParser, Sink};

use super::{iso_prefix_epoch, message_of, naive_epoch};

/// JSON 본문을 객체 [`Record`]로 해석합니다.
fn parse_object(text: &str, parser: &str) -> Result<Record, SluiceError> {
    let value: Value = serde_json::from_str(text).map_err(|e| {
        SluiceError::Parse(ParseError::Json {
            format: parser.to_owned(),
            reason: e.to_string(),
        })
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(SluiceError::Parse(ParseError::Json {
            format: parser.to_owned(),
            reason: format!("top-level value is not an object: {other}"),
        })),
    }
}

/// 범용 JSON 파서 (`json`)
///
/// `message`를 JSON 객체로 파싱해 새 레코드로 방출합니다.
/// 메타데이터는 건드리지 않습니다.
#[derive(Debug, Default)]
pub struct JsonParser;

impl JsonParser {
    /// 새 JsonParser를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for JsonParser {
    fn name(&self) -> &'static str {
        "json"
    }

    fn recv(
        &self,
        meta: Metadata,
        record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        let msg = message_of(&record, self.name())?;
        let parsed = parse_object(msg, self.name())?;
        out.recv(meta, parsed)
    }
}

/// fluentd TSV 파서 (`fluentd-json`)
///
/// `message`를 탭으로 분리해 정확히 3열(시각, 태그, JSON 본문)을
/// 기대합니다. 1열이 메타데이터 타임스탬프, 2열이 태그가 되고,
/// 3열의 JSON 객체가 새 레코드가 됩니다.
#[derive(Debug, Default)]
pub struct FluentdJsonParser;

impl FluentdJsonParser {
    /// 새 FluentdJsonParser를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// fluentd 시각 열을 epoch 초로 해석합니다.
    ///
    /// RFC 3339(오프셋 포함)를 우선 시도하고, 실패하면 naive ISO/공백 구분
    /// 형식으로 재시도합니다.
    fn parse_time(&self, text: &str) -> Result<i64, SluiceError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Ok(dt.timestamp());
        }
        iso_prefix_epoch(text, self.name())
            .or_else(|_| naive_epoch(text, "%Y-%m-%d %H:%M:%S", self.name()))
    }
}

impl FormatParser for FluentdJsonParser {
    fn name(&self) -> &'static str {
        "fluentd-json"
    }

    fn recv(
        &self,
        mut meta: Metadata,
        record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        let msg = message_of(&record, self.name())?;
        let cols: Vec<&str> = msg.split('\t').collect();
        if cols.len() != 3 {
            return Err(SluiceError::Parse(ParseError::ColumnCount {
                format: self.name().to_owned(),
                expected: 3,
                actual: cols.len(),
            }));
        }

        meta.timestamp = self.parse_time(cols[0])?;
        meta.tag = Some(cols[1].to_owned());
        let parsed = parse_object(cols[2], self.name())?;
        out.recv(meta, parsed)
    }
}
