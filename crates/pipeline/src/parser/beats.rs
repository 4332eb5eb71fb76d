//! Beats 계열 파서 (PacketBeat, AuditBeat)
//!
//! 두 파서 모두 `@timestamp` ISO 접두사로 타임스탬프를 재계산하고,
//! 하위 이벤트 종류에 따라 태그와 요약 메시지를 결정합니다.

use serde_json::Value;

use sluice_core::error::{ParseError, SluiceError};
use sluice_core::metadata::{Metadata, Record};
use sluice_core::stage::{FormatParser, Sink};

use super::{iso_prefix_epoch, str_or_dash};

/// PacketBeat 파서 (`packetbeat`)
///
/// `type` 필드(필수)로 하위 태그 `packetbeat.{type}`를 결정합니다.
/// DNS 이벤트에는 `"{query} from {client_ip}"` 요약 메시지를 합성합니다.
#[derive(Debug, Default)]
pub struct PacketBeatParser;

impl PacketBeatParser {
    /// 새 PacketBeatParser를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for PacketBeatParser {
    fn name(&self) -> &'static str {
        "packetbeat"
    }

    fn recv(
        &self,
        mut meta: Metadata,
        mut record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        let event_type = record
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SluiceError::Parse(ParseError::MissingField {
                    format: self.name().to_owned(),
                    field: "type".to_owned(),
                })
            })?
            .to_owned();

        meta.tag = Some(format!("packetbeat.{event_type}"));
        if let Some(text) = record.get("@timestamp").and_then(Value::as_str) {
            meta.timestamp = iso_prefix_epoch(text, self.name())?;
        }

        if event_type == "dns" {
            let message = format!(
                "{} from {}",
                str_or_dash(&record, "query"),
                str_or_dash(&record, "client_ip"),
            );
            record.insert("message".to_owned(), Value::String(message));
        }

        out.recv(meta, record)
    }
}

/// AuditBeat 파서 (`auditbeat`)
///
/// 기본 태그는 `auditbeat.log`입니다. 중첩 `audit.kernel` 객체가 있으면
/// `auditbeat.kernel`, 아니면 `audit.file` 객체가 있으면 `auditbeat.file`로
/// 분기하며 각각 요약 메시지를 합성합니다. `audit` 객체 자체가 없거나
/// 비어 있으면 레코드를 방출하지 않습니다 (드롭).
#[derive(Debug, Default)]
pub struct AuditBeatParser;

impl AuditBeatParser {
    /// 새 AuditBeatParser를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for AuditBeatParser {
    fn name(&self) -> &'static str {
        "auditbeat"
    }

    fn recv(
        &self,
        mut meta: Metadata,
        mut record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        meta.tag = Some("auditbeat.log".to_owned());
        if let Some(text) = record.get("@timestamp").and_then(Value::as_str) {
            meta.timestamp = iso_prefix_epoch(text, self.name())?;
        }

        let audit = match record.get("audit").and_then(Value::as_object) {
            Some(map) if !map.is_empty() => map,
            _ => return Ok(()),
        };

        if audit.get("kernel").is_some_and(Value::is_object) {
            meta.tag = Some("auditbeat.kernel".to_owned());
            let message = format!(
                "{} {} {} by {}",
                str_or_dash(&record, "audit.kernel.actor.primary"),
                str_or_dash(&record, "audit.kernel.action"),
                str_or_dash(&record, "audit.kernel.thing.primary"),
                str_or_dash(&record, "audit.kernel.how"),
            );
            record.insert("message".to_owned(), Value::String(message));
        } else if audit.get("file").is_some_and(Value::is_object) {
            meta.tag = Some("auditbeat.file".to_owned());
            let message = format!(
                "{} is {} ({})",
                str_or_dash(&record, "audit.file.path"),
                str_or_dash(&record, "audit.file.action"),
                str_or_dash(&record, "audit.file.sha256"),
            );
            record.insert("message".to_owned(), Value::String(message));
        }

        out.recv(meta, record)
    }
}
