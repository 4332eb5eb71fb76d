//! PaloAlto PAN-OS CSV 로그 파서
//!
//! 한 라인이 CSV 행 하나입니다 (따옴표 규칙 적용). 4번째 열(`Type`)이
//! 하위 형식(TRAFFIC/THREAT)을 판별하고, 행 길이는 하위 형식의 열 정의와
//! 정확히 일치해야 합니다. 값들은 고정 열 이름 목록에 zip되어 레코드
//! 필드가 되고, 주요 열로 요약 메시지를 합성합니다.

use csv::ReaderBuilder;
use serde_json::Value;

use sluice_core::error::{ParseError, SluiceError};
use sluice_core::metadata::{Metadata, Record};
use sluice_core::stage::{FormatParser, Sink};

use super::{message_of, naive_epoch, str_or_dash};

/// TRAFFIC 로그 열 정의 (PAN-OS 8.0 기준 54열)
const TRAFFIC_COLUMNS: [&str; 54] = [
    "Domain", "Receive Time", "Serial #", "Type", "Threat/Content Type",
    "Config Version", "Generate Time", "Source address", "Destination address",
    "NAT Source IP", "NAT Destination IP", "Rule", "Source User",
    "Destination User", "Application", "Virtual System", "Source Zone",
    "Destination Zone", "Inbound Interface", "Outbound Interface", "Log Action",
    "Time Logged", "Session ID", "Repeat Count", "Source Port",
    "Destination Port", "NAT Source Port", "NAT Destination Port", "Flags",
    "IP Protocol", "Action", "Bytes", "Bytes Sent", "Bytes Received", "Packets",
    "Start Time", "Elapsed Time (sec)", "Category", "Padding", "seqno",
    "actionflags", "Source Country", "Destination Country", "cpadding",
    "pkts_sent", "pkts_received", "session_end_reason", "dg_hier_level_1",
    "dg_hier_level_2", "dg_hier_level_3", "dg_hier_level_4", "vsys_name",
    "device_name", "action_source",
];

/// THREAT 로그 열 정의 (PAN-OS 8.0 기준 61열)
const THREAT_COLUMNS: [&str; 61] = [
    "Domain", "Receive Time", "Serial #", "Type", "Threat/Content Type",
    "Config Version", "Generate Time", "Source address", "Destination address",
    "NAT Source IP", "NAT Destination IP", "Rule", "Source User",
    "Destination User", "Application", "Virtual System", "Source Zone",
    "Destination Zone", "Inbound Interface", "Outbound Interface", "Log Action",
    "Time Logged", "Session ID", "Repeat Count", "Source Port",
    "Destination Port", "NAT Source Port", "NAT Destination Port", "Flags",
    "IP Protocol", "Action", "URL", "Threat/Content Name", "Category",
    "Severity", "Direction", "seqno", "actionflags", "Source Country",
    "Destination Country", "cpadding", "contenttype", "pcap_id", "filedigest",
    "cloud", "url_idx", "user_agent", "filetype", "xff", "referer", "sender",
    "subject", "recipient", "reportid", "dg_hier_level_1", "dg_hier_level_2",
    "dg_hier_level_3", "dg_hier_level_4", "vsys_name", "device_name",
    "file_url",
];

/// 요약 메시지에 쓰이는 열 (순서 고정)
const MESSAGE_COLUMNS: [&str; 7] = [
    "Source address", "Source Port", "Destination address", "Destination Port",
    "IP Protocol", "Bytes Sent", "Bytes Received",
];

/// PaloAlto CSV 파서 (`paloalto`)
#[derive(Debug, Default)]
pub struct PaloAltoParser;

impl PaloAltoParser {
    /// 새 PaloAltoParser를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// 하위 형식에 해당하는 열 정의와 태그를 반환합니다.
    fn subtype(&self, log_type: &str) -> Option<(&'static [&'static str], &'static str)> {
        match log_type {
            "TRAFFIC" => Some((&TRAFFIC_COLUMNS, "paloalto.traffic")),
            "THREAT" => Some((&THREAT_COLUMNS, "paloalto.threat")),
            _ => None,
        }
    }

    /// CSV 라인 하나를 셀 목록으로 분해합니다.
    fn split_row(&self, msg: &str) -> Result<Vec<String>, SluiceError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(msg.as_bytes());

        let mut rows = reader.records();
        let row = rows
            .next()
            .transpose()
            .map_err(|e| {
                SluiceError::Parse(ParseError::Malformed {
                    format: self.name().to_owned(),
                    input: format!("{msg}: {e}"),
                })
            })?
            .ok_or_else(|| {
                SluiceError::Parse(ParseError::Malformed {
                    format: self.name().to_owned(),
                    input: msg.to_owned(),
                })
            })?;

        Ok(row.iter().map(str::to_owned).collect())
    }
}

impl FormatParser for PaloAltoParser {
    fn name(&self) -> &'static str {
        "paloalto"
    }

    fn recv(
        &self,
        mut meta: Metadata,
        mut record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        let msg = message_of(&record, self.name())?.to_owned();
        let row = self.split_row(&msg)?;

        if row.len() < 4 {
            return Err(SluiceError::Parse(ParseError::ColumnCount {
                format: self.name().to_owned(),
                expected: 4,
                actual: row.len(),
            }));
        }

        let log_type = row[3].clone();
        let (columns, tag) = self.subtype(&log_type).ok_or_else(|| {
            SluiceError::Parse(ParseError::UnknownSubtype {
                format: self.name().to_owned(),
                value: log_type.clone(),
            })
        })?;

        if row.len() != columns.len() {
            return Err(SluiceError::Parse(ParseError::ColumnCount {
                format: self.name().to_owned(),
                expected: columns.len(),
                actual: row.len(),
            }));
        }

        for (column, cell) in columns.iter().zip(row) {
            record.insert((*column).to_owned(), Value::String(cell));
        }

        // PAN-OS는 URL 열을 자체적으로 한 번 더 따옴표로 감싼다
        if let Some(Value::String(url)) = record.get("URL").cloned() {
            record.insert(
                "URL".to_owned(),
                Value::String(url.trim_matches('"').to_owned()),
            );
        }

        if let Some(start) = record.get("Start Time").and_then(Value::as_str) {
            meta.timestamp = naive_epoch(start, "%Y/%m/%d %H:%M:%S", self.name())?;
        }

        let params: Vec<&str> = MESSAGE_COLUMNS
            .iter()
            .map(|column| str_or_dash(&record, column))
            .collect();
        let mut message = format!(
            "{}:{} => {}:{} ({}), Sent {} byte, Recv {} byte",
            params[0], params[1], params[2], params[3], params[4], params[5], params[6],
        );
        if log_type == "THREAT" {
            message.push(' ');
            message.push_str(str_or_dash(&record, "Threat/Content Name"));
        }

        record.insert("raw_message".to_owned(), Value::String(msg));
        record.insert("message".to_owned(), Value::String(message));

        meta.tag = Some(tag.to_owned());
        out.recv(meta, record)
    }
}
