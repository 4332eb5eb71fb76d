//! ISC Kea DHCP 로그 파서
//!
//! 2단계 파싱입니다: 외부 정규식이 공통 접두 필드 9개를 추출하고,
//! 추출된 `event` 값으로 이벤트별 정규식을 디스패치해 남은 본문에서
//! `ipaddr`를 추출합니다. 알 수 없는 이벤트는 치명적 에러입니다
//! (조용히 버리지 않음).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use sluice_core::error::{ParseError, SluiceError};
use sluice_core::metadata::{Metadata, Record};
use sluice_core::stage::{FormatParser, Sink};

use super::{message_of, naive_epoch};

/// 공통 접두 패턴: `<시각> <레벨> [<프로세스>] <이벤트> [hwtype=<t> <addr>], cid=[<id>], tid=<id>: <본문>`
static PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{3}) ([A-Z]+)\s+\[(\S+?)\] (\S+) \[hwtype=(\S+) (\S+)\], cid=\[(.*?)\], tid=(\S+): (.*)",
    )
    .expect("kea prefix regex must compile")
});

/// 공통 접두 필드명 (정규식 그룹 순서와 일치)
const PREFIX_FIELDS: [&str; 9] = [
    "event_datetime",
    "msg_level",
    "proc",
    "event",
    "hwtype",
    "hwaddr",
    "client_id",
    "tx_id",
    "msg",
];

/// 이벤트별 본문 패턴
static EVENT_REGEX: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("DHCP4_INIT_REBOOT", r"requests address (\S+)"),
        ("DHCP4_LEASE_ADVERT", r"lease (\S+) will be advertised"),
        ("DHCP4_LEASE_ALLOC", r"lease (\S+) has been allocated"),
    ]
    .into_iter()
    .map(|(event, pattern)| {
        (
            event,
            Regex::new(pattern).expect("kea event regex must compile"),
        )
    })
    .collect()
});

/// Kea DHCP 로그 파서 (`kea`)
#[derive(Debug, Default)]
pub struct KeaParser;

impl KeaParser {
    /// 새 KeaParser를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for KeaParser {
    fn name(&self) -> &'static str {
        "kea"
    }

    fn recv(
        &self,
        mut meta: Metadata,
        mut record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        let msg = message_of(&record, self.name())?.to_owned();

        let caps = PREFIX_REGEX.captures(&msg).ok_or_else(|| {
            SluiceError::Parse(ParseError::Malformed {
                format: self.name().to_owned(),
                input: msg.clone(),
            })
        })?;

        for (i, field) in PREFIX_FIELDS.iter().enumerate() {
            record.insert(
                (*field).to_owned(),
                Value::String(caps[i + 1].to_owned()),
            );
        }

        let event = caps[4].to_owned();
        let body = caps[9].to_owned();

        let event_regex = EVENT_REGEX
            .iter()
            .find(|(name, _)| *name == event)
            .map(|(_, regex)| regex)
            .ok_or_else(|| {
                SluiceError::Parse(ParseError::UnsupportedEvent {
                    format: self.name().to_owned(),
                    event: event.clone(),
                })
            })?;

        let ipaddr = event_regex
            .captures(&body)
            .map(|c| c[1].to_owned())
            .ok_or_else(|| {
                SluiceError::Parse(ParseError::Malformed {
                    format: self.name().to_owned(),
                    input: body.clone(),
                })
            })?;
        record.insert("ipaddr".to_owned(), Value::String(ipaddr));

        // "2018-05-12 06:00:24.483" -> 밀리초를 버리고 초 단위로 해석
        let datetime = caps[1].split('.').next().unwrap_or_default();
        meta.timestamp = naive_epoch(datetime, "%Y-%m-%d %H:%M:%S", self.name())?;
        meta.tag = Some("kea.log".to_owned());

        out.recv(meta, record)
    }
}
