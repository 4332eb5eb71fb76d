//! 전통적 syslog 라인 파서
//!
//! `Nov 21 06:00:24 ip-172-31-7-118 sshd[23511]: test message` 형태의
//! 라인을 고정 정규식으로 분해합니다.
//!
//! syslog 타임스탬프에는 연도가 없습니다. 연도 결정은 [`YearStrategy`]로
//! 명시적으로 선택합니다 -- 기본값은 처리 시점의 연도입니다.

use std::sync::LazyLock;

use chrono::{Datelike, Utc};
use regex::Regex;
use serde_json::Value;

use sluice_core::error::{ParseError, SluiceError};
use sluice_core::metadata::{Metadata, Record};
use sluice_core::stage::{FormatParser, Sink};

use super::{message_of, naive_epoch};

/// syslog 라인 패턴: `<월 일 시:분:초> <호스트> <프로세스>[<pid>]: <메시지>`
static LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S{3} \d{1,2} \d{2}:\d{2}:\d{2}) (\S+) (\S+)\[(\d+)\]:\s*(.*)$")
        .expect("syslog line regex must compile")
});

/// 연도 없는 syslog 타임스탬프의 연도 결정 방식
///
/// 연도는 라인에 없으므로 외부에서 공급해야 합니다. 파일 메타데이터
/// 추론은 지원하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearStrategy {
    /// 처리 시점(UTC)의 연도를 사용 (기본값)
    CurrentYear,
    /// 고정 연도를 사용 -- 재처리/테스트의 결정성 확보용
    Fixed(i32),
}

impl YearStrategy {
    fn year(&self) -> i32 {
        match self {
            Self::CurrentYear => Utc::now().year(),
            Self::Fixed(year) => *year,
        }
    }
}

/// syslog 라인 파서 (`syslog`)
///
/// 매칭된 라인은 `datetime`/`hostname`/`proc_name`/`proc_id`/`message`
/// 다섯 필드의 새 레코드로 교체되고, 메타데이터 타임스탬프가 라인의
/// 시각으로 재계산됩니다. 매칭 실패는 해당 라인을 담은 파싱 에러입니다.
#[derive(Debug)]
pub struct SyslogParser {
    year: YearStrategy,
}

impl SyslogParser {
    /// 처리 시점 연도를 사용하는 기본 파서를 생성합니다.
    pub fn new() -> Self {
        Self {
            year: YearStrategy::CurrentYear,
        }
    }

    /// 연도 결정 방식을 지정합니다.
    pub fn with_year(mut self, year: YearStrategy) -> Self {
        self.year = year;
        self
    }

    /// 라인을 분해해 필드 레코드를 만듭니다. 타임스탬프 해석은 하지 않습니다.
    pub fn split(line: &str) -> Result<Record, SluiceError> {
        let caps = LINE_REGEX.captures(line).ok_or_else(|| {
            SluiceError::Parse(ParseError::Malformed {
                format: "syslog".to_owned(),
                input: line.to_owned(),
            })
        })?;

        let mut record = Record::new();
        for (field, group) in [
            ("datetime", 1),
            ("hostname", 2),
            ("proc_name", 3),
            ("proc_id", 4),
            ("message", 5),
        ] {
            record.insert(
                field.to_owned(),
                Value::String(caps[group].to_owned()),
            );
        }
        Ok(record)
    }
}

impl Default for SyslogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatParser for SyslogParser {
    fn name(&self) -> &'static str {
        "syslog"
    }

    fn recv(
        &self,
        mut meta: Metadata,
        record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        let msg = message_of(&record, self.name())?;
        let fields = Self::split(msg)?;

        let datetime = fields["datetime"].as_str().unwrap_or_default();
        let stamped = format!("{} {}", self.year.year(), datetime);
        meta.timestamp = naive_epoch(&stamped, "%Y %b %d %H:%M:%S", self.name())?;

        out.recv(meta, fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::testutil::{record, run_parser};
    use proptest::prelude::*;
    use serde_json::json;

    const LINE: &str = "Nov 21 06:00:24 ip-172-31-7-118 sshd[23511]: test message";

    #[test]
    fn splits_line_into_fields() {
        let parser = SyslogParser::new().with_year(YearStrategy::Fixed(2018));
        let output = run_parser(&parser, vec![record(json!({"message": LINE}))]);

        assert_eq!(output.len(), 1);
        let (_, data) = &output[0];
        assert_eq!(data["hostname"], json!("ip-172-31-7-118"));
        assert_eq!(data["proc_name"], json!("sshd"));
        assert_eq!(data["proc_id"], json!("23511"));
        assert_eq!(data["message"], json!("test message"));
        assert_eq!(data["datetime"], json!("Nov 21 06:00:24"));
    }

    #[test]
    fn fixed_year_makes_timestamp_deterministic() {
        let parser = SyslogParser::new().with_year(YearStrategy::Fixed(2018));
        let output = run_parser(&parser, vec![record(json!({"message": LINE}))]);

        // 2018-11-21T06:00:24Z
        assert_eq!(output[0].0.timestamp, 1_542_780_024);
    }

    #[test]
    fn mismatch_is_parse_error_with_line() {
        let parser = SyslogParser::new();
        let mut sink = crate::handler::CollectSink::new();
        let result = parser.recv(
            Metadata::new(),
            record(json!({"message": "not a syslog line"})),
            &mut sink,
        );

        match result {
            Err(SluiceError::Parse(ParseError::Malformed { input, .. })) => {
                assert_eq!(input, "not a syslog line");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(sink.items.is_empty());
    }

    #[test]
    fn message_without_pid_bracket_is_rejected() {
        let result = SyslogParser::split("Nov 21 06:00:24 host cron: no pid");
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn split_never_panics(line in ".{0,200}") {
            let _ = SyslogParser::split(&line);
        }
    }
}
