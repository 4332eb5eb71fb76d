//! 형식 레지스트리 -- 식별자 문자열을 스테이지 인스턴스로 해석합니다.
//!
//! 파이프라인 정의는 형식 식별자 목록이고, 각 식별자는 이 레지스트리의
//! 고정 집합에서 해석됩니다. 알 수 없는 식별자는 파이프라인 빌드 시점의
//! 설정 에러이며, 실행 시점에는 절대 등장하지 않습니다.

use sluice_core::stage::{Fetcher, FormatParser};

use crate::fetch::{IgnoreFetcher, LineFetcher, TextFetcher};
use crate::parser::{
    AuditBeatParser, CloudTrailParser, FalconParser, FieldStampParser, FluentdJsonParser,
    GuardDutyParser, JsonParser, KeaParser, PacketBeatParser, PaloAltoParser, SyslogParser,
};

/// 레지스트리에 등록된 전체 형식 식별자 (해석 가능성 테스트로 보증)
pub const FORMAT_IDS: &[&str] = &[
    // fetchers
    "s3-lines",
    "s3-text",
    "ignore",
    // general parsers
    "json",
    "syslog",
    "fluentd-json",
    // specific products
    "paloalto",
    "g-suite-login",
    "cloudtrail",
    "guardduty",
    "azure-ad-audit",
    "azure-ad-event",
    "azure-ad-risk-event",
    "cylance",
    "cylance-event",
    "cylance-threat",
    "kea",
    "packetbeat",
    "auditbeat",
    "falcon",
    "ecs-hako",
];

/// 스테이지 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// 파이프라인 선두 (오브젝트 취득)
    Fetcher,
    /// 중간/말단 변환 스테이지
    Parser,
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetcher => write!(f, "fetcher"),
            Self::Parser => write!(f, "parser"),
        }
    }
}

/// 해석된 스테이지 인스턴스
pub enum Stage {
    /// Fetcher 스테이지
    Fetcher(Box<dyn Fetcher>),
    /// Parser 스테이지
    Parser(Box<dyn FormatParser>),
}

impl Stage {
    /// 스테이지 종류를 반환합니다.
    pub fn kind(&self) -> StageKind {
        match self {
            Self::Fetcher(_) => StageKind::Fetcher,
            Self::Parser(_) => StageKind::Parser,
        }
    }
}

/// 식별자를 스테이지로 해석합니다. 알 수 없는 식별자는 `None`입니다.
pub fn build_stage(id: &str) -> Option<Stage> {
    let stage = match id {
        // fetchers
        "s3-lines" => Stage::Fetcher(Box::new(LineFetcher::new())),
        "s3-text" => Stage::Fetcher(Box::new(TextFetcher::new())),
        "ignore" => Stage::Fetcher(Box::new(IgnoreFetcher::new())),
        // general parsers
        "json" => Stage::Parser(Box::new(JsonParser::new())),
        "syslog" => Stage::Parser(Box::new(SyslogParser::new())),
        "fluentd-json" => Stage::Parser(Box::new(FluentdJsonParser::new())),
        // specific products
        "paloalto" => Stage::Parser(Box::new(PaloAltoParser::new())),
        "g-suite-login" => Stage::Parser(Box::new(FieldStampParser::gsuite_login())),
        "cloudtrail" => Stage::Parser(Box::new(CloudTrailParser::new())),
        "guardduty" => Stage::Parser(Box::new(GuardDutyParser::new())),
        "azure-ad-audit" => Stage::Parser(Box::new(FieldStampParser::azure_ad_audit())),
        "azure-ad-event" => Stage::Parser(Box::new(FieldStampParser::azure_ad_signin())),
        "azure-ad-risk-event" => Stage::Parser(Box::new(FieldStampParser::azure_ad_risk())),
        "cylance" | "cylance-event" => {
            Stage::Parser(Box::new(FieldStampParser::cylance_event()))
        }
        "cylance-threat" => Stage::Parser(Box::new(FieldStampParser::cylance_threat())),
        "kea" => Stage::Parser(Box::new(KeaParser::new())),
        "packetbeat" => Stage::Parser(Box::new(PacketBeatParser::new())),
        "auditbeat" => Stage::Parser(Box::new(AuditBeatParser::new())),
        "falcon" => Stage::Parser(Box::new(FalconParser::new())),
        "ecs-hako" => Stage::Parser(Box::new(FieldStampParser::ecs_hako())),
        _ => return None,
    };
    Some(stage)
}

/// 알려진 형식 식별자와 종류 목록을 반환합니다 (CLI `formats` 출력용).
pub fn known_formats() -> Vec<(&'static str, StageKind)> {
    FORMAT_IDS
        .iter()
        .map(|id| {
            let stage = build_stage(id).expect("FORMAT_IDS entry must resolve");
            (*id, stage.kind())
        })
        .collect()
}
