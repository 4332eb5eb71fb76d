//! 타임스탬프 필드 + 고정 태그형 벤더 파서
//!
//! 여러 벤더 제품(GSuite, Azure AD, Cylance, ECS)의 구조화 JSON 로그는
//! 동일한 골격을 공유합니다: 알려진 필드에서 타임스탬프를 읽고, 벤더별
//! 고정 태그를 붙인 뒤 레코드를 그대로 통과시킵니다. [`FieldStampParser`]
//! 하나가 이 골격을 구현하고, 생성자가 벤더별 조합을 제공합니다.
//!
//! 타임스탬프 필드가 없으면 기존 메타데이터 타임스탬프를 유지합니다
//! (에러가 아님). 필드가 있는데 해석할 수 없으면 파싱 에러입니다.

use sluice_core::error::SluiceError;
use sluice_core::metadata::{Metadata, Record};
use sluice_core::stage::{FormatParser, Sink};

use super::{iso_prefix_epoch, naive_epoch, str_path};

/// 타임스탬프 텍스트 해석 방식
#[derive(Debug, Clone, Copy)]
enum StampFormat {
    /// ISO-8601을 초 단위로 잘라 해석 (밀리초/타임존 무시)
    IsoPrefix,
    /// `%Y-%m-%dT%H:%M:%SZ` 정확히 일치
    IsoZulu,
}

/// 타임스탬프 필드 + 고정 태그 파서
///
/// `field`는 dot 표기 중첩 경로를 지원합니다 (예: GSuite의 `"id.time"`).
#[derive(Debug)]
pub struct FieldStampParser {
    name: &'static str,
    tag: &'static str,
    field: &'static str,
    stamp: StampFormat,
}

impl FieldStampParser {
    /// GSuite 로그인 감사 로그 (`g-suite-login`)
    pub fn gsuite_login() -> Self {
        Self {
            name: "g-suite-login",
            tag: "gsuite.login",
            field: "id.time",
            stamp: StampFormat::IsoPrefix,
        }
    }

    /// Azure AD 감사 로그 (`azure-ad-audit`)
    pub fn azure_ad_audit() -> Self {
        Self {
            name: "azure-ad-audit",
            tag: "azure_ad.audit",
            field: "activityDate",
            stamp: StampFormat::IsoPrefix,
        }
    }

    /// Azure AD 로그인 이벤트 (`azure-ad-event`)
    pub fn azure_ad_signin() -> Self {
        Self {
            name: "azure-ad-event",
            tag: "azure_ad.signin_event",
            field: "signinDateTime",
            stamp: StampFormat::IsoPrefix,
        }
    }

    /// Azure AD 위험 이벤트 (`azure-ad-risk-event`)
    pub fn azure_ad_risk() -> Self {
        Self {
            name: "azure-ad-risk-event",
            tag: "azure_ad.risk_event",
            field: "riskEventDateTime",
            stamp: StampFormat::IsoPrefix,
        }
    }

    /// Cylance 이벤트 (`cylance`, `cylance-event`)
    pub fn cylance_event() -> Self {
        Self {
            name: "cylance-event",
            tag: "cylance.event",
            field: "datetime",
            stamp: StampFormat::IsoPrefix,
        }
    }

    /// Cylance 위협 (`cylance-threat`)
    pub fn cylance_threat() -> Self {
        Self {
            name: "cylance-threat",
            tag: "cylance.threat",
            field: "datetime",
            stamp: StampFormat::IsoPrefix,
        }
    }

    /// ECS 태스크 로그 (`ecs-hako`)
    pub fn ecs_hako() -> Self {
        Self {
            name: "ecs-hako",
            tag: "ecs.hako",
            field: "time",
            stamp: StampFormat::IsoZulu,
        }
    }

    fn parse_stamp(&self, text: &str) -> Result<i64, SluiceError> {
        match self.stamp {
            StampFormat::IsoPrefix => iso_prefix_epoch(text, self.name),
            StampFormat::IsoZulu => naive_epoch(text, "%Y-%m-%dT%H:%M:%SZ", self.name),
        }
    }
}

impl FormatParser for FieldStampParser {
    fn name(&self) -> &'static str {
        self.name
    }

    fn recv(
        &self,
        mut meta: Metadata,
        record: Record,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        if let Some(text) = str_path(&record, self.field) {
            meta.timestamp = self.parse_stamp(text)?;
        }
        meta.tag = Some(self.tag.to_owned());
        out.recv(meta, record)
    }
}
