//! 값 타입 -- 파이프라인을 흐르는 (메타데이터, 레코드) 쌍
//!
//! [`Metadata`]는 정규화된 로그 이벤트의 공통 메타데이터(태그, 타임스탬프,
//! 소스 컨텍스트, 요약 메시지)를 담습니다. [`Record`]는 파싱된 로그 본문으로,
//! 키-값 매핑(JSON 객체와 호환)입니다.
//!
//! 두 타입 모두 스테이지를 거치며 값으로 이동합니다. 1:N 팬아웃이 필요한
//! 파서는 `Metadata`를 `clone()`하여 각 출력에 독립 사본을 부여합니다.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// 파싱된 로그 레코드 -- 개방형 키-값 매핑
///
/// 최소한 `message` 필드를 갖고 파이프라인에 진입하며, 각 파서가
/// 구조화 필드를 추가하거나 레코드 전체를 교체합니다.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// `{message: <text>}` 한 필드만 갖는 레코드를 생성합니다.
///
/// Fetcher가 원시 라인/본문을 파이프라인에 밀어 넣을 때 사용합니다.
pub fn message_record(message: impl Into<String>) -> Record {
    let mut record = Record::new();
    record.insert(
        "message".to_owned(),
        serde_json::Value::String(message.into()),
    );
    record
}

/// 정규화된 로그 이벤트 메타데이터
///
/// 파서가 태그와 타임스탬프를 채우고, 핸들러가 레코드와 함께 소비합니다.
/// `clone()`은 완전히 독립적인 사본을 만듭니다 -- 사본의 `source` 맵을
/// 변경해도 원본은 영향을 받지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// 이벤트 분류 태그 (예: `"paloalto.threat"`). 파서가 설정합니다.
    pub tag: Option<String>,
    /// 이벤트 발생 시각 (epoch 초). 기본값은 처리 시점입니다.
    pub timestamp: i64,
    /// 소스 컨텍스트 (버킷명, 오브젝트 키 등 자유 형식 키-값)
    pub source: BTreeMap<String, String>,
    /// 사람이 읽을 수 있는 요약 메시지 (파서가 합성할 수 있음)
    pub message: Option<String>,
}

impl Metadata {
    /// 현재 처리 시각을 타임스탬프로 갖는 기본 메타데이터를 생성합니다.
    pub fn new() -> Self {
        Self {
            tag: None,
            timestamp: now_epoch(),
            source: BTreeMap::new(),
            message: None,
        }
    }

    /// 태그를 설정합니다.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// 소스 컨텍스트 항목을 추가합니다.
    pub fn with_source(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.source.insert(key.into(), value.into());
        self
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<tag:{}, timestamp:{}, source:{:?}>",
            self.tag.as_deref().unwrap_or("-"),
            self.timestamp,
            self.source,
        )
    }
}

/// 현재 시각을 epoch 초로 반환합니다.
pub fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
