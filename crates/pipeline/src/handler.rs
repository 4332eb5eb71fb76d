//! 핸들러 브리지와 기본 제공 핸들러
//!
//! [`Handler`]는 파이프라인 말단의 플러그블 소비자 계약입니다. 핸들러는
//! 고정된 이름 레지스트리([`resolve_handler`])에서 해석됩니다 -- 임의
//! 코드를 코어 프로세스에 주입하는 방식은 지원하지 않으며, 외부 구현은
//! 같은 trait 뒤에서 추가됩니다.

use std::collections::BTreeMap;
use std::io::Write;

use metrics::counter;
use serde_json::{Value, json};
use tracing::debug;

use sluice_core::error::{ConfigError, HandlerError, SluiceError};
use sluice_core::metrics::{HANDLER_RECORDS_TOTAL, LABEL_HANDLER};
use sluice_core::metadata::{Metadata, Record};
use sluice_core::stage::{Handler, Sink};

/// [`Sink`]를 [`Handler`]에 연결하는 브리지
///
/// [`Stream::read`](crate::stream::Stream::read)의 싱크 자리에 핸들러를
/// 꽂을 때 사용합니다.
pub struct HandlerSink<'a> {
    handler: &'a mut dyn Handler,
}

impl<'a> HandlerSink<'a> {
    /// 핸들러를 감싸는 새 브리지를 생성합니다.
    pub fn new(handler: &'a mut dyn Handler) -> Self {
        Self { handler }
    }
}

impl Sink for HandlerSink<'_> {
    fn recv(&mut self, meta: Metadata, record: Record) -> Result<(), SluiceError> {
        counter!(HANDLER_RECORDS_TOTAL, LABEL_HANDLER => self.handler.name()).increment(1);
        self.handler.recv(&meta, &record)
    }
}

/// 산출물을 메모리에 모으는 싱크 -- 테스트와 단건 조회용
#[derive(Debug, Default)]
pub struct CollectSink {
    /// 수집된 (메타데이터, 레코드) 쌍
    pub items: Vec<(Metadata, Record)>,
}

impl CollectSink {
    /// 빈 수집 싱크를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for CollectSink {
    fn recv(&mut self, meta: Metadata, record: Record) -> Result<(), SluiceError> {
        self.items.push((meta, record));
        Ok(())
    }
}

/// 태그별 레코드 수를 세는 핸들러 (`count`)
///
/// 결과는 `{"total": N, "tags": {"<tag>": n, ...}}` 형태입니다.
/// 태그 없는 레코드는 `"(untagged)"`로 집계됩니다.
#[derive(Debug, Default)]
pub struct CountHandler {
    total: u64,
    tags: BTreeMap<String, u64>,
}

impl CountHandler {
    /// 새 CountHandler를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Handler for CountHandler {
    fn name(&self) -> &'static str {
        "count"
    }

    fn setup(&mut self, args: &Value) -> Result<(), SluiceError> {
        debug!(handler = self.name(), args = %args, "handler setup");
        self.total = 0;
        self.tags.clear();
        Ok(())
    }

    fn recv(&mut self, meta: &Metadata, _record: &Record) -> Result<(), SluiceError> {
        self.total += 1;
        let tag = meta.tag.as_deref().unwrap_or("(untagged)");
        *self.tags.entry(tag.to_owned()).or_default() += 1;
        Ok(())
    }

    fn result(&mut self) -> Result<Value, SluiceError> {
        Ok(json!({"total": self.total, "tags": self.tags}))
    }
}

/// 정규화 쌍을 NDJSON으로 기록하는 핸들러 (`jsonl`)
///
/// 레코드당 `{"meta": {...}, "record": {...}}` 한 줄을 기록하고,
/// 결과로 기록한 줄 수를 반환합니다.
pub struct JsonLinesHandler {
    out: Box<dyn Write>,
    count: u64,
}

impl JsonLinesHandler {
    /// 임의의 출력 스트림에 기록하는 핸들러를 생성합니다.
    pub fn new(out: Box<dyn Write>) -> Self {
        Self { out, count: 0 }
    }

    /// 표준 출력에 기록하는 핸들러를 생성합니다.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }
}

impl Handler for JsonLinesHandler {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn setup(&mut self, args: &Value) -> Result<(), SluiceError> {
        debug!(handler = self.name(), args = %args, "handler setup");
        self.count = 0;
        Ok(())
    }

    fn recv(&mut self, meta: &Metadata, record: &Record) -> Result<(), SluiceError> {
        let line = json!({"meta": meta, "record": record});
        writeln!(self.out, "{line}").map_err(|e| {
            SluiceError::Handler(HandlerError::Deliver {
                name: self.name().to_owned(),
                reason: e.to_string(),
            })
        })?;
        self.count += 1;
        Ok(())
    }

    fn result(&mut self) -> Result<Value, SluiceError> {
        self.out.flush().map_err(|e| {
            SluiceError::Handler(HandlerError::Deliver {
                name: self.name().to_owned(),
                reason: e.to_string(),
            })
        })?;
        Ok(json!(self.count))
    }
}

/// 핸들러 이름을 기본 제공 핸들러 인스턴스로 해석합니다.
pub fn resolve_handler(name: &str) -> Result<Box<dyn Handler>, SluiceError> {
    match name {
        "count" => Ok(Box::new(CountHandler::new())),
        "jsonl" => Ok(Box::new(JsonLinesHandler::stdout())),
        _ => Err(SluiceError::Config(ConfigError::UnknownHandler {
            name: name.to_owned(),
        })),
    }
}
