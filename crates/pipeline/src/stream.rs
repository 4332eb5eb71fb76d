//! 스트림 -- 형식 목록으로부터 선형 푸시 체인을 구성하고 실행합니다.
//!
//! 체인은 `Fetcher → Parser → ... → Parser → Sink` 구조이며, 싱크는
//! [`Stream::read`] 호출마다 명시적으로 주입됩니다. 스테이지가 공유하는
//! 가변 싱크 상태는 없으므로, 빌드된 `Stream` 하나를 여러 파일에 순차로
//! 재사용할 수 있습니다.
//!
//! 실행은 엄격한 depth-first입니다: Fetcher가 방출한 쌍 하나가 남은 모든
//! 파서를 거쳐 싱크에 도달한 뒤에야 다음 쌍이 생산됩니다.

use metrics::counter;
use tracing::debug;

use sluice_core::error::{ConfigError, SluiceError};
use sluice_core::metadata::{Metadata, Record};
use sluice_core::metrics::{
    LABEL_FORMAT, PIPELINE_FILES_TOTAL, PIPELINE_PARSE_ERRORS_TOTAL,
    PIPELINE_RECORDS_EMITTED_TOTAL,
};
use sluice_core::stage::{Fetcher, FormatParser, ObjectStore, Sink};

use crate::registry::{Stage, build_stage};

/// 빌드된 파이프라인 체인
///
/// 형식 목록 하나당 한 번 빌드하며, 빌드 후에는 불변입니다.
pub struct Stream {
    fetcher: Box<dyn Fetcher>,
    parsers: Vec<Box<dyn FormatParser>>,
    formats: Vec<String>,
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("formats", &self.formats)
            .finish_non_exhaustive()
    }
}

impl Stream {
    /// 형식 식별자 목록에서 스트림을 빌드합니다.
    ///
    /// # Errors
    ///
    /// 레코드 처리가 시작되기 전에 다음을 검증합니다:
    /// - 목록이 비어 있으면 [`ConfigError::EmptyPipeline`]
    /// - 식별자가 레지스트리에 없으면 [`ConfigError::UnknownFormat`]
    /// - 첫 식별자가 Fetcher가 아니면 [`ConfigError::NotAFetcher`]
    /// - Fetcher가 선두 이외 위치에 있으면 [`ConfigError::InvalidValue`]
    pub fn build(formats: &[String]) -> Result<Self, SluiceError> {
        let (head, rest) = formats
            .split_first()
            .ok_or(SluiceError::Config(ConfigError::EmptyPipeline))?;

        let resolve = |id: &String| {
            build_stage(id).ok_or_else(|| {
                SluiceError::Config(ConfigError::UnknownFormat { name: id.clone() })
            })
        };

        let fetcher = match resolve(head)? {
            Stage::Fetcher(fetcher) => fetcher,
            Stage::Parser(_) => {
                return Err(SluiceError::Config(ConfigError::NotAFetcher {
                    name: head.clone(),
                }));
            }
        };

        let mut parsers = Vec::with_capacity(rest.len());
        for id in rest {
            match resolve(id)? {
                Stage::Parser(parser) => parsers.push(parser),
                Stage::Fetcher(_) => {
                    return Err(SluiceError::Config(ConfigError::InvalidValue {
                        field: "format".to_owned(),
                        reason: format!("fetcher \"{id}\" must be the first stage"),
                    }));
                }
            }
        }

        debug!(formats = ?formats, "stream built");
        Ok(Self {
            fetcher,
            parsers,
            formats: formats.to_vec(),
        })
    }

    /// 이 스트림을 빌드한 형식 목록을 반환합니다.
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// 오브젝트 하나를 읽어 정규화된 쌍들을 `sink`로 밀어 넣습니다.
    ///
    /// 싱크는 이 호출 동안에만 체인 말단에 연결됩니다. 호출은 순차 사용을
    /// 전제하며, 하나의 `read` 실행 중에 같은 싱크를 다른 실행과 공유하면
    /// 안 됩니다.
    pub fn read(
        &self,
        store: &dyn ObjectStore,
        bucket: &str,
        key: &str,
        sink: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        debug!(bucket, key, fetcher = self.fetcher.name(), "reading object");
        counter!(PIPELINE_FILES_TOTAL).increment(1);

        let mut chain = StageChain {
            rest: &self.parsers,
            sink,
        };
        self.fetcher.fetch(store, bucket, key, &mut chain)
    }
}

/// 남은 파서들과 말단 싱크를 잇는 내부 체인
///
/// `recv`는 쌍 하나를 첫 파서에 넘기고, 그 파서의 산출물은 꼬리 체인으로
/// 재귀합니다. 파서가 없으면 싱크가 종점입니다.
struct StageChain<'a> {
    rest: &'a [Box<dyn FormatParser>],
    sink: &'a mut dyn Sink,
}

impl Sink for StageChain<'_> {
    fn recv(&mut self, meta: Metadata, record: Record) -> Result<(), SluiceError> {
        match self.rest.split_first() {
            Some((parser, tail)) => {
                let mut next = StageChain {
                    rest: tail,
                    sink: &mut *self.sink,
                };
                parser.recv(meta, record, &mut next).inspect_err(|e| {
                    if matches!(e, SluiceError::Parse(_)) {
                        counter!(PIPELINE_PARSE_ERRORS_TOTAL, LABEL_FORMAT => parser.name())
                            .increment(1);
                    }
                })
            }
            None => {
                counter!(PIPELINE_RECORDS_EMITTED_TOTAL).increment(1);
                self.sink.recv(meta, record)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::CollectSink;

    use std::io::Write;

    fn formats(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| (*s).to_owned()).collect()
    }

    /// 호출 여부를 기록하는 스토어 -- 빌드 실패가 fetch보다 먼저임을 검증
    struct PanicStore;

    impl ObjectStore for PanicStore {
        fn download(
            &self,
            _bucket: &str,
            _key: &str,
            _dst: &mut dyn Write,
        ) -> Result<u64, SluiceError> {
            panic!("store must not be touched");
        }
    }

    #[test]
    fn build_rejects_empty_format_list() {
        let result = Stream::build(&[]);
        assert!(matches!(
            result,
            Err(SluiceError::Config(ConfigError::EmptyPipeline))
        ));
    }

    #[test]
    fn build_rejects_unknown_format_before_any_fetch() {
        let result = Stream::build(&formats(&["s3-lines", "no-such-format"]));
        match result {
            Err(SluiceError::Config(ConfigError::UnknownFormat { name })) => {
                assert_eq!(name, "no-such-format");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn build_rejects_parser_head() {
        let result = Stream::build(&formats(&["syslog"]));
        assert!(matches!(
            result,
            Err(SluiceError::Config(ConfigError::NotAFetcher { .. }))
        ));
    }

    #[test]
    fn build_rejects_fetcher_in_tail() {
        let result = Stream::build(&formats(&["s3-lines", "s3-text"]));
        assert!(matches!(
            result,
            Err(SluiceError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn ignore_stream_never_touches_store() {
        let stream = Stream::build(&formats(&["ignore"])).expect("build");
        let mut sink = CollectSink::new();
        stream
            .read(&PanicStore, "bucket", "key", &mut sink)
            .expect("ignore read");
        assert!(sink.items.is_empty());
    }

    #[test]
    fn chain_threads_record_through_parsers() {
        let parsers = [
            crate::registry::build_stage("json"),
            crate::registry::build_stage("guardduty"),
        ];
        let parsers: Vec<Box<dyn FormatParser>> = parsers
            .into_iter()
            .map(|s| match s {
                Some(Stage::Parser(p)) => p,
                _ => unreachable!(),
            })
            .collect();

        let mut sink = CollectSink::new();
        let mut chain = StageChain {
            rest: &parsers,
            sink: &mut sink,
        };
        chain
            .recv(
                Metadata::new(),
                sluice_core::metadata::message_record("{\"finding\": \"x\"}"),
            )
            .expect("chain recv");

        assert_eq!(sink.items.len(), 1);
        assert_eq!(sink.items[0].0.tag.as_deref(), Some("aws.guardduty"));
        assert_eq!(sink.items[0].1["finding"], serde_json::json!("x"));
    }
}
