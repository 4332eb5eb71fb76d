//! 배치 실행 -- 오브젝트 이벤트 목록을 핸들러 하나로 순차 처리합니다.
//!
//! 이벤트마다 라우팅을 해석하고, 형식 목록별로 빌드된 [`Stream`]을
//! 캐시에서 재사용합니다. 핸들러 생명주기는 배치 단위입니다:
//! `setup` → (파일마다 `recv` 반복) → `result`.
//!
//! 파일 하나의 치명 에러(라우팅 실패, 다운로드 실패, 파싱 에러)는 배치를
//! 즉시 중단시키며, 그 시점까지 핸들러에 전달된 레코드는 롤백되지
//! 않습니다.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use sluice_core::error::SluiceError;
use sluice_core::stage::{Handler, ObjectStore};

use crate::handler::HandlerSink;
use crate::route::RouteTable;
use crate::stream::Stream;

/// 처리할 오브젝트 하나를 가리키는 이벤트
///
/// 스토리지 알림에서 추출된 최소 정보입니다. 알 수 없는 필드는
/// 역직렬화 시 무시됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectEvent {
    /// 버킷명
    pub bucket_name: String,
    /// 오브젝트 키
    pub object_key: String,
}

impl ObjectEvent {
    /// 새 오브젝트 이벤트를 생성합니다.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket.into(),
            object_key: key.into(),
        }
    }
}

/// 배치 실행기
///
/// 라우팅 테이블과 스트림 캐시를 소유합니다. 캐시는 형식 목록당 한 번
/// 쓰이고(write-once) 이후 재사용되므로, 같은 형식의 파일 N개를 처리해도
/// 체인은 한 번만 빌드됩니다.
pub struct BatchRunner<'a> {
    store: &'a dyn ObjectStore,
    routes: RouteTable,
    cache: HashMap<Vec<String>, Stream>,
}

impl<'a> BatchRunner<'a> {
    /// 스토어와 라우팅 테이블로 새 실행기를 생성합니다.
    pub fn new(store: &'a dyn ObjectStore, routes: RouteTable) -> Self {
        Self {
            store,
            routes,
            cache: HashMap::new(),
        }
    }

    /// 캐시에 빌드된 스트림 수를 반환합니다.
    pub fn cached_streams(&self) -> usize {
        self.cache.len()
    }

    /// 이벤트 목록을 핸들러로 처리하고 핸들러 결과를 반환합니다.
    pub fn run(
        &mut self,
        events: &[ObjectEvent],
        handler: &mut dyn Handler,
        args: &Value,
    ) -> Result<Value, SluiceError> {
        handler.setup(args)?;

        for event in events {
            self.process(event, handler)?;
        }

        let result = handler.result()?;
        info!(handler = handler.name(), result = %result, "batch completed");
        Ok(result)
    }

    /// 이벤트 하나를 라우팅하고 파이프라인에 흘립니다.
    fn process(
        &mut self,
        event: &ObjectEvent,
        handler: &mut dyn Handler,
    ) -> Result<(), SluiceError> {
        let formats = self
            .routes
            .resolve(&event.bucket_name, &event.object_key)?
            .format
            .clone();

        if !self.cache.contains_key(&formats) {
            let stream = Stream::build(&formats)?;
            self.cache.insert(formats.clone(), stream);
        }
        let stream = &self.cache[&formats];

        info!(
            bucket = %event.bucket_name,
            key = %event.object_key,
            formats = ?formats,
            "processing object",
        );

        let mut sink = HandlerSink::new(handler);
        stream.read(
            self.store,
            &event.bucket_name,
            &event.object_key,
            &mut sink,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FsObjectStore;
    use crate::handler::CountHandler;

    use std::fs;

    use sluice_core::config::{BucketRoutes, RouteRule};
    use sluice_core::error::ConfigError;

    fn routes(bucket: &str, rules: &[(&str, &[&str])]) -> RouteTable {
        RouteTable::from_config(&[BucketRoutes {
            bucket: bucket.to_owned(),
            rules: rules
                .iter()
                .map(|(prefix, format)| RouteRule {
                    prefix: (*prefix).to_owned(),
                    format: format.iter().map(|s| (*s).to_owned()).collect(),
                })
                .collect(),
        }])
    }

    fn write_object(root: &std::path::Path, bucket: &str, key: &str, data: &[u8]) {
        let path = root.join(bucket).join(key);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, data).expect("write object");
    }

    #[test]
    fn run_processes_batch_and_reuses_stream() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_object(dir.path(), "logs", "json/a.log", b"{\"n\": 1}\n{\"n\": 2}\n");
        write_object(dir.path(), "logs", "json/b.log", b"{\"n\": 3}\n");
        let store = FsObjectStore::new(dir.path());

        let mut runner = BatchRunner::new(
            &store,
            routes("logs", &[("json/", &["s3-lines", "json"])]),
        );
        let mut handler = CountHandler::new();

        let events = [
            ObjectEvent::new("logs", "json/a.log"),
            ObjectEvent::new("logs", "json/b.log"),
        ];
        let result = runner
            .run(&events, &mut handler, &serde_json::Value::Null)
            .unwrap();

        assert_eq!(result["total"], serde_json::json!(3));
        // 형식 목록이 같으므로 스트림은 한 번만 빌드된다
        assert_eq!(runner.cached_streams(), 1);
    }

    #[test]
    fn unroutable_event_aborts_batch() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsObjectStore::new(dir.path());

        let mut runner = BatchRunner::new(
            &store,
            routes("logs", &[("json/", &["s3-lines", "json"])]),
        );
        let mut handler = CountHandler::new();

        let events = [ObjectEvent::new("logs", "elsewhere/a.log")];
        let result = runner.run(&events, &mut handler, &serde_json::Value::Null);
        assert!(matches!(
            result,
            Err(SluiceError::Config(ConfigError::NoRouteMatch { .. }))
        ));
    }

    #[test]
    fn earlier_records_stand_after_midfile_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_object(
            dir.path(),
            "logs",
            "json/partial.log",
            b"{\"ok\": 1}\nnot json at all\n",
        );
        let store = FsObjectStore::new(dir.path());

        let mut runner = BatchRunner::new(
            &store,
            routes("logs", &[("json/", &["s3-lines", "json"])]),
        );
        let mut handler = CountHandler::new();

        let events = [ObjectEvent::new("logs", "json/partial.log")];
        let run_result = runner.run(&events, &mut handler, &serde_json::Value::Null);
        assert!(run_result.is_err());

        // 에러 이전에 전달된 레코드는 남아 있다
        let partial = handler.result().unwrap();
        assert_eq!(partial["total"], serde_json::json!(1));
    }

    #[test]
    fn object_events_deserialize_ignoring_extras() {
        let json = r#"{
            "aws_region": "ap-northeast-1",
            "event_name": "ObjectCreated:Put",
            "bucket_name": "logs",
            "object_key": "json/a.log",
            "object_size": 1234
        }"#;
        let event: ObjectEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.bucket_name, "logs");
        assert_eq!(event.object_key, "json/a.log");
    }
}
