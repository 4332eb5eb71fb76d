//! 오브젝트 취득 모듈 -- 다운로드와 레코드 분해
//!
//! 모든 Fetcher는 [`ObjectStore`]를 통해 오브젝트를 임시 파일로 내려받고,
//! 키가 `.gz`로 끝나면 투명하게 압축을 해제합니다. 임시 파일은 성공/실패
//! 경로 모두에서 해제됩니다 (`NamedTempFile`의 drop).
//!
//! # 취득 모드
//! - [`LineFetcher`] (`s3-lines`): 라인당 레코드 하나. UTF-8 디코딩에
//!   실패한 라인은 경고 후 건너뛰고 나머지를 계속 처리합니다.
//! - [`TextFetcher`] (`s3-text`): 본문 전체를 레코드 하나로 방출합니다.
//! - [`IgnoreFetcher`] (`ignore`): 아무것도 방출하지 않습니다. 라우팅
//!   규칙으로 매칭된 오브젝트(디렉토리 마커, 매니페스트 등)를 의도적으로
//!   버릴 때 사용합니다.

pub mod store;

pub use store::FsObjectStore;

use std::io::{BufRead, BufReader, Read};

use flate2::read::GzDecoder;
use metrics::counter;
use tracing::{debug, warn};

use sluice_core::error::{FetchError, SluiceError};
use sluice_core::metadata::{Metadata, message_record};
use sluice_core::metrics::{FETCH_BYTES_TOTAL, FETCH_LINES_SKIPPED_TOTAL, FETCH_LINES_TOTAL};
use sluice_core::stage::{Fetcher, ObjectStore, Sink};

/// 오브젝트를 임시 파일로 내려받습니다.
fn download_object(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<tempfile::NamedTempFile, SluiceError> {
    let fname = key.rsplit('/').next().unwrap_or(key);
    let mut tmp = tempfile::Builder::new()
        .prefix("sluice-")
        .suffix(&format!("-{fname}"))
        .tempfile()?;

    debug!(bucket, key, path = %tmp.path().display(), "downloading object");
    let bytes = store.download(bucket, key, tmp.as_file_mut())?;
    counter!(FETCH_BYTES_TOTAL).increment(bytes);
    debug!(bucket, key, bytes, "download completed");
    Ok(tmp)
}

/// 내려받은 임시 파일의 읽기 핸들을 엽니다. `.gz` 키는 압축 해제를 감쌉니다.
fn open_reader(
    tmp: &tempfile::NamedTempFile,
    key: &str,
) -> Result<Box<dyn Read>, SluiceError> {
    let file = tmp.reopen()?;
    if key.ends_with(".gz") {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// 라인 단위 Fetcher (`s3-lines`)
///
/// 살아남은 각 라인은 새 [`Metadata`]와 함께 `{message: line}` 레코드가
/// 됩니다. 후행 공백(개행 포함)은 제거됩니다.
#[derive(Debug, Default)]
pub struct LineFetcher;

impl LineFetcher {
    /// 새 LineFetcher를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for LineFetcher {
    fn name(&self) -> &'static str {
        "s3-lines"
    }

    fn fetch(
        &self,
        store: &dyn ObjectStore,
        bucket: &str,
        key: &str,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        let tmp = download_object(store, bucket, key)?;
        let mut reader = BufReader::new(open_reader(&tmp, key)?);

        let mut buf = Vec::new();
        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf).map_err(|e| {
                SluiceError::Fetch(FetchError::Decode {
                    key: key.to_owned(),
                    reason: e.to_string(),
                })
            })?;
            if n == 0 {
                break;
            }

            match std::str::from_utf8(&buf) {
                Ok(text) => {
                    counter!(FETCH_LINES_TOTAL).increment(1);
                    out.recv(Metadata::new(), message_record(text.trim_end()))?;
                }
                Err(e) => {
                    // 라인 하나의 디코딩 실패는 파일 전체를 죽이지 않는다
                    warn!(bucket, key, error = %e, "skipping undecodable line");
                    counter!(FETCH_LINES_SKIPPED_TOTAL).increment(1);
                }
            }
        }

        Ok(())
    }
}

/// 전문 Fetcher (`s3-text`)
///
/// 본문 전체를 UTF-8 텍스트로 디코딩해 `{message: full_text}` 레코드
/// 하나를 방출합니다. 디코딩 실패는 파일 전체에 치명적입니다.
#[derive(Debug, Default)]
pub struct TextFetcher;

impl TextFetcher {
    /// 새 TextFetcher를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for TextFetcher {
    fn name(&self) -> &'static str {
        "s3-text"
    }

    fn fetch(
        &self,
        store: &dyn ObjectStore,
        bucket: &str,
        key: &str,
        out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        let tmp = download_object(store, bucket, key)?;
        let mut reader = open_reader(&tmp, key)?;

        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|e| {
            SluiceError::Fetch(FetchError::Decode {
                key: key.to_owned(),
                reason: e.to_string(),
            })
        })?;

        out.recv(Metadata::new(), message_record(text))
    }
}

/// 무시 Fetcher (`ignore`) -- 스토어에 접근하지 않고 아무것도 방출하지 않습니다.
#[derive(Debug, Default)]
pub struct IgnoreFetcher;

impl IgnoreFetcher {
    /// 새 IgnoreFetcher를 생성합니다.
    pub fn new() -> Self {
        Self
    }
}

impl Fetcher for IgnoreFetcher {
    fn name(&self) -> &'static str {
        "ignore"
    }

    fn fetch(
        &self,
        _store: &dyn ObjectStore,
        bucket: &str,
        key: &str,
        _out: &mut dyn Sink,
    ) -> Result<(), SluiceError> {
        debug!(bucket, key, "ignoring object");
        Ok(())
    }
}
