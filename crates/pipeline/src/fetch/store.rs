//! 로컬 파일 시스템 오브젝트 스토어
//!
//! 루트 디렉토리 아래에서 버킷을 하위 디렉토리로, 오브젝트 키를 상대
//! 경로로 해석합니다. CLI 실행과 테스트에서 사용하는 기본 구현이며,
//! 실제 스토리지 백엔드는 동일한 [`ObjectStore`] trait 뒤에서 교체됩니다.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use sluice_core::error::{FetchError, SluiceError};
use sluice_core::stage::ObjectStore;

/// 파일 시스템 기반 오브젝트 스토어
///
/// `<root>/<bucket>/<key>` 경로의 파일을 오브젝트로 취급합니다.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// 루트 디렉토리를 지정해 새 스토어를 생성합니다.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 루트 디렉토리 경로를 반환합니다.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// (버킷, 키)를 로컬 경로로 해석합니다. `..` 컴포넌트는 거부합니다.
    fn resolve(&self, bucket: &str, key: &str) -> Result<PathBuf, SluiceError> {
        let relative = Path::new(bucket).join(key);
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(SluiceError::Fetch(FetchError::Download {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
                reason: "path contains parent directory component".to_owned(),
            }));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for FsObjectStore {
    fn download(
        &self,
        bucket: &str,
        key: &str,
        dst: &mut dyn Write,
    ) -> Result<u64, SluiceError> {
        let path = self.resolve(bucket, key)?;
        debug!(bucket, key, path = %path.display(), "opening local object");

        let mut file = std::fs::File::open(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SluiceError::Fetch(FetchError::ObjectMissing {
                    bucket: bucket.to_owned(),
                    key: key.to_owned(),
                })
            } else {
                SluiceError::Fetch(FetchError::Download {
                    bucket: bucket.to_owned(),
                    key: key.to_owned(),
                    reason: e.to_string(),
                })
            }
        })?;

        std::io::copy(&mut file, dst).map_err(|e| {
            SluiceError::Fetch(FetchError::Download {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
                reason: e.to_string(),
            })
        })
    }
}
