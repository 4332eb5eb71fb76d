//! 라우팅 해석 -- (버킷, 키)에 적용할 파이프라인 정의 선택
//!
//! 버킷의 규칙 중 키 접두사가 일치하는 것들로 좁힌 뒤, 접두사가 가장 긴
//! 규칙을 선택합니다. 최장 접두사가 둘 이상이면 동작이 설정 순서에
//! 의존하므로 경고를 남기고 먼저 적힌 규칙을 택합니다. 일치하는 규칙이
//! 없으면 설정 에러입니다.

use std::collections::BTreeMap;

use metrics::counter;
use tracing::{debug, warn};

use sluice_core::config::{BucketRoutes, RouteRule};
use sluice_core::error::{ConfigError, SluiceError};
use sluice_core::metrics::{LABEL_BUCKET, ROUTE_PREFIX_TIE_TOTAL, ROUTE_RESOLVED_TOTAL};

/// 버킷별 라우팅 테이블
///
/// 설정 로드 후 불변이며, 규칙은 설정 파일의 순서를 유지합니다.
#[derive(Debug, Default)]
pub struct RouteTable {
    buckets: BTreeMap<String, Vec<RouteRule>>,
}

impl RouteTable {
    /// 설정의 버킷 라우팅 목록에서 테이블을 구성합니다.
    ///
    /// 같은 버킷이 여러 번 등장하면 규칙 목록을 이어 붙입니다.
    pub fn from_config(routing: &[BucketRoutes]) -> Self {
        let mut buckets: BTreeMap<String, Vec<RouteRule>> = BTreeMap::new();
        for routes in routing {
            buckets
                .entry(routes.bucket.clone())
                .or_default()
                .extend(routes.rules.iter().cloned());
        }
        Self { buckets }
    }

    /// 등록된 버킷 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// 테이블이 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// (버킷, 키)에 적용할 규칙을 해석합니다.
    ///
    /// # Errors
    ///
    /// 버킷이 등록되지 않았거나 접두사가 일치하는 규칙이 하나도 없으면
    /// [`ConfigError::NoRouteMatch`]를 반환합니다.
    pub fn resolve(&self, bucket: &str, key: &str) -> Result<&RouteRule, SluiceError> {
        let no_match = || {
            SluiceError::Config(ConfigError::NoRouteMatch {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            })
        };

        let rules = self.buckets.get(bucket).ok_or_else(no_match)?;
        let matched: Vec<&RouteRule> = rules
            .iter()
            .filter(|rule| key.starts_with(&rule.prefix))
            .collect();

        let best = matched
            .iter()
            .max_by_key(|rule| rule.prefix.len())
            .ok_or_else(no_match)?;

        // max_by_key는 마지막 최댓값을 돌려주므로, 설정 순서 우선을 위해
        // 같은 길이의 첫 규칙을 다시 찾는다
        let ties: Vec<&&RouteRule> = matched
            .iter()
            .filter(|rule| rule.prefix.len() == best.prefix.len())
            .collect();
        if ties.len() > 1 {
            warn!(
                bucket,
                key,
                prefix = %best.prefix,
                count = ties.len(),
                "multiple routing rules share the longest prefix; using first by config order",
            );
            counter!(ROUTE_PREFIX_TIE_TOTAL, LABEL_BUCKET => bucket.to_owned()).increment(1);
        }
        let chosen = *ties[0];

        debug!(bucket, key, prefix = %chosen.prefix, "route resolved");
        counter!(ROUTE_RESOLVED_TOTAL, LABEL_BUCKET => bucket.to_owned()).increment(1);
        Ok(chosen)
    }
}
