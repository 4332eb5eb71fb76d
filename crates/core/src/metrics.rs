//! 메트릭 상수 등록
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다. 각 모듈은 이 상수를 사용하여
//! `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sluice_`
//! - 모듈명: `fetch_`, `pipeline_`, `route_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(sluice_core::metrics::PIPELINE_RECORDS_EMITTED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 형식 식별자 레이블 키 (syslog, paloalto 등)
pub const LABEL_FORMAT: &str = "format";

/// 버킷명 레이블 키
pub const LABEL_BUCKET: &str = "bucket";

/// 핸들러 이름 레이블 키
pub const LABEL_HANDLER: &str = "handler";

// ─── Fetch 메트릭 ──────────────────────────────────────────────────

/// fetch: 내려받은 바이트 수 (counter)
pub const FETCH_BYTES_TOTAL: &str = "sluice_fetch_bytes_total";

/// fetch: 방출된 라인 수 (counter)
pub const FETCH_LINES_TOTAL: &str = "sluice_fetch_lines_total";

/// fetch: UTF-8 디코딩 실패로 건너뛴 라인 수 (counter)
pub const FETCH_LINES_SKIPPED_TOTAL: &str = "sluice_fetch_lines_skipped_total";

// ─── Pipeline 메트릭 ───────────────────────────────────────────────

/// pipeline: 처리한 파일(오브젝트) 수 (counter)
pub const PIPELINE_FILES_TOTAL: &str = "sluice_pipeline_files_total";

/// pipeline: 싱크로 방출된 정규화 레코드 수 (counter)
pub const PIPELINE_RECORDS_EMITTED_TOTAL: &str = "sluice_pipeline_records_emitted_total";

/// pipeline: 파싱 에러 수 (counter, label: format)
pub const PIPELINE_PARSE_ERRORS_TOTAL: &str = "sluice_pipeline_parse_errors_total";

// ─── Handler 메트릭 ────────────────────────────────────────────────

/// handler: 핸들러에 전달된 레코드 수 (counter, label: handler)
pub const HANDLER_RECORDS_TOTAL: &str = "sluice_handler_records_total";

// ─── Route 메트릭 ──────────────────────────────────────────────────

/// route: 해석된 라우팅 규칙 수 (counter, label: bucket)
pub const ROUTE_RESOLVED_TOTAL: &str = "sluice_route_resolved_total";

/// route: 접두사 길이가 같은 규칙 충돌 수 (counter, label: bucket)
pub const ROUTE_PREFIX_TIE_TOTAL: &str = "sluice_route_prefix_tie_total";
