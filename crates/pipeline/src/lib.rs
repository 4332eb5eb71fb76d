#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`fetch`]: 오브젝트 다운로드와 라인/전문 분해 (s3-lines, s3-text, ignore)
//! - [`parser`]: syslog, JSON, 벤더 보안 제품 등 형식별 파서
//! - [`registry`]: 형식 식별자 → 스테이지 팩토리 해석
//! - [`stream`]: 선형 푸시 체인 구성과 실행
//! - [`route`]: 버킷/접두사 라우팅 규칙 해석 (최장 접두사 우선)
//! - [`runner`]: 배치 오케스트레이션 (스트림 캐시 + 핸들러 생명주기)
//! - [`handler`]: 핸들러 브리지와 기본 제공 핸들러
//!
//! # 아키텍처
//!
//! ```text
//! ObjectStore -> Fetcher -> Parser -> ... -> Parser -> Sink -> Handler
//!                  |           |                         |
//!              tempfile+gz   형식별 recv             read()마다 주입
//! ```
//!
//! 실행은 파일 단위로 단일 스레드·동기이며, 레코드 하나가 모든 하위
//! 스테이지를 통과한 뒤에야 Fetcher가 다음 레코드를 생산합니다
//! (엄격한 depth-first 전파, 스테이지 간 버퍼 없음).

pub mod fetch;
pub mod handler;
pub mod parser;
pub mod registry;
pub mod route;
pub mod runner;
pub mod stream;

// --- 주요 타입 re-export ---

// 스트림
pub use stream::Stream;

// 라우팅
pub use route::RouteTable;

// 배치 실행
pub use runner::{BatchRunner, ObjectEvent};

// 레지스트리
pub use registry::{Stage, StageKind, build_stage, known_formats};

// 오브젝트 스토어
pub use fetch::FsObjectStore;

// 핸들러
pub use handler::{CollectSink, CountHandler, HandlerSink, JsonLinesHandler, resolve_handler};
