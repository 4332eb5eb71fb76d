#![doc = include_str!("../README.md")]

pub mod config;
pub mod error;
pub mod metadata;
pub mod metrics;
pub mod stage;

// --- 주요 타입 re-export ---
// 각 모듈의 핵심 타입을 크레이트 루트에서 바로 사용할 수 있도록 합니다.

// 에러
pub use error::{ConfigError, FetchError, HandlerError, ParseError, SluiceError};

// 설정
pub use config::{BucketRoutes, GeneralConfig, HandlerConfig, RouteRule, SluiceConfig};

// 값 타입
pub use metadata::{Metadata, Record};

// 스테이지 trait
pub use stage::{Fetcher, FormatParser, Handler, ObjectStore, Sink};
