//! 설정 관리 — sluice.toml 파싱 및 런타임 설정
//!
//! [`SluiceConfig`]는 라우팅 테이블과 일반 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SLUICE_GENERAL_LOG_LEVEL=debug` 형식)
//! 3. 설정 파일 (`sluice.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 설정 파일 형식
//! ```toml
//! [general]
//! log_level = "info"
//! log_format = "pretty"
//!
//! [[routing]]
//! bucket = "security-logs"
//!
//!   [[routing.rules]]
//!   prefix = "syslog/"
//!   format = ["s3-lines", "syslog"]
//!
//!   [[routing.rules]]
//!   prefix = "cloudtrail/"
//!   format = ["s3-text", "cloudtrail"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SluiceError};

/// sluice 통합 설정
///
/// `sluice.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SluiceConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 버킷별 라우팅 규칙
    #[serde(default)]
    pub routing: Vec<BucketRoutes>,
    /// 기본 핸들러 설정
    #[serde(default)]
    pub handler: HandlerConfig,
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 출력 형식 ("json" 또는 "pretty")
    pub log_format: String,
    /// 로컬 오브젝트 스토어 루트 디렉토리
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            data_dir: "./data".to_owned(),
        }
    }
}

/// 한 버킷의 라우팅 규칙 목록
///
/// 규칙은 설정 파일에 적힌 순서를 유지합니다. 해석 시 키 접두사가 가장 긴
/// 규칙이 선택되며, 길이가 같으면 먼저 적힌 규칙이 이깁니다 (경고 로그 후).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketRoutes {
    /// 버킷명 (정확히 일치)
    pub bucket: String,
    /// 접두사 → 파이프라인 정의 규칙 목록
    #[serde(default)]
    pub rules: Vec<RouteRule>,
}

/// 라우팅 규칙 하나 -- 키 접두사와 파이프라인 정의의 쌍
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRule {
    /// 오브젝트 키 접두사 (빈 문자열이면 버킷 전체 매칭)
    #[serde(default)]
    pub prefix: String,
    /// 형식 식별자 목록 (첫 항목은 Fetcher여야 함)
    pub format: Vec<String>,
}

/// 기본 핸들러 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandlerConfig {
    /// 핸들러 이름 (핸들러 레지스트리에서 해석)
    pub name: String,
    /// 핸들러 `setup()`에 전달되는 인자
    ///
    /// TOML에는 null이 없으므로 미설정(`Null`) 시 직렬화에서 생략됩니다.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub args: serde_json::Value,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            name: "count".to_owned(),
            args: serde_json::Value::Null,
        }
    }
}

impl SluiceConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    ///
    /// 설정 로딩 순서:
    /// 1. TOML 파일 파싱
    /// 2. 환경변수 오버라이드 적용
    /// 3. 유효성 검증
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SluiceError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SluiceError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SluiceError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SluiceError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SluiceError> {
        toml::from_str(toml_str).map_err(|e| {
            SluiceError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SLUICE_{SECTION}_{FIELD}`
    /// 예: `SLUICE_GENERAL_LOG_LEVEL=debug`
    pub fn apply_env_overrides(&mut self) {
        override_string(&mut self.general.log_level, "SLUICE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SLUICE_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "SLUICE_GENERAL_DATA_DIR");
        override_string(&mut self.handler.name, "SLUICE_HANDLER_NAME");
    }

    /// 설정값의 유효성을 검증합니다.
    ///
    /// 라우팅 규칙의 형식 목록이 비어 있지 않은지까지만 확인합니다.
    /// 식별자가 레지스트리에 존재하는지는 파이프라인 빌드 시점에 검사됩니다.
    pub fn validate(&self) -> Result<(), SluiceError> {
        match self.general.log_format.as_str() {
            "json" | "pretty" => {}
            other => {
                return Err(SluiceError::Config(ConfigError::InvalidValue {
                    field: "general.log_format".to_owned(),
                    reason: format!("unknown format '{other}', expected 'json' or 'pretty'"),
                }));
            }
        }

        for routes in &self.routing {
            if routes.bucket.is_empty() {
                return Err(SluiceError::Config(ConfigError::InvalidValue {
                    field: "routing.bucket".to_owned(),
                    reason: "bucket name must not be empty".to_owned(),
                }));
            }
            for rule in &routes.rules {
                if rule.format.is_empty() {
                    return Err(SluiceError::Config(ConfigError::InvalidValue {
                        field: "routing.rules.format".to_owned(),
                        reason: format!(
                            "format list for {}/{} must not be empty",
                            routes.bucket, rule.prefix
                        ),
                    }));
                }
            }
        }

        if self.handler.name.is_empty() {
            return Err(SluiceError::Config(ConfigError::InvalidValue {
                field: "handler.name".to_owned(),
                reason: "handler name must not be empty".to_owned(),
            }));
        }

        Ok(())
    }
}

/// 환경변수가 설정되어 있으면 문자열 값을 교체합니다.
fn override_string(target: &mut String, env_key: &str) {
    if let Ok(value) = std::env::var(env_key) {
        if !value.is_empty() {
            *target = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const SAMPLE: &str = r#"
[general]
log_level = "debug"

[[routing]]
bucket = "security-logs"

  [[routing.rules]]
  prefix = "syslog/"
  format = ["s3-lines", "syslog"]

  [[routing.rules]]
  prefix = "cloudtrail/"
  format = ["s3-text", "cloudtrail"]

[handler]
name = "jsonl"
"#;

    #[test]
    fn default_config_is_valid() {
        SluiceConfig::default().validate().unwrap();
    }

    #[test]
    fn parse_sample_config() {
        let config = SluiceConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // 명시하지 않은 필드는 기본값
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.routing.len(), 1);
        assert_eq!(config.routing[0].bucket, "security-logs");
        assert_eq!(config.routing[0].rules[1].format, vec!["s3-text", "cloudtrail"]);
        assert_eq!(config.handler.name, "jsonl");
    }

    #[test]
    fn parse_rejects_bad_toml() {
        let result = SluiceConfig::parse("[general\nlog_level = ");
        assert!(matches!(
            result,
            Err(SluiceError::Config(ConfigError::ParseFailed { .. }))
        ));
    }

    #[test]
    fn validate_rejects_empty_format_list() {
        let mut config = SluiceConfig::parse(SAMPLE).unwrap();
        config.routing[0].rules[0].format.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_log_format() {
        let mut config = SluiceConfig::default();
        config.general.log_format = "xml".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn env_override_replaces_log_level() {
        let mut config = SluiceConfig::default();
        unsafe {
            std::env::set_var("SLUICE_GENERAL_LOG_LEVEL", "trace");
        }
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("SLUICE_GENERAL_LOG_LEVEL");
        }
        assert_eq!(config.general.log_level, "trace");
    }

    #[test]
    #[serial]
    fn env_override_ignores_empty_value() {
        let mut config = SluiceConfig::default();
        unsafe {
            std::env::set_var("SLUICE_GENERAL_LOG_LEVEL", "");
        }
        config.apply_env_overrides();
        unsafe {
            std::env::remove_var("SLUICE_GENERAL_LOG_LEVEL");
        }
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn from_file_missing_path_is_config_error() {
        let result = SluiceConfig::from_file("/no/such/sluice.toml");
        assert!(matches!(
            result,
            Err(SluiceError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn handler_args_accept_toml_table() {
        let config = SluiceConfig::parse(
            "[handler]\nname = \"count\"\n[handler.args]\nlimit = 10\nlabel = \"x\"\n",
        )
        .unwrap();
        assert_eq!(config.handler.args["limit"], serde_json::json!(10));
        assert_eq!(config.handler.args["label"], serde_json::json!("x"));
    }
}
