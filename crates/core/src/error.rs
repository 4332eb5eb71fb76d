//! 에러 타입 — 도메인별 에러 정의
//!
//! 에러 분류는 세 단계에서 발생합니다: 설정 해석([`ConfigError`], 레코드
//! 처리 시작 전), 오브젝트 취득([`FetchError`], 파일 단위 치명),
//! 형식 파싱([`ParseError`], 해당 파일의 남은 실행 치명 -- 이미 방출된
//! 레코드는 롤백하지 않음). 코어는 내부 재시도를 하지 않으며 모든 치명
//! 에러는 호출자 경계까지 그대로 전파됩니다.

/// sluice 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SluiceError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 오브젝트 취득 에러
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// 형식 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 핸들러 에러
    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러 -- 레코드 처리가 시작되기 전에 발생합니다.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound {
        /// 설정 파일 경로
        path: String,
    },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed {
        /// 파싱 실패 사유
        reason: String,
    },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue {
        /// 설정 필드명
        field: String,
        /// 검증 실패 사유
        reason: String,
    },

    /// 레지스트리에 없는 형식 식별자
    #[error("no such format \"{name}\"")]
    UnknownFormat {
        /// 요청된 형식 식별자
        name: String,
    },

    /// 파이프라인 선두가 Fetcher가 아님
    #[error("first stage \"{name}\" is not a fetcher")]
    NotAFetcher {
        /// 선두에 지정된 형식 식별자
        name: String,
    },

    /// 형식 목록이 비어 있음
    #[error("no stage is configured")]
    EmptyPipeline,

    /// (버킷, 키)에 매칭되는 라우팅 규칙 없음
    #[error("no format config for {bucket}/{key}")]
    NoRouteMatch {
        /// 버킷명
        bucket: String,
        /// 오브젝트 키
        key: String,
    },

    /// 레지스트리에 없는 핸들러 이름
    #[error("no such handler \"{name}\"")]
    UnknownHandler {
        /// 요청된 핸들러 이름
        name: String,
    },
}

/// 오브젝트 취득 에러 -- 파일 전체에 치명적입니다.
///
/// 예외: line 모드에서 UTF-8 디코딩에 실패한 개별 라인은 에러가 아니라
/// 경고 로그 후 건너뜁니다 (파일의 나머지는 계속 처리).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// 오브젝트가 존재하지 않음
    #[error("object not found: {bucket}/{key}")]
    ObjectMissing {
        /// 버킷명
        bucket: String,
        /// 오브젝트 키
        key: String,
    },

    /// 다운로드 실패 (권한, I/O 등)
    #[error("download failed: {bucket}/{key}: {reason}")]
    Download {
        /// 버킷명
        bucket: String,
        /// 오브젝트 키
        key: String,
        /// 실패 사유
        reason: String,
    },

    /// 본문 디코딩 실패 (전체 파일 모드의 UTF-8 오류, gzip 손상 등)
    #[error("decode failed: {key}: {reason}")]
    Decode {
        /// 오브젝트 키
        key: String,
        /// 실패 사유
        reason: String,
    },
}

/// 형식 파싱 에러 -- 해당 파일의 남은 파이프라인 실행에 치명적입니다.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 고정 패턴에 매칭되지 않는 입력
    #[error("{format}: malformed input: \"{input}\"")]
    Malformed {
        /// 파서 형식 식별자
        format: String,
        /// 문제가 된 입력 (라인 또는 필드 값)
        input: String,
    },

    /// 필수 필드 없음
    #[error("{format}: missing field \"{field}\"")]
    MissingField {
        /// 파서 형식 식별자
        format: String,
        /// 없는 필드명
        field: String,
    },

    /// JSON 파싱 실패 또는 기대한 JSON 구조 불일치
    #[error("{format}: invalid json: {reason}")]
    Json {
        /// 파서 형식 식별자
        format: String,
        /// 실패 사유
        reason: String,
    },

    /// 열 개수 불일치
    #[error("{format}: column count mismatch: expected {expected}, actual {actual}")]
    ColumnCount {
        /// 파서 형식 식별자
        format: String,
        /// 기대 열 수
        expected: usize,
        /// 실제 열 수
        actual: usize,
    },

    /// 타입 판별 열의 값이 알려진 하위 형식이 아님
    #[error("{format}: unsupported subtype \"{value}\"")]
    UnknownSubtype {
        /// 파서 형식 식별자
        format: String,
        /// 판별 열의 값
        value: String,
    },

    /// 타임스탬프 텍스트 해석 실패
    #[error("{format}: bad timestamp \"{value}\": {reason}")]
    Timestamp {
        /// 파서 형식 식별자
        format: String,
        /// 문제가 된 타임스탬프 텍스트
        value: String,
        /// 실패 사유
        reason: String,
    },

    /// 디스패치 값이 지원되지 않는 이벤트 종류
    #[error("{format}: unsupported event \"{event}\"")]
    UnsupportedEvent {
        /// 파서 형식 식별자
        format: String,
        /// 디스패치된 이벤트 값
        event: String,
    },
}

/// 핸들러 에러
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// 핸들러 초기화 실패
    #[error("handler \"{name}\" setup failed: {reason}")]
    Setup {
        /// 핸들러 이름
        name: String,
        /// 실패 사유
        reason: String,
    },

    /// 레코드 전달 실패
    #[error("handler \"{name}\" recv failed: {reason}")]
    Deliver {
        /// 핸들러 이름
        name: String,
        /// 실패 사유
        reason: String,
    },
}
