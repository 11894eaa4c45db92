//! 시세 수집/조회 오류 타입.

use thiserror::Error;

/// 시세 파이프라인 오류.
///
/// 수집 사이클 오류(`Fetch`, `Write`)는 해당 사이클만 실패시키고,
/// 나머지는 호출자(HTTP 계층)에 그대로 전달됩니다.
#[derive(Debug, Error)]
pub enum RateError {
    /// 가격 소스 호출 실패 또는 응답 형식 오류
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// 사이클 배치 커밋 실패 (어떤 행도 기록되지 않음)
    #[error("Write error: {0}")]
    Write(String),

    /// 이미 등록된 심볼
    #[error("Already registered: {0}")]
    Conflict(String),

    /// 심볼 또는 데이터 없음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 잘못된 입력 (분석 기간, 페이지 파라미터 등)
    #[error("Validation error: {0}")]
    Validation(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    Query(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RateError {
    /// 수집 사이클 단위 오류인지 여부 (로그 후 다음 사이클 진행).
    pub fn is_cycle_failure(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Write(_))
    }
}

impl From<sqlx::Error> for RateError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RateError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // PostgreSQL 고유 제약 조건 위반
                    RateError::Conflict(db_err.message().to_string())
                } else {
                    RateError::Query(db_err.message().to_string())
                }
            }
            _ => RateError::Query(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for RateError {
    fn from(err: reqwest::Error) -> Self {
        RateError::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for RateError {
    fn from(err: serde_json::Error) -> Self {
        RateError::Fetch(format!("malformed payload: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, RateError>;
