//! API 에러 응답 타입.
//!
//! 모든 엔드포인트에서 같은 JSON 에러 형식을 사용합니다.
//! 코어 에러(`RateError`)는 [`into_api_error`]로 HTTP 상태와 함께 변환됩니다.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rates_data::RateError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 통합 API 에러 응답.
///
/// ```json
/// {
///   "code": "ALREADY_REGISTERED",
///   "message": "symbol already registered: BTCUSD",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "DB_ERROR", "INVALID_INPUT", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    pub timestamp: i64,
}

impl ApiErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 400 INVALID_INPUT 응답 생성.
pub fn invalid_input(message: impl Into<String>) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new("INVALID_INPUT", message)),
    )
}

/// 코어 에러를 HTTP 상태와 에러 본문으로 변환.
///
/// | RateError | 상태 | 코드 |
/// |---|---|---|
/// | Conflict | 400 | ALREADY_REGISTERED |
/// | NotFound | 404 | NOT_FOUND |
/// | Validation | 400 | INVALID_INPUT |
/// | Fetch | 502 | FETCH_ERROR |
/// | 그 외 | 500 | DB_ERROR |
pub fn into_api_error(err: RateError) -> (StatusCode, Json<ApiErrorResponse>) {
    let (status, code) = match &err {
        RateError::Conflict(_) => (StatusCode::BAD_REQUEST, "ALREADY_REGISTERED"),
        RateError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RateError::Validation(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        RateError::Fetch(_) => (StatusCode::BAD_GATEWAY, "FETCH_ERROR"),
        RateError::Write(_) | RateError::Query(_) | RateError::Config(_) => {
            tracing::error!(error = %err, "저장소 오류");
            (StatusCode::INTERNAL_SERVER_ERROR, "DB_ERROR")
        }
    };

    (status, Json(ApiErrorResponse::new(code, err.to_string())))
}

// ============================================================================
// 요청 추출기 거부 응답
// ============================================================================

/// 추출기 거부를 [`ApiErrorResponse`] 형식으로 바꾼 응답.
///
/// 상태 코드는 axum 거부의 것을 그대로 사용합니다 (400, 415, 422 등).
#[derive(Debug)]
pub struct ApiRejection {
    status: StatusCode,
    message: String,
}

impl From<JsonRejection> for ApiRejection {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiRejection {
    fn from(rejection: QueryRejection) -> Self {
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiRejection {
    fn into_response(self) -> Response {
        let body = ApiErrorResponse::new("INVALID_INPUT", self.message);
        (self.status, Json(body)).into_response()
    }
}

/// JSON 본문 추출기 (거부 시 [`ApiRejection`]).
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiRejection))]
pub struct ApiJson<T>(pub T);

/// 쿼리 문자열 추출기 (거부 시 [`ApiRejection`]).
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiRejection))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_json_shape() {
        let error = ApiErrorResponse::new("NOT_FOUND", "symbol not found: BTCUSD");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "symbol not found: BTCUSD");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[test]
    fn test_rate_error_status_mapping() {
        let cases = [
            (
                RateError::Conflict("BTCUSD".into()),
                StatusCode::BAD_REQUEST,
                "ALREADY_REGISTERED",
            ),
            (
                RateError::NotFound("BTCUSD".into()),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                RateError::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
            ),
            (
                RateError::Fetch("timeout".into()),
                StatusCode::BAD_GATEWAY,
                "FETCH_ERROR",
            ),
            (
                RateError::Query("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "DB_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let (actual_status, Json(body)) = into_api_error(err);
            assert_eq!(actual_status, status);
            assert_eq!(body.code, code);
        }
    }
}
