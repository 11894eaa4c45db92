//! 추적 심볼 레지스트리 API.
//!
//! # 엔드포인트
//!
//! - `POST /currencies` - 심볼 등록
//! - `GET /currencies?skip&limit` - 심볼 목록 (등록 순서)
//! - `DELETE /currencies/{symbol}` - 심볼 삭제 (기존 로그 행은 유지)

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use rates_data::{SymbolRegistry, TrackedSymbol};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{
    into_api_error, invalid_input, ApiErrorResponse, ApiJson, ApiQuery, ApiResult,
};
use crate::state::AppState;

/// 심볼 등록 요청
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterCurrencyRequest {
    /// 심볼 (예: "BTCUSD")
    #[validate(length(min = 1, max = 32, message = "symbol must be 1-32 characters"))]
    pub symbol: String,
}

/// 목록 조회 쿼리
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListCurrenciesQuery {
    /// 건너뛸 개수 (기본값: 0)
    #[serde(default)]
    pub skip: i64,
    /// 최대 개수 (기본값: 10)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

/// POST /currencies - 심볼 등록
#[utoipa::path(
    post,
    path = "/currencies",
    tag = "currencies",
    request_body = RegisterCurrencyRequest,
    responses(
        (status = 200, description = "등록된 심볼", body = TrackedSymbol),
        (status = 400, description = "이미 등록된 심볼 또는 잘못된 입력", body = ApiErrorResponse)
    )
)]
pub async fn register_currency(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RegisterCurrencyRequest>,
) -> ApiResult<Json<TrackedSymbol>> {
    if let Err(errors) = request.validate() {
        let message = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{}: invalid value", field))
                })
            })
            .collect::<Vec<_>>()
            .join(", ");
        return Err(invalid_input(message));
    }

    let record = state
        .store
        .register(&request.symbol)
        .await
        .map_err(into_api_error)?;

    info!(symbol = %record.symbol, "심볼 등록");
    Ok(Json(record))
}

/// GET /currencies - 심볼 목록
#[utoipa::path(
    get,
    path = "/currencies",
    tag = "currencies",
    params(ListCurrenciesQuery),
    responses(
        (status = 200, description = "등록 순서의 심볼 목록", body = Vec<TrackedSymbol>),
        (status = 400, description = "음수 skip/limit", body = ApiErrorResponse)
    )
)]
pub async fn list_currencies(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ListCurrenciesQuery>,
) -> ApiResult<Json<Vec<TrackedSymbol>>> {
    let records = state
        .store
        .list(query.skip, query.limit)
        .await
        .map_err(into_api_error)?;

    Ok(Json(records))
}

/// DELETE /currencies/{symbol} - 심볼 삭제
#[utoipa::path(
    delete,
    path = "/currencies/{symbol}",
    tag = "currencies",
    params(
        ("symbol" = String, Path, description = "삭제할 심볼")
    ),
    responses(
        (status = 200, description = "삭제된 심볼", body = TrackedSymbol),
        (status = 404, description = "등록되지 않은 심볼", body = ApiErrorResponse)
    )
)]
pub async fn deregister_currency(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<TrackedSymbol>> {
    let record = state
        .store
        .deregister(&symbol)
        .await
        .map_err(into_api_error)?;

    info!(symbol = %record.symbol, "심볼 삭제");
    Ok(Json(record))
}

/// 레지스트리 라우터 생성 (`/currencies`에 nest).
pub fn currencies_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_currencies).post(register_currency))
        .route("/{symbol}", delete(deregister_currency))
}
