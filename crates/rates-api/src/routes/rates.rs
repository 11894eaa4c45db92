//! FullLog 조회 API.
//!
//! - `GET /rates/{symbol}?periods=N` - 심볼의 최근 N개 시세 (최신순)
//! - `GET /currency_rate_all/count` - FullLog 전체 행 수

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use rates_data::{latest_quotes, Quote, QuoteLog};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::error::{into_api_error, ApiErrorResponse, ApiQuery, ApiResult};
use crate::state::AppState;

/// 최근 시세 조회 쿼리
#[derive(Debug, Deserialize, IntoParams)]
pub struct LatestRatesQuery {
    /// 조회할 행 수 (1 이상)
    pub periods: i64,
}

/// GET /rates/{symbol} - 최근 N개 시세
#[utoipa::path(
    get,
    path = "/rates/{symbol}",
    tag = "rates",
    params(
        ("symbol" = String, Path, description = "심볼 (예: BTCUSD)"),
        LatestRatesQuery
    ),
    responses(
        (status = 200, description = "최신순 시세 (최대 N개)", body = Vec<Quote>),
        (status = 400, description = "periods < 1", body = ApiErrorResponse),
        (status = 404, description = "기록이 없는 심볼", body = ApiErrorResponse)
    )
)]
pub async fn latest_rates(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    ApiQuery(query): ApiQuery<LatestRatesQuery>,
) -> ApiResult<Json<Vec<Quote>>> {
    let rows = latest_quotes(&*state.store, &symbol, query.periods)
        .await
        .map_err(into_api_error)?;

    Ok(Json(rows))
}

/// GET /currency_rate_all/count - FullLog 행 수
#[utoipa::path(
    get,
    path = "/currency_rate_all/count",
    tag = "rates",
    responses(
        (status = 200, description = "FullLog 전체 행 수", body = i64)
    )
)]
pub async fn full_log_count(State(state): State<Arc<AppState>>) -> ApiResult<Json<i64>> {
    let count = state.store.full_log_count().await.map_err(into_api_error)?;
    Ok(Json(count))
}

/// FullLog 조회 라우터 생성 (루트에 merge).
pub fn rates_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rates/{symbol}", get(latest_rates))
        .route("/currency_rate_all/count", get(full_log_count))
}
