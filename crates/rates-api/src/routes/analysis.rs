//! 기간별 추적 시세 조회 API.
//!
//! `GET /analysis/{period}`: 현재 시각 기준 `[now - 기간, now]` 구간의 TrackedLog 행.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use rates_data::{analyze_window, AnalysisPeriod, Quote};
use std::sync::Arc;
use tracing::debug;

use crate::error::{into_api_error, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// GET /analysis/{period} - 기간 내 추적 심볼 시세
#[utoipa::path(
    get,
    path = "/analysis/{period}",
    tag = "analysis",
    params(
        ("period" = String, Path, description = "hourly | 4hourly | daily | weekly | yearly")
    ),
    responses(
        (status = 200, description = "구간 내 시세 (없으면 빈 목록)", body = Vec<Quote>),
        (status = 400, description = "알 수 없는 기간", body = ApiErrorResponse)
    )
)]
pub async fn analyze_period(
    State(state): State<Arc<AppState>>,
    Path(period): Path<String>,
) -> ApiResult<Json<Vec<Quote>>> {
    let period: AnalysisPeriod = period.parse().map_err(into_api_error)?;
    let window = period.window_ending_at(Utc::now());

    debug!(period = %period, start = %window.start(), end = %window.end(), "기간 조회");

    let rows = analyze_window(&*state.store, window)
        .await
        .map_err(into_api_error)?;

    Ok(Json(rows))
}

/// 분석 라우터 생성 (`/analysis`에 nest).
pub fn analysis_router() -> Router<Arc<AppState>> {
    Router::new().route("/{period}", get(analyze_period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state_with;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::Duration;
    use rates_data::{MemoryRateStore, QuoteInput};
    use tower::ServiceExt;

    async fn get_analysis(store: Arc<MemoryRateStore>, period: &str) -> (StatusCode, Vec<u8>) {
        let app = Router::new()
            .nest("/analysis", analysis_router())
            .with_state(Arc::new(create_test_state_with(store)));

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/analysis/{}", period))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_weekly_window_bounds() {
        let store = Arc::new(MemoryRateStore::new());
        let now = Utc::now();
        store
            .seed_tracked([
                QuoteInput::new("BTCUSD", 1.0).at(now - Duration::days(8)),
                QuoteInput::new("BTCUSD", 2.0).at(now - Duration::days(1)),
            ])
            .await;

        let (status, body) = get_analysis(store, "weekly").await;
        assert_eq!(status, StatusCode::OK);

        let rows: Vec<Quote> = serde_json::from_slice(&body).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, 2.0);
    }

    #[tokio::test]
    async fn test_four_hourly_period_name() {
        let store = Arc::new(MemoryRateStore::new());
        store
            .seed_tracked([QuoteInput::new("ETHUSD", 3.0).at(Utc::now() - Duration::hours(2))])
            .await;

        let (status, body) = get_analysis(store, "4hourly").await;
        assert_eq!(status, StatusCode::OK);
        let rows: Vec<Quote> = serde_json::from_slice(&body).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_window_returns_empty_list() {
        let (status, body) = get_analysis(Arc::new(MemoryRateStore::new()), "hourly").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"[]");
    }

    #[tokio::test]
    async fn test_unknown_period_is_bad_request() {
        let (status, body) = get_analysis(Arc::new(MemoryRateStore::new()), "monthly").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let error: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "INVALID_INPUT");
    }
}
