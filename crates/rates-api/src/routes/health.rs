//! 헬스 체크 endpoint.
//!
//! 로드밸런서나 오케스트레이션 시스템(Kubernetes 등)에서 사용됩니다.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;
use crate::tasks::CollectorStatus;

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy" | "degraded" | "unhealthy")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 개별 컴포넌트 상태
    pub components: ComponentHealth,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    /// 데이터베이스 연결 상태
    pub database: ComponentStatus,

    /// 시세 수집기 상태
    pub collector: ComponentStatus,

    /// 수집기 최근 사이클 상세
    pub collector_detail: CollectorStatus,
}

/// 컴포넌트 상태.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    /// 상태 ("up" | "down" | "pending")
    pub status: String,

    /// 추가 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    pub fn up() -> Self {
        Self {
            status: "up".to_string(),
            message: None,
        }
    }

    pub fn down(message: impl Into<String>) -> Self {
        Self {
            status: "down".to_string(),
            message: Some(message.into()),
        }
    }

    pub fn up_with_info(message: impl Into<String>) -> Self {
        Self {
            status: "up".to_string(),
            message: Some(message.into()),
        }
    }

    /// 아직 첫 사이클이 실행되지 않음.
    pub fn pending() -> Self {
        Self {
            status: "pending".to_string(),
            message: None,
        }
    }
}

/// 간단한 헬스 체크 (liveness probe용).
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "서버 응답 가능")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 데이터베이스 연결 실패 시 503을 반환합니다.
/// 수집 사이클 실패는 `degraded`로만 표시합니다 (다음 주기에 복구 가능).
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "정상 또는 일부 저하", body = HealthResponse),
        (status = 503, description = "데이터베이스 연결 실패", body = HealthResponse)
    )
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut overall_status = "healthy";
    let mut status_code = StatusCode::OK;

    let database_status = if state.is_store_healthy().await {
        ComponentStatus::up()
    } else {
        overall_status = "unhealthy";
        status_code = StatusCode::SERVICE_UNAVAILABLE;
        ComponentStatus::down("연결 실패")
    };

    let collector = state.collector_status.read().await.clone();
    let collector_status = match (&collector.last_error, collector.cycles_run) {
        (Some(error), _) => {
            if overall_status == "healthy" {
                overall_status = "degraded";
            }
            ComponentStatus::down(error.clone())
        }
        (None, 0) => ComponentStatus::pending(),
        (None, run) => ComponentStatus::up_with_info(format!(
            "{} cycles run, {} failed",
            run, collector.cycles_failed
        )),
    };

    let response = HealthResponse {
        status: overall_status.to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        components: ComponentHealth {
            database: database_status,
            collector: collector_status,
            collector_detail: collector,
        },
    };

    (status_code, Json(response))
}

/// 헬스 체크 라우터 생성 (`/health`에 nest).
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state_with;
    use axum::{body::Body, http::Request};
    use rates_data::MemoryRateStore;
    use tower::ServiceExt;

    async fn ready(store: Arc<MemoryRateStore>) -> (StatusCode, serde_json::Value) {
        let app = Router::new()
            .nest("/health", health_router())
            .with_state(Arc::new(create_test_state_with(store)));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_returns_ok() {
        let app = Router::new().route("/health", get(health_check));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready_before_first_cycle() {
        let (status, health) = ready(Arc::new(MemoryRateStore::new())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["components"]["database"]["status"], "up");
        assert_eq!(health["components"]["collector"]["status"], "pending");
        assert_eq!(health["components"]["collector_detail"]["state"], "idle");
    }

    #[tokio::test]
    async fn test_health_ready_store_down() {
        let store = Arc::new(MemoryRateStore::new());
        store.set_unavailable(true);

        let (status, health) = ready(store).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(health["status"], "unhealthy");
        assert_eq!(health["components"]["database"]["status"], "down");
    }

    #[test]
    fn test_component_status_variants() {
        let up = ComponentStatus::up();
        assert_eq!(up.status, "up");
        assert!(up.message.is_none());

        let down = ComponentStatus::down("error");
        assert_eq!(down.status, "down");
        assert_eq!(down.message, Some("error".to_string()));

        assert_eq!(ComponentStatus::pending().status, "pending");
    }
}
