//! OpenAPI 문서화 설정.
//!
//! utoipa로 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui`, JSON 스펙은 `/api-docs/openapi.json`에서 제공됩니다.
//!
//! 새 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use rates_data::{AnalysisPeriod, Quote, TrackedSymbol};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{ComponentHealth, ComponentStatus, HealthResponse, RegisterCurrencyRequest};
use crate::tasks::{CollectorStatus, CycleState};

/// Rates API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rates API",
        description = r#"
# 시세 수집 및 조회 REST API

- **레지스트리**: 추적할 심볼 등록/조회/삭제
- **분석**: 기간별 추적 심볼 시세 (hourly, 4hourly, daily, weekly, yearly)
- **시세**: 심볼별 최근 N개 시세, 전체 기록 수
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8001", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 및 수집기 상태"),
        (name = "currencies", description = "레지스트리 - 추적 심볼 관리"),
        (name = "analysis", description = "분석 - 기간별 추적 시세"),
        (name = "rates", description = "시세 - 전체 기록 조회")
    ),
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,
            CollectorStatus,
            CycleState,

            // ===== Common =====
            ApiErrorResponse,

            // ===== Rates =====
            TrackedSymbol,
            RegisterCurrencyRequest,
            Quote,
            AnalysisPeriod,
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        crate::routes::currencies::register_currency,
        crate::routes::currencies::list_currencies,
        crate::routes::currencies::deregister_currency,

        crate::routes::analysis::analyze_period,

        crate::routes::rates::latest_rates,
        crate::routes::rates::full_log_count,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_paths() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec).unwrap();

        assert!(json.contains("Rates API"));
        assert!(json.contains("/health/ready"));
        assert!(json.contains("/currencies/{symbol}"));
        assert!(json.contains("/analysis/{period}"));
        assert!(json.contains("/rates/{symbol}"));
        assert!(json.contains("/currency_rate_all/count"));
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(json.contains("HealthResponse"));
        assert!(json.contains("ApiErrorResponse"));
        assert!(json.contains("TrackedSymbol"));
        assert!(json.contains("Quote"));
    }

    #[test]
    fn test_swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }
}
