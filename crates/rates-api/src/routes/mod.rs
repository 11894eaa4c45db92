//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/currencies` - 추적 심볼 레지스트리
//! - `/analysis/{period}` - 기간별 추적 시세
//! - `/rates/{symbol}` - 심볼별 최근 시세
//! - `/currency_rate_all/count` - FullLog 행 수

pub mod analysis;
pub mod currencies;
pub mod health;
pub mod rates;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

pub use analysis::analysis_router;
pub use currencies::{currencies_router, ListCurrenciesQuery, RegisterCurrencyRequest};
pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use rates::{rates_router, LatestRatesQuery};

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/currencies", currencies_router())
        .nest("/analysis", analysis_router())
        .merge(rates_router())
}
