//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! Arc로 래핑되어 Axum의 State extractor를 통해 핸들러에 주입됩니다.

use std::sync::Arc;

use rates_data::RateStore;
use tokio::sync::RwLock;

use crate::tasks::CollectorStatus;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 시세 저장소 (레지스트리 + 두 로그)
    pub store: Arc<dyn RateStore>,

    /// 수집기 최근 사이클 상태 (수집기가 기록, 헬스 체크가 읽음)
    pub collector_status: Arc<RwLock<CollectorStatus>>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(store: Arc<dyn RateStore>) -> Self {
        Self {
            store,
            collector_status: Arc::new(RwLock::new(CollectorStatus::default())),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 수집기와 공유할 상태 핸들을 지정합니다.
    pub fn with_collector_status(mut self, status: Arc<RwLock<CollectorStatus>>) -> Self {
        self.collector_status = status;
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.health_check().await.is_ok()
    }
}

/// 인메모리 저장소 기반 테스트 상태 생성.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    AppState::new(Arc::new(rates_data::MemoryRateStore::new()))
}

/// 주어진 인메모리 저장소를 공유하는 테스트 상태 생성.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with(store: Arc<rates_data::MemoryRateStore>) -> AppState {
    AppState::new(store)
}
