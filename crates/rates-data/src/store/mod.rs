//! 저장소 추상화.
//!
//! - [`SymbolRegistry`]: 추적 심볼 등록/조회/삭제 및 사이클용 스냅샷
//! - [`QuoteLog`]: FullLog/TrackedLog 기록 및 조회
//! - [`RateStore`]: 두 trait를 모두 구현하는 저장소 (AppState에서 공유)
//!
//! 구현체:
//! - [`PgRateStore`]: PostgreSQL (sqlx)
//! - `MemoryRateStore`: 인메모리 (테스트용, `test-utils` feature)

use async_trait::async_trait;

use crate::error::{RateError, Result};
use crate::model::{Quote, TimeWindow, TrackedSet, TrackedSymbol};
use crate::writer::{CommitSummary, CycleBatch};

#[cfg(any(test, feature = "test-utils"))]
mod memory;
mod postgres;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryRateStore;
pub use postgres::PgRateStore;

/// 추적 심볼 레지스트리.
#[async_trait]
pub trait SymbolRegistry: Send + Sync {
    /// 심볼 등록.
    ///
    /// # Errors
    ///
    /// - `RateError::Conflict`: 이미 등록된 심볼
    async fn register(&self, symbol: &str) -> Result<TrackedSymbol>;

    /// 등록 순서대로 `skip`개를 건너뛰고 최대 `limit`개 조회.
    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<TrackedSymbol>>;

    /// 심볼 삭제. 이미 기록된 로그 행은 그대로 남습니다.
    ///
    /// # Errors
    ///
    /// - `RateError::NotFound`: 등록되지 않은 심볼
    async fn deregister(&self, symbol: &str) -> Result<TrackedSymbol>;

    /// 현재 등록된 전체 심볼 스냅샷.
    async fn snapshot(&self) -> Result<TrackedSet>;
}

/// 시세 로그 (FullLog + TrackedLog).
#[async_trait]
pub trait QuoteLog: Send + Sync {
    /// 사이클 배치를 하나의 트랜잭션으로 커밋.
    ///
    /// 실패 시 배치의 어떤 행도 보이지 않아야 합니다.
    async fn commit(&self, batch: &CycleBatch) -> Result<CommitSummary>;

    /// TrackedLog에서 `window.start() <= timestamp <= window.end()`인 행 조회.
    async fn window(&self, window: TimeWindow) -> Result<Vec<Quote>>;

    /// FullLog에서 심볼의 최근 `limit`개 행을 최신순으로 조회.
    async fn latest(&self, symbol: &str, limit: i64) -> Result<Vec<Quote>>;

    /// FullLog 전체 행 수.
    async fn full_log_count(&self) -> Result<i64>;
}

/// 레지스트리 + 시세 로그를 함께 제공하는 저장소.
#[async_trait]
pub trait RateStore: SymbolRegistry + QuoteLog {
    /// 저장소 연결 상태 확인.
    async fn health_check(&self) -> Result<()>;
}

/// 페이지 파라미터 검증.
pub(crate) fn check_page(skip: i64, limit: i64) -> Result<()> {
    if skip < 0 || limit < 0 {
        return Err(RateError::Validation(format!(
            "skip and limit must be non-negative (skip={}, limit={})",
            skip, limit
        )));
    }
    Ok(())
}
