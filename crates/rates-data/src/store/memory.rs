//! 인메모리 저장소 (테스트용).
//!
//! 하나의 `RwLock` 아래에서 배치를 적용하므로 커밋은 원자적으로 보입니다.
//! `fail_commits(true)`로 저장소 장애를 흉내낼 수 있습니다.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RateError, Result};
use crate::model::{Quote, TimeWindow, TrackedSet, TrackedSymbol};
use crate::store::{check_page, QuoteLog, RateStore, SymbolRegistry};
use crate::writer::{CommitSummary, CycleBatch};

#[derive(Default)]
struct Tables {
    /// 등록 순서 유지
    currencies: Vec<String>,
    full_log: Vec<Quote>,
    tracked_log: Vec<Quote>,
}

/// 인메모리 시세 저장소.
#[derive(Default)]
pub struct MemoryRateStore {
    tables: RwLock<Tables>,
    fail_commits: AtomicBool,
    unavailable: AtomicBool,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이후 커밋을 모두 실패시킬지 설정.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// 헬스 체크 실패 여부 설정.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// FullLog 전체 (기록 순서).
    pub async fn full_log(&self) -> Vec<Quote> {
        self.tables.read().await.full_log.clone()
    }

    /// TrackedLog 전체 (기록 순서).
    pub async fn tracked_log(&self) -> Vec<Quote> {
        self.tables.read().await.tracked_log.clone()
    }

    /// TrackedLog에 행을 직접 추가 (과거 데이터 준비용).
    pub async fn seed_tracked(&self, rows: impl IntoIterator<Item = Quote>) {
        self.tables.write().await.tracked_log.extend(rows);
    }

    /// FullLog에 행을 직접 추가 (과거 데이터 준비용).
    pub async fn seed_full(&self, rows: impl IntoIterator<Item = Quote>) {
        self.tables.write().await.full_log.extend(rows);
    }
}

#[async_trait]
impl SymbolRegistry for MemoryRateStore {
    async fn register(&self, symbol: &str) -> Result<TrackedSymbol> {
        let mut tables = self.tables.write().await;
        if tables.currencies.iter().any(|s| s == symbol) {
            return Err(RateError::Conflict(symbol.to_string()));
        }
        tables.currencies.push(symbol.to_string());
        Ok(TrackedSymbol::new(symbol))
    }

    async fn list(&self, skip: i64, limit: i64) -> Result<Vec<TrackedSymbol>> {
        check_page(skip, limit)?;

        let tables = self.tables.read().await;
        Ok(tables
            .currencies
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(TrackedSymbol::new)
            .collect())
    }

    async fn deregister(&self, symbol: &str) -> Result<TrackedSymbol> {
        let mut tables = self.tables.write().await;
        let position = tables
            .currencies
            .iter()
            .position(|s| s == symbol)
            .ok_or_else(|| RateError::NotFound(symbol.to_string()))?;

        Ok(TrackedSymbol::new(tables.currencies.remove(position)))
    }

    async fn snapshot(&self) -> Result<TrackedSet> {
        let tables = self.tables.read().await;
        Ok(tables.currencies.iter().cloned().collect())
    }
}

#[async_trait]
impl QuoteLog for MemoryRateStore {
    async fn commit(&self, batch: &CycleBatch) -> Result<CommitSummary> {
        if self.fail_commits.load(Ordering::SeqCst) {
            return Err(RateError::Write("storage unavailable".to_string()));
        }

        let mut tables = self.tables.write().await;
        tables.full_log.extend_from_slice(batch.full_rows());
        tables.tracked_log.extend_from_slice(batch.tracked_rows());

        Ok(batch.summary())
    }

    async fn window(&self, window: TimeWindow) -> Result<Vec<Quote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tracked_log
            .iter()
            .filter(|q| window.contains(q.timestamp))
            .cloned()
            .collect())
    }

    async fn latest(&self, symbol: &str, limit: i64) -> Result<Vec<Quote>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Quote> = tables
            .full_log
            .iter()
            .filter(|q| q.symbol == symbol)
            .cloned()
            .collect();

        // 같은 시각이면 나중에 기록된 행이 먼저
        rows.reverse();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn full_log_count(&self) -> Result<i64> {
        Ok(self.tables.read().await.full_log.len() as i64)
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn health_check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RateError::Query("storage unavailable".to_string()));
        }
        Ok(())
    }
}
