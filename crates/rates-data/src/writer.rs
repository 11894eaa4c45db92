//! 이중 저장소 기록기.
//!
//! 한 사이클의 시세를 FullLog와 TrackedLog에 나누어 기록합니다.
//!
//! - 모든 시세 → FullLog 한 행씩
//! - 레지스트리 스냅샷에 포함된 심볼 → TrackedLog에 같은 행 추가
//! - 사이클의 모든 행은 하나의 타임스탬프를 공유
//! - 전체 배치는 하나의 트랜잭션으로 커밋 (전부 아니면 전무)
//!
//! 스냅샷은 호출자가 미리 만들어 전달합니다. 기록기는 레지스트리를 직접 조회하지 않습니다.

use chrono::{DateTime, SubsecRound, Utc};
use tracing::debug;

use crate::error::{RateError, Result};
use crate::model::{Quote, QuoteInput, TrackedSet};
use crate::store::QuoteLog;

/// 사이클 기준 시각 캡처.
///
/// PostgreSQL `TIMESTAMPTZ` 정밀도(마이크로초)에 맞춰 잘라서,
/// 저장 후 다시 읽은 값과 정확히 일치하도록 합니다.
pub fn capture_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// 한 사이클에 기록할 행 묶음.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleBatch {
    timestamp: DateTime<Utc>,
    full: Vec<Quote>,
    tracked: Vec<Quote>,
}

impl CycleBatch {
    /// 시세 목록과 스냅샷으로 배치 구성.
    pub fn build(quotes: &[QuoteInput], tracked: &TrackedSet, timestamp: DateTime<Utc>) -> Self {
        let full: Vec<Quote> = quotes.iter().map(|q| q.at(timestamp)).collect();
        let tracked = full
            .iter()
            .filter(|q| tracked.contains(&q.symbol))
            .cloned()
            .collect();

        Self {
            timestamp,
            full,
            tracked,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// FullLog에 기록할 행.
    pub fn full_rows(&self) -> &[Quote] {
        &self.full
    }

    /// TrackedLog에 기록할 행.
    pub fn tracked_rows(&self) -> &[Quote] {
        &self.tracked
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }

    /// 커밋 성공 시 보고할 요약.
    pub fn summary(&self) -> CommitSummary {
        CommitSummary {
            timestamp: self.timestamp,
            full_rows: self.full.len(),
            tracked_rows: self.tracked.len(),
        }
    }
}

/// 커밋된 행 수 요약.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    pub timestamp: DateTime<Utc>,
    pub full_rows: usize,
    pub tracked_rows: usize,
}

impl CommitSummary {
    /// 전체 커밋 행 수.
    pub fn total(&self) -> usize {
        self.full_rows + self.tracked_rows
    }
}

/// 사이클 기록.
///
/// # Errors
///
/// 저장소 오류는 모두 `RateError::Write`로 반환되며, 이 경우 어떤 행도 보이지 않습니다.
pub async fn write_cycle<L: QuoteLog + ?Sized>(
    log: &L,
    quotes: &[QuoteInput],
    tracked: &TrackedSet,
    timestamp: DateTime<Utc>,
) -> Result<CommitSummary> {
    let batch = CycleBatch::build(quotes, tracked, timestamp);

    if batch.is_empty() {
        debug!(%timestamp, "기록할 시세 없음");
        return Ok(batch.summary());
    }

    let summary = log.commit(&batch).await.map_err(|e| match e {
        RateError::Write(_) => e,
        other => RateError::Write(other.to_string()),
    })?;

    debug!(
        %timestamp,
        full_rows = summary.full_rows,
        tracked_rows = summary.tracked_rows,
        "사이클 배치 커밋 완료"
    );
    Ok(summary)
}
