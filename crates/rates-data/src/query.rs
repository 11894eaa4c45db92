//! 시세 조회.
//!
//! - [`analyze_window`]: TrackedLog 구간 조회 (기간 변환은 호출자 책임)
//! - [`latest_quotes`]: FullLog 심볼별 최근 N개 조회

use tracing::debug;

use crate::error::{RateError, Result};
use crate::model::{Quote, TimeWindow};
use crate::store::QuoteLog;

/// TrackedLog에서 구간 안의 행 조회.
///
/// 구간에 행이 없으면 빈 목록을 반환합니다 (오류 아님).
/// 반환 순서는 저장소 기록 순서이며 정렬을 보장하지 않습니다.
pub async fn analyze_window<L: QuoteLog + ?Sized>(
    log: &L,
    window: TimeWindow,
) -> Result<Vec<Quote>> {
    let rows = log.window(window).await?;

    debug!(
        start = %window.start(),
        end = %window.end(),
        count = rows.len(),
        "구간 조회"
    );
    Ok(rows)
}

/// FullLog에서 심볼의 최근 `n`개 행을 최신순으로 조회.
///
/// # Errors
///
/// - `RateError::Validation`: `n < 1`
/// - `RateError::NotFound`: 심볼의 FullLog 행이 하나도 없음
///
/// 행이 `n`개보다 적으면 있는 만큼만 반환합니다.
pub async fn latest_quotes<L: QuoteLog + ?Sized>(
    log: &L,
    symbol: &str,
    n: i64,
) -> Result<Vec<Quote>> {
    if n < 1 {
        return Err(RateError::Validation(format!(
            "periods must be at least 1 (got {})",
            n
        )));
    }

    let rows = log.latest(symbol, n).await?;
    if rows.is_empty() {
        return Err(RateError::NotFound(symbol.to_string()));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuoteInput;
    use crate::store::MemoryRateStore;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    async fn seeded_tracked() -> MemoryRateStore {
        let store = MemoryRateStore::new();
        store
            .seed_tracked([
                QuoteInput::new("BTCUSD", 1.0).at(base()),
                QuoteInput::new("BTCUSD", 2.0).at(base() + Duration::minutes(10)),
                QuoteInput::new("ETHUSD", 3.0).at(base() + Duration::minutes(20)),
            ])
            .await;
        store
    }

    #[tokio::test]
    async fn test_window_inclusive_bounds() {
        let store = seeded_tracked().await;
        let window = TimeWindow::new(base(), base() + Duration::minutes(20)).unwrap();

        let rows = analyze_window(&store, window).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn test_point_window() {
        let store = seeded_tracked().await;
        let at = base() + Duration::minutes(10);
        let window = TimeWindow::new(at, at).unwrap();

        let rows = analyze_window(&store, window).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].timestamp, at);
    }

    #[tokio::test]
    async fn test_empty_window_is_not_an_error() {
        let store = seeded_tracked().await;
        let start = base() + Duration::days(1);
        let window = TimeWindow::new(start, start + Duration::hours(1)).unwrap();

        assert!(analyze_window(&store, window).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_returns_fewer_rows_than_requested() {
        let store = MemoryRateStore::new();
        store
            .seed_full((0..3).map(|i| {
                QuoteInput::new("BTCUSD", 100.0 + i as f64).at(base() + Duration::minutes(i))
            }))
            .await;

        let rows = latest_quotes(&store, "BTCUSD", 5).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        assert_eq!(rows[0].price, 102.0);
    }

    #[tokio::test]
    async fn test_latest_unknown_symbol() {
        let store = MemoryRateStore::new();
        store
            .seed_full([QuoteInput::new("BTCUSD", 1.0).at(base())])
            .await;

        let err = latest_quotes(&store, "UNKNOWN", 5).await.unwrap_err();
        assert!(matches!(err, RateError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_latest_rejects_non_positive_n() {
        let store = MemoryRateStore::new();
        let err = latest_quotes(&store, "BTCUSD", 0).await.unwrap_err();
        assert!(matches!(err, RateError::Validation(_)));
    }
}
