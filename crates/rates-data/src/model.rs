//! 시세 도메인 모델.
//!
//! - [`Quote`]: 저장된 시세 (심볼, 가격, 수집 시각)
//! - [`QuoteInput`]: 가격 소스에서 파싱된 (심볼, 가격) 쌍
//! - [`TrackedSymbol`]: 추적 대상 심볼 레지스트리 항목
//! - [`TrackedSet`]: 사이클 시작 시점의 레지스트리 스냅샷
//! - [`TimeWindow`]: 닫힌 구간 `[start, end]`

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::{RateError, Result};

/// 저장된 시세 레코드.
///
/// FullLog(`currency_rates_all`)와 TrackedLog(`currency_rates`) 모두 같은 형태입니다.
/// 한 번 기록되면 수정/삭제되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Quote {
    /// 심볼 (예: "BTCUSD")
    pub symbol: String,
    /// 가격
    pub price: f64,
    /// 수집 시각 (사이클 단위로 동일)
    pub timestamp: DateTime<Utc>,
}

/// 가격 소스에서 받은 (심볼, 가격) 쌍.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteInput {
    pub symbol: String,
    pub price: f64,
}

impl QuoteInput {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
        }
    }

    /// 수집 시각을 붙여 저장용 레코드로 변환.
    pub fn at(&self, timestamp: DateTime<Utc>) -> Quote {
        Quote {
            symbol: self.symbol.clone(),
            price: self.price,
            timestamp,
        }
    }
}

/// 추적 대상 심볼 (레지스트리 항목).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct TrackedSymbol {
    /// 심볼
    pub symbol: String,
}

impl TrackedSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
        }
    }
}

/// 레지스트리 스냅샷.
///
/// 사이클마다 한 번 생성되어 해당 사이클의 모든 시세에 동일하게 적용됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedSet {
    symbols: HashSet<String>,
}

impl TrackedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TrackedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// 닫힌 시간 구간 `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// 구간 생성.
    ///
    /// # Errors
    /// `start > end`이면 `RateError::Validation`을 반환합니다.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(RateError::Validation(format!(
                "window start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// `end`에서 `span`만큼 거슬러 올라간 구간. 음수 `span`은 0으로 취급합니다.
    pub fn trailing(end: DateTime<Utc>, span: Duration) -> Self {
        let span = span.max(Duration::zero());
        Self {
            start: end - span,
            end,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// 양 끝 포함.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}
