//! 분석 기간 정의.
//!
//! `/analysis/{period}` 경로의 기간 문자열을 닫힌 열거형으로 정의하고,
//! 각 기간을 고정 길이(`Duration`)로 매핑합니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RateError, Result};
use crate::model::TimeWindow;

/// 분석 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub enum AnalysisPeriod {
    /// 최근 1시간
    #[serde(rename = "hourly")]
    Hourly,
    /// 최근 4시간
    #[serde(rename = "4hourly")]
    FourHourly,
    /// 최근 1일
    #[serde(rename = "daily")]
    Daily,
    /// 최근 7일
    #[serde(rename = "weekly")]
    Weekly,
    /// 최근 52주
    #[serde(rename = "yearly")]
    Yearly,
}

impl AnalysisPeriod {
    /// 지원하는 모든 기간.
    pub const ALL: [AnalysisPeriod; 5] = [
        Self::Hourly,
        Self::FourHourly,
        Self::Daily,
        Self::Weekly,
        Self::Yearly,
    ];

    /// 경로 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::FourHourly => "4hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Yearly => "yearly",
        }
    }

    /// 기간 길이.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Hourly => Duration::hours(1),
            Self::FourHourly => Duration::hours(4),
            Self::Daily => Duration::days(1),
            Self::Weekly => Duration::weeks(1),
            Self::Yearly => Duration::weeks(52),
        }
    }

    /// `now`에서 끝나는 구간 `[now - duration, now]`.
    pub fn window_ending_at(&self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow::trailing(now, self.duration())
    }
}

impl fmt::Display for AnalysisPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisPeriod {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RateError::Validation(format!("Invalid period specified: {}", s)))
    }
}
