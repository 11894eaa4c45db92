//! 시세 수집 및 조회 코어.
//!
//! 이 crate는 다음을 제공합니다:
//! - 가격 소스 조회 및 응답 파싱 ([`source`])
//! - FullLog/TrackedLog 이중 기록 ([`writer`])
//! - 구간 조회 및 최근 N개 조회 ([`query`])
//! - 분석 기간 테이블 ([`period`])
//! - PostgreSQL 저장소와 저장소 trait ([`store`])

pub mod error;
pub mod model;
pub mod period;
pub mod query;
pub mod source;
pub mod store;
pub mod writer;

pub use error::{RateError, Result};
pub use model::{Quote, QuoteInput, TimeWindow, TrackedSet, TrackedSymbol};
pub use period::AnalysisPeriod;
pub use query::{analyze_window, latest_quotes};
pub use source::{parse_payload, HttpQuoteSource, QuoteSource};
pub use store::{PgRateStore, QuoteLog, RateStore, SymbolRegistry};
pub use writer::{capture_timestamp, write_cycle, CommitSummary, CycleBatch};

#[cfg(any(test, feature = "test-utils"))]
pub use store::MemoryRateStore;
