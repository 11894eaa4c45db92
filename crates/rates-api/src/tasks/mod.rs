//! 백그라운드 태스크 모듈.
//!
//! - 시세 수집: 고정 주기로 가격 소스를 조회하여 FullLog/TrackedLog에 기록

pub mod collector;

pub use collector::{
    next_minute_boundary, CollectorStatus, CycleReport, CycleState, RateCollector,
};
