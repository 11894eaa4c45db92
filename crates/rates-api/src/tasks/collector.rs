//! 시세 수집 스케줄러.
//!
//! 서버 시작 시 다음 정각 분(minute boundary)에 첫 사이클을 실행하고,
//! 이후 수집 주기마다 고정 간격으로 실행합니다 (fixed-rate).
//!
//! 각 사이클:
//! 1. 사이클 시각 캡처
//! 2. 레지스트리 스냅샷
//! 3. 가격 소스 조회
//! 4. FullLog/TrackedLog 원자적 기록
//!
//! 실패한 사이클은 로그만 남기고 건너뜁니다. 재시도나 백오프는 없으며
//! 다음 사이클은 이전 실패와 무관하게 실행됩니다.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, DurationRound, Utc};
use rates_data::{capture_timestamp, write_cycle, QuoteSource, RateStore, Result};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use utoipa::ToSchema;

use crate::metrics::{record_cycle, record_rows_written};

/// 수집기 실행 상태.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    #[default]
    Idle,
    Running,
}

/// 최근 사이클 상태 (헬스 체크 노출용).
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct CollectorStatus {
    pub state: CycleState,
    /// 마지막 사이클 시작 시각
    pub last_attempt: Option<DateTime<Utc>>,
    /// 마지막 성공 사이클 시각
    pub last_success: Option<DateTime<Utc>>,
    /// 마지막 실패 사유 (성공 시 초기화)
    pub last_error: Option<String>,
    pub cycles_run: u64,
    pub cycles_failed: u64,
}

impl CollectorStatus {
    fn begin(&mut self, timestamp: DateTime<Utc>) {
        self.state = CycleState::Running;
        self.last_attempt = Some(timestamp);
        self.cycles_run += 1;
    }

    fn succeed(&mut self, timestamp: DateTime<Utc>) {
        self.state = CycleState::Idle;
        self.last_success = Some(timestamp);
        self.last_error = None;
    }

    fn fail(&mut self, error: String) {
        self.state = CycleState::Idle;
        self.last_error = Some(error);
        self.cycles_failed += 1;
    }
}

/// 한 사이클 실행 결과.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub timestamp: DateTime<Utc>,
    /// 소스에서 받은 시세 수
    pub fetched: usize,
    pub full_rows: usize,
    pub tracked_rows: usize,
    pub elapsed: Duration,
}

impl CycleReport {
    /// 사이클 요약 로그 출력
    pub fn log_summary(&self) {
        info!(
            timestamp = %self.timestamp,
            fetched = self.fetched,
            full_rows = self.full_rows,
            tracked_rows = self.tracked_rows,
            elapsed = format!("{:.2}s", self.elapsed.as_secs_f64()),
            "시세 수집 사이클 완료"
        );
    }
}

/// 시세 수집기.
///
/// 저장소 핸들, 가격 소스, 수집 주기를 소유합니다. 프로세스 시작 시 한 번 생성합니다.
pub struct RateCollector {
    store: Arc<dyn RateStore>,
    source: Arc<dyn QuoteSource>,
    interval: Duration,
    status: Arc<RwLock<CollectorStatus>>,
}

impl RateCollector {
    pub fn new(
        store: Arc<dyn RateStore>,
        source: Arc<dyn QuoteSource>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            source,
            interval,
            status: Arc::new(RwLock::new(CollectorStatus::default())),
        }
    }

    /// 상태 핸들 공유 (AppState와 같은 핸들 사용).
    pub fn with_status(mut self, status: Arc<RwLock<CollectorStatus>>) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> Arc<RwLock<CollectorStatus>> {
        Arc::clone(&self.status)
    }

    /// 사이클 1회 실행.
    ///
    /// 스냅샷 → 조회 → 기록 순서이며, 어느 단계든 실패하면 그대로 에러를 반환합니다.
    /// 상태/메트릭 갱신은 [`RateCollector::run_once`]가 담당합니다.
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let started = std::time::Instant::now();
        let timestamp = capture_timestamp();

        let tracked = self.store.snapshot().await?;
        let quotes = self.source.fetch().await?;
        debug!(
            fetched = quotes.len(),
            tracked = tracked.len(),
            "시세 조회 완료"
        );

        let summary = write_cycle(&*self.store, &quotes, &tracked, timestamp).await?;

        Ok(CycleReport {
            timestamp,
            fetched: quotes.len(),
            full_rows: summary.full_rows,
            tracked_rows: summary.tracked_rows,
            elapsed: started.elapsed(),
        })
    }

    /// 사이클 1회 실행 후 결과를 상태, 메트릭, 로그에 반영.
    ///
    /// 실패는 여기서 소비되며 호출자에게 전파되지 않습니다.
    pub async fn run_once(&self) -> Option<CycleReport> {
        self.status.write().await.begin(Utc::now());
        let started = std::time::Instant::now();

        match self.run_cycle().await {
            Ok(report) => {
                report.log_summary();
                record_cycle("success", report.elapsed.as_secs_f64());
                record_rows_written("full", report.full_rows);
                record_rows_written("tracked", report.tracked_rows);
                self.status.write().await.succeed(report.timestamp);
                Some(report)
            }
            Err(e) => {
                // 조회/기록 실패는 "failure", 레지스트리 조회 등 그 외 오류는 "error"
                let outcome = if e.is_cycle_failure() {
                    "failure"
                } else {
                    "error"
                };
                error!(error = %e, outcome, "시세 수집 사이클 실패, 다음 주기까지 건너뜀");
                record_cycle(outcome, started.elapsed().as_secs_f64());
                self.status.write().await.fail(e.to_string());
                None
            }
        }
    }

    /// 다음 정각 분부터 주기 실행. 종료 토큰이 취소되면 반환합니다.
    pub async fn run(&self, shutdown: CancellationToken) {
        let now = Utc::now();
        let first_fire = next_minute_boundary(now);
        let delay = (first_fire - now).to_std().unwrap_or(Duration::ZERO);

        info!(
            interval_secs = self.interval.as_secs(),
            first_fire = %first_fire,
            "시세 수집기 시작"
        );

        self.run_from(Instant::now() + delay, shutdown).await;
    }

    /// `start`에 첫 사이클을 실행하고 이후 고정 간격으로 실행.
    ///
    /// 사이클이 주기보다 오래 걸리면 밀린 tick은 한 번만 실행되고,
    /// 이후에는 `start` 기준 격자로 돌아갑니다 (몰아서 실행하지 않음).
    pub async fn run_from(&self, start: Instant, shutdown: CancellationToken) {
        let mut ticker = interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("시세 수집기: 종료 시그널 수신");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }

        info!("시세 수집기 종료됨");
    }

    /// 백그라운드 태스크로 실행.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}

/// `now` 이후(같으면 `now`)의 첫 정각 분.
pub fn next_minute_boundary(now: DateTime<Utc>) -> DateTime<Utc> {
    let minute = ChronoDuration::minutes(1);
    match now.duration_trunc(minute) {
        Ok(floor) if floor == now => now,
        Ok(floor) => floor + minute,
        Err(_) => now,
    }
}
