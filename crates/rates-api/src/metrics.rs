//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 수집 사이클 메트릭을 기록하고 `/metrics` 엔드포인트로 노출합니다.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};

/// Prometheus 메트릭 레코더를 설치하고 핸들을 반환합니다.
///
/// # Errors
///
/// 버킷 설정이 잘못되었거나 레코더가 이미 설치되어 있으면 `BuildError`를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .set_buckets_for_metric(
            Matcher::Full("rate_cycle_duration_seconds".to_string()),
            &[0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 수집 사이클 메트릭
// ============================================================================

/// 사이클 결과 카운터 증가 및 소요 시간 기록.
///
/// `outcome`: "success" | "failure" | "error"
pub fn record_cycle(outcome: &'static str, duration_secs: f64) {
    counter!("rate_cycles_total", "outcome" => outcome).increment(1);
    histogram!("rate_cycle_duration_seconds", "outcome" => outcome).record(duration_secs);
}

/// 로그별 기록 행 수 증가.
///
/// `log`: "full" | "tracked"
pub fn record_rows_written(log: &'static str, rows: usize) {
    counter!("rate_rows_written_total", "log" => log).increment(rows as u64);
}

// ============================================================================
// 경로 정규화
// ============================================================================

/// 경로에서 동적 파라미터를 정규화합니다.
///
/// 심볼 경로는 카디널리티가 무한하므로 `{symbol}`로 묶습니다.
/// 분석 기간은 고정된 집합이므로 그대로 둡니다.
///
/// 예: `/rates/BTCUSD` → `/rates/{symbol}`
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let normalized: Vec<&str> = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let parent = if i > 0 { segments[i - 1] } else { "" };
            let is_symbol =
                i == 2 && matches!(parent, "rates" | "currencies") && !segment.is_empty();
            let is_numeric =
                !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());

            if is_symbol {
                "{symbol}"
            } else if is_numeric {
                "{id}"
            } else {
                *segment
            }
        })
        .collect();
    normalized.join("/")
}
