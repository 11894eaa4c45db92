//! 시세 API 서버.
//!
//! Axum 기반 REST API 서버와 시세 수집 스케줄러를 함께 실행합니다.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rates_api::config::{AppConfig, LogFormat};
use rates_api::metrics::setup_metrics_recorder;
use rates_api::server::create_router;
use rates_api::state::AppState;
use rates_api::tasks::RateCollector;
use rates_data::{HttpQuoteSource, PgRateStore};

const DEFAULT_LOG_FILTER: &str = "rates_api=info,rates_data=info,tower_http=debug";

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 설정 로드 (.env 포함)
    let config = AppConfig::from_env()?;

    init_tracing(config.log_format);
    info!("Starting Rates API server...");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let addr = config.socket_addr().map_err(|e| {
        error!(
            host = %config.host,
            port = config.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    // 데이터베이스 연결 및 마이그레이션
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url)
        .await?;
    info!(max_connections = config.db_max_connections, "Database connected");

    let store = PgRateStore::new(pool);
    store.migrate().await?;
    let store = Arc::new(store);

    // 가격 소스 및 수집기
    let source = Arc::new(HttpQuoteSource::new(&config.api_url, config.fetch_timeout)?);
    info!(
        url = %source.url(),
        interval_minutes = config.interval_minutes,
        fetch_timeout_secs = config.fetch_timeout.as_secs(),
        "Quote source configured"
    );

    let state = AppState::new(store.clone());
    let collector = RateCollector::new(store, source, config.interval())
        .with_status(Arc::clone(&state.collector_status));
    let state = Arc::new(state);
    info!(version = %state.version, "Application state initialized");

    // 전역 종료 토큰 (수집기에 종료 전파)
    let shutdown_token = CancellationToken::new();
    let collector_handle = collector.spawn(shutdown_token.clone());

    let app = create_router(state, Some(metrics_handle), config.cors_origins.as_deref());

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, waiting for collector...");
    shutdown_token.cancel();

    // 진행 중인 사이클은 완료될 때까지 기다림 (fetch 타임아웃 + 여유)
    let wait = config.fetch_timeout + Duration::from_secs(10);
    match tokio::time::timeout(wait, collector_handle).await {
        Ok(Ok(())) => info!("Collector stopped"),
        Ok(Err(e)) => error!(error = %e, "Collector task panicked"),
        Err(_) => warn!("Collector did not stop in time, forcing shutdown"),
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
