//! 시세 API 서버 라이브러리.
//!
//! REST API 라우트, 시세 수집 스케줄러, 설정, 메트릭을 제공합니다.
//! 바이너리(`main.rs`)는 이 모듈들을 조립해 서버를 실행합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::{AppConfig, LogFormat};
pub use error::{ApiErrorResponse, ApiResult};
pub use server::create_router;
pub use state::AppState;
pub use tasks::{CollectorStatus, RateCollector};
