//! API 서버용 HTTP middleware.

mod metrics;

pub use metrics::track_http_metrics;
