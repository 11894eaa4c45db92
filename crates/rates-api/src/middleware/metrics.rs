//! 요청 단위 HTTP 메트릭 수집.
//!
//! 라벨은 메서드와 정규화된 경로 두 가지입니다. `/metrics` 스크레이프 요청은
//! 집계하지 않습니다.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

use crate::metrics::{
    normalize_path, record_http_duration, record_http_request, record_http_response,
};

const SCRAPE_PATH: &str = "/metrics";

/// 요청 하나의 메트릭 라벨.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RouteLabels {
    method: String,
    path: String,
}

impl RouteLabels {
    /// 집계 대상이 아니면 `None`.
    fn of(request: &Request) -> Option<Self> {
        let raw_path = request.uri().path();
        if raw_path == SCRAPE_PATH {
            return None;
        }

        Some(Self {
            method: request.method().as_str().to_owned(),
            path: normalize_path(raw_path),
        })
    }
}

/// `axum::middleware::from_fn`으로 감싸서 사용합니다.
pub async fn track_http_metrics(request: Request, next: Next) -> Response {
    let Some(labels) = RouteLabels::of(&request) else {
        return next.run(request).await;
    };

    record_http_request(&labels.method, &labels.path);
    let started = Instant::now();

    let response = next.run(request).await;

    let elapsed = started.elapsed().as_secs_f64();
    record_http_response(&labels.method, &labels.path, response.status().as_u16());
    record_http_duration(&labels.method, &labels.path, elapsed);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request as HttpRequest, StatusCode},
        middleware,
        routing::{delete, get},
        Router,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn request(method: Method, uri: &str) -> Request {
        HttpRequest::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn tracked_app() -> Router {
        Router::new()
            .route("/currencies/{symbol}", delete(|| async { "deleted" }))
            .route("/metrics", get(|| async { "# scrape" }))
            .layer(middleware::from_fn(track_http_metrics))
    }

    #[test]
    fn test_labels_group_symbol_paths() {
        let labels = RouteLabels::of(&request(Method::DELETE, "/currencies/BTCUSD")).unwrap();
        assert_eq!(labels.method, "DELETE");
        assert_eq!(labels.path, "/currencies/{symbol}");
    }

    #[test]
    fn test_scrape_requests_have_no_labels() {
        assert!(RouteLabels::of(&request(Method::GET, "/metrics")).is_none());
    }

    #[test]
    fn test_recorded_series_use_normalized_path() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        // 로컬 레코더는 스레드 단위이므로 같은 스레드의 current-thread 런타임에서 실행
        let status = ::metrics::with_local_recorder(&recorder, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let app = tracked_app();
                app.clone()
                    .oneshot(request(Method::GET, "/metrics"))
                    .await
                    .unwrap();
                app.oneshot(request(Method::DELETE, "/currencies/ETHUSD"))
                    .await
                    .unwrap()
                    .status()
            })
        });
        assert_eq!(status, StatusCode::OK);

        let rendered = handle.render();
        assert!(rendered.contains("http_responses_total"));
        assert!(rendered.contains(r#"path="/currencies/{symbol}""#));
        assert!(rendered.contains(r#"status="200""#));
        assert!(!rendered.contains("ETHUSD"));
        assert!(!rendered.contains(r#"path="/metrics""#));
    }

    #[tokio::test]
    async fn test_unmatched_route_status_passes_through() {
        let response = tracked_app()
            .oneshot(request(Method::GET, "/unknown"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
