//! 가격 소스 클라이언트.
//!
//! 사이클마다 설정된 URL로 GET 요청 한 번을 보내고, 응답 JSON 배열을
//! `(symbol, price)` 목록으로 파싱합니다.
//!
//! # 응답 형식
//!
//! ```json
//! [
//!   {"symbol": "BTCUSD", "price": "64012.55000000"},
//!   {"symbol": "ETHUSD", "price": 3150.2}
//! ]
//! ```
//!
//! `price`는 문자열/숫자 모두 허용합니다. 항목 하나라도 잘못되면
//! 전체 응답을 `RateError::Fetch`로 처리합니다 (항목 단위 skip 없음).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{RateError, Result};
use crate::model::QuoteInput;

/// 시세 소스 trait.
///
/// 호출 간 상태를 가지지 않으며, 재시도하지 않습니다.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// 현재 시세 목록 조회.
    ///
    /// # Errors
    ///
    /// - `RateError::Fetch`: 전송 실패, 2xx 외 응답, 응답 형식 오류
    async fn fetch(&self) -> Result<Vec<QuoteInput>>;
}

/// 응답 항목.
#[derive(Debug, Deserialize)]
struct RawQuote {
    symbol: String,
    price: RawPrice,
}

/// 문자열 또는 숫자 가격.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    fn to_f64(&self, symbol: &str) -> Result<f64> {
        let value = match self {
            RawPrice::Number(v) => *v,
            RawPrice::Text(text) => text.trim().parse::<f64>().map_err(|e| {
                RateError::Fetch(format!("invalid price {:?} for {}: {}", text, symbol, e))
            })?,
        };

        if !value.is_finite() {
            return Err(RateError::Fetch(format!(
                "non-finite price for {}: {}",
                symbol, value
            )));
        }
        Ok(value)
    }
}

/// 응답 본문 파싱.
///
/// 하나의 원자적 문서로 취급하여, 잘못된 항목이 있으면 전체가 실패합니다.
pub fn parse_payload(body: &[u8]) -> Result<Vec<QuoteInput>> {
    let raw: Vec<RawQuote> = serde_json::from_slice(body)?;

    raw.into_iter()
        .map(|item| {
            let price = item.price.to_f64(&item.symbol)?;
            Ok(QuoteInput::new(item.symbol, price))
        })
        .collect()
}

/// HTTP 가격 소스.
#[derive(Clone)]
pub struct HttpQuoteSource {
    client: reqwest::Client,
    url: String,
}

impl HttpQuoteSource {
    /// 새 클라이언트 생성.
    ///
    /// `timeout`은 요청 전체(연결 + 응답 본문)에 적용됩니다.
    /// 수집 주기보다 짧게 설정해야 사이클이 겹치지 않습니다.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RateError::Config(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch(&self) -> Result<Vec<QuoteInput>> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Fetch(format!(
                "price source returned {}",
                status
            )));
        }

        let body = response.bytes().await?;
        let quotes = parse_payload(&body)?;

        debug!(url = %self.url, count = quotes.len(), "시세 조회 완료");
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_and_number_prices() {
        let body = br#"[
            {"symbol": "BTCUSD", "price": "100.50"},
            {"symbol": "ETHUSD", "price": 50}
        ]"#;

        let quotes = parse_payload(body).unwrap();
        assert_eq!(
            quotes,
            vec![
                QuoteInput::new("BTCUSD", 100.5),
                QuoteInput::new("ETHUSD", 50.0),
            ]
        );
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let body = br#"[{"symbol": "BTCUSD", "price": "1.0", "volume": "123"}]"#;
        let quotes = parse_payload(body).unwrap();
        assert_eq!(quotes.len(), 1);
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_payload(b"[]").unwrap().is_empty());
    }

    #[test]
    fn test_one_bad_entry_fails_whole_payload() {
        let body = br#"[
            {"symbol": "BTCUSD", "price": "100.0"},
            {"symbol": "ETHUSD", "price": "n/a"}
        ]"#;

        let err = parse_payload(body).unwrap_err();
        assert!(matches!(err, RateError::Fetch(_)));
        assert!(err.to_string().contains("ETHUSD"));
    }

    #[test]
    fn test_missing_field_fails() {
        let err = parse_payload(br#"[{"symbol": "BTCUSD"}]"#).unwrap_err();
        assert!(matches!(err, RateError::Fetch(_)));
    }

    #[test]
    fn test_non_array_document_fails() {
        assert!(parse_payload(br#"{"symbol": "BTCUSD", "price": "1"}"#).is_err());
        assert!(parse_payload(b"not json").is_err());
    }

    #[test]
    fn test_non_finite_text_price_fails() {
        let err = parse_payload(br#"[{"symbol": "BTCUSD", "price": "NaN"}]"#).unwrap_err();
        assert!(err.to_string().contains("non-finite"));
    }

    #[tokio::test]
    async fn test_http_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v3/ticker/price")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"symbol": "BTCUSD", "price": "100.0"}]"#)
            .create_async()
            .await;

        let source = HttpQuoteSource::new(
            format!("{}/api/v3/ticker/price", server.url()),
            Duration::from_secs(5),
        )
        .unwrap();

        let quotes = source.fetch().await.unwrap();
        assert_eq!(quotes, vec![QuoteInput::new("BTCUSD", 100.0)]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_fetch_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/prices")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let source =
            HttpQuoteSource::new(format!("{}/prices", server.url()), Duration::from_secs(5))
                .unwrap();

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, RateError::Fetch(_)));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_http_fetch_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/prices")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let source =
            HttpQuoteSource::new(format!("{}/prices", server.url()), Duration::from_secs(5))
                .unwrap();

        assert!(matches!(
            source.fetch().await.unwrap_err(),
            RateError::Fetch(_)
        ));
    }
}
