//! CRM API 미들웨어
//!
//! 요청 ID, Rate Limiting, 인증 게이트를 정의합니다.

pub mod auth;
pub mod rate_limit;

use std::fmt;

use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

pub use auth::{authenticate_customer, authenticate_staff};
pub use rate_limit::rate_limit;

/// 요청 ID 헤더 (요청/응답 공통)
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 클라이언트가 보낸 요청 ID의 최대 길이
const MAX_REQUEST_ID_LEN: usize = 64;

/// 요청 ID
///
/// 클라이언트가 보낸 `x-request-id`가 안전한 형식이면 그대로 쓰고,
/// 아니면 새 UUID를 만듭니다.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| is_acceptable(v))
            .map(|v| RequestId(v.to_string()))
            .unwrap_or_else(|| RequestId(Uuid::new_v4().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_acceptable(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// 요청마다 `request` span을 열고 응답에 요청 ID를 붙입니다.
///
/// 하위 레이어의 로그(rate limit 거부, 인증 실패, 에러 응답)는 모두 이 span 안에서
/// 기록되므로 `request_id` 필드를 공유합니다.
pub async fn request_id(req: Request, next: Next) -> Response {
    let id = RequestId::from_headers(req.headers());
    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut resp = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(id.as_str()) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    resp
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use super::*;

    async fn response_id(incoming: Option<&str>) -> String {
        let app = Router::new()
            .route("/health", get(|| async { "ok" }))
            .layer(from_fn(request_id));

        let mut builder = axum::http::Request::builder().uri("/health");
        if let Some(value) = incoming {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }

        let resp = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        resp.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_generates_id_when_absent() {
        let id = response_id(None).await;
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_echoes_client_id() {
        assert_eq!(response_id(Some("crm-client_42")).await, "crm-client_42");
    }

    #[tokio::test]
    async fn test_replaces_unsafe_client_id() {
        let too_long = "a".repeat(MAX_REQUEST_ID_LEN + 1);
        for bad in ["has space", "semi;colon", too_long.as_str()] {
            let id = response_id(Some(bad)).await;
            assert_ne!(id, bad);
            assert!(Uuid::parse_str(&id).is_ok());
        }
    }
}
