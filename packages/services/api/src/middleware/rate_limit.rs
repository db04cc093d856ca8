//! 클라이언트별 Rate Limiting
//!
//! 모든 라우트에서 가장 먼저 실행되며, 거부된 요청은 비즈니스 로직에 도달하지 않습니다.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crm_core::Error;

use crate::error::ApiError;
use crate::state::AppState;

/// 클라이언트 주소를 알 수 없을 때의 키
pub const UNKNOWN_CLIENT: &str = "unknown";

pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = client_key(&req, state.config.trust_forwarded_for);

    if !state.limiter.admit(&client) {
        tracing::warn!(client = %client, path = %req.uri().path(), "rate limit exceeded");
        return Err(Error::RateLimited.into());
    }

    Ok(next.run(req).await)
}

/// 요청의 클라이언트 키
///
/// `trust_forwarded_for`이면 X-Forwarded-For 첫 항목, 아니면 연결 peer IP.
pub fn client_key(req: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
