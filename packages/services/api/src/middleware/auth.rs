//! 인증 게이트
//!
//! 보호된 라우트 앞에서 `token` 헤더를 검증하고, 성공하면 타입이 있는 Claims
//! (`StaffClaims` 또는 `CustomerClaims`)를 request extension에 넣습니다.
//! 핸들러는 `Extension<StaffClaims>`처럼 꺼내 쓰며 문자열 키 조회는 없습니다.
//!
//! 어떤 검증 실패든 하위 핸들러를 호출하지 않고 즉시 응답합니다.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crm_core::auth::{token_from_header, Claims, PrincipalKind, TOKEN_HEADER};
use crm_core::Error;

use crate::error::ApiError;
use crate::state::AppState;

/// 직원 토큰 게이트
pub async fn authenticate_staff(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&state, req.headers(), PrincipalKind::Staff)?;
    match claims {
        Claims::Staff(claims) => {
            req.extensions_mut().insert(claims);
        }
        Claims::Customer(_) => return Err(Error::Unauthorized.into()),
    }

    Ok(next.run(req).await)
}

/// 고객 토큰 게이트
pub async fn authenticate_customer(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = authenticate(&state, req.headers(), PrincipalKind::Customer)?;
    match claims {
        Claims::Customer(claims) => {
            req.extensions_mut().insert(claims);
        }
        Claims::Staff(_) => return Err(Error::Unauthorized.into()),
    }

    Ok(next.run(req).await)
}

fn authenticate(state: &AppState, headers: &HeaderMap, kind: PrincipalKind) -> Result<Claims, Error> {
    let raw = headers.get(TOKEN_HEADER).and_then(|v| v.to_str().ok());

    let result = token_from_header(raw).and_then(|token| state.tokens.validate(token, kind));

    if let Err(e) = &result {
        tracing::debug!(kind = %kind, code = e.code(), "authentication failed");
    }

    result
}
