//! HTTP 핸들러
//!
//! 보호된 핸들러는 게이트가 넣어 준 Claims로 `AccessPolicy`를 먼저 확인한 뒤
//! store에 접근합니다.

pub mod auth;
pub mod customers;
pub mod data;
pub mod health;
pub mod interactions;
pub mod tickets;
pub mod users;

use axum::Json;
use serde::Serialize;

use crm_core::id::IdGenerator;

use crate::error::ApiError;
use crate::store::{Filter, Record, Records};

/// 단순 메시지 응답
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

pub(crate) fn message(message: &'static str) -> Json<MessageResponse> {
    Json(MessageResponse { message })
}

/// 경로 ID가 ULID 형식인지 확인
///
/// 실패 시 `Invalid <kind> ID` (400).
pub(crate) fn require_ulid(id: &str, kind: &str) -> Result<(), ApiError> {
    if IdGenerator::is_valid(id) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("Invalid {} ID", kind)))
    }
}

/// 이메일 중복 확인
///
/// `owner`가 주어지면 그 레코드가 이미 같은 이메일을 갖고 있는 경우를 허용합니다.
/// 조회와 쓰기가 원자적이지 않으므로 동시 요청 사이의 중복은 막지 못합니다.
/// 조회 실패는 `BackendUnavailable`로 호출자에게 돌려줍니다.
pub(crate) async fn ensure_unique_email<R: Record>(
    records: &Records,
    email: &str,
    owner: Option<&str>,
) -> Result<(), ApiError> {
    let same_email = Filter::new().eq("email", email);

    if let Some(id) = owner {
        let unchanged = records
            .count::<R>(&same_email.clone().eq(R::ID_FIELD, id))
            .await?
            > 0;
        if unchanged {
            return Ok(());
        }
    }

    if records.count::<R>(&same_email).await? > 0 {
        return Err(ApiError::DuplicateEmail);
    }
    Ok(())
}
