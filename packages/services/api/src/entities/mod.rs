//! CRM 엔티티 레코드
//!
//! 각 엔티티는 JSON 문서로 저장되며 ID는 ULID입니다.
//! 비밀번호 해시는 응답용 view 타입에 포함되지 않습니다.

pub mod customer;
pub mod interaction;
pub mod staff;
pub mod ticket;

use serde_json::Value;

use crate::error::ApiError;
use crate::store::Document;

pub use customer::{Customer, CustomerPatch, CustomerSignUp, CustomerView};
pub use interaction::{Interaction, NewInteraction};
pub use staff::{StaffSignUp, StaffUser, StaffUserPatch, StaffUserView};
pub use ticket::{NewTicket, Ticket, TicketPatch, TicketStatus};

/// 비밀번호 길이 제한
pub const PASSWORD_MIN_LEN: usize = 2;
pub const PASSWORD_MAX_LEN: usize = 100;

/// 로그인 요청
#[derive(Debug, Clone, serde::Deserialize)]
pub struct SignIn {
    pub email: String,
    pub password: String,
}

/// 필수 문자열 필드 검사
pub(crate) fn require_text(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::bad_request(format!("{} is required", field))),
    }
}

/// 이메일 형식 검사
///
/// `local@domain.tld` 형태만 허용합니다.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, _)| !host.is_empty())
        && !domain.ends_with('.')
}

pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ApiError::bad_request("email is not a valid email address"))
    }
}

pub(crate) fn validate_password(password: &str) -> Result<(), ApiError> {
    let len = password.chars().count();
    if (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "password must be between {} and {} characters",
            PASSWORD_MIN_LEN, PASSWORD_MAX_LEN
        )))
    }
}

/// 부분 수정 문서 생성기
///
/// `None` 필드는 건너뛰고 `updated_at`은 항상 기록합니다.
#[derive(Debug, Default)]
pub(crate) struct PatchBuilder {
    set: Document,
}

impl PatchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, value: Option<impl Into<Value>>) -> Self {
        if let Some(value) = value {
            self.set.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn finish(mut self) -> Document {
        self.set.insert(
            "updated_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        self.set
    }
}
