//! 직원 계정 (`users` 컬렉션)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crm_core::auth::{Identity, Role};

use super::{require_text, validate_email, validate_password, PatchBuilder};
use crate::error::ApiError;
use crate::store::{Document, Record};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
    pub user_id: String,
    pub name: String,
    pub email: String,

    /// bcrypt 해시
    pub password: String,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,

    /// 마지막으로 발급한 토큰 (참고용)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for StaffUser {
    const COLLECTION: &'static str = "users";
    const ID_FIELD: &'static str = "user_id";
}

impl StaffUser {
    pub fn identity(&self) -> Identity {
        Identity::Staff {
            email: self.email.clone(),
            name: self.name.clone(),
            staff_id: self.user_id.clone(),
            role: self.role,
        }
    }

    pub fn view(&self) -> StaffUserView {
        StaffUserView {
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            company: self.company.clone(),
            phone_no: self.phone_no.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// 응답용 직원 정보 (비밀번호/토큰 제외)
#[derive(Debug, Clone, Serialize)]
pub struct StaffUserView {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_no: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 직원 가입 요청
#[derive(Debug, Clone, Deserialize)]
pub struct StaffSignUp {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub company: Option<String>,
    pub phone_no: Option<String>,
}

/// 검증된 가입 요청
#[derive(Debug, Clone)]
pub struct ValidStaffSignUp {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub company: Option<String>,
    pub phone_no: Option<String>,
}

impl StaffSignUp {
    pub fn validate(self) -> Result<ValidStaffSignUp, ApiError> {
        let name = require_text("name", self.name)?;
        let email = require_text("email", self.email)?;
        validate_email(&email)?;
        let password = require_text("password", self.password)?;
        validate_password(&password)?;
        let role = self
            .role
            .ok_or_else(|| ApiError::bad_request("role is required"))?;

        Ok(ValidStaffSignUp {
            name,
            email,
            password,
            role,
            company: self.company,
            phone_no: self.phone_no,
        })
    }
}

impl ValidStaffSignUp {
    /// 해시된 비밀번호와 새 ID로 레코드 생성
    pub fn into_record(self, user_id: String, password_hash: String) -> StaffUser {
        let now = Utc::now();
        StaffUser {
            user_id,
            name: self.name,
            email: self.email,
            password: password_hash,
            role: self.role,
            company: self.company,
            phone_no: self.phone_no,
            token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 직원 정보 부분 수정
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaffUserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub company: Option<String>,
    pub phone_no: Option<String>,
}

impl StaffUserPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ApiError::bad_request("name must not be empty"));
            }
        }
        Ok(())
    }

    /// `$set` 문서 생성. 비밀번호는 해시로 대체
    pub fn into_set(self, password_hash: Option<String>) -> Document {
        PatchBuilder::new()
            .field("name", self.name)
            .field("email", self.email)
            .field("password", password_hash)
            .field("company", self.company)
            .field("phone_no", self.phone_no)
            .finish()
    }
}
