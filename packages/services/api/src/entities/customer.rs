//! 고객 계정 (`customers` 컬렉션)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crm_core::auth::Identity;

use super::{require_text, validate_email, validate_password, PatchBuilder};
use crate::error::ApiError;
use crate::store::{Document, Record};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub name: String,
    pub email: String,

    /// bcrypt 해시. CSV로 가져온 고객은 비밀번호가 없어 로그인할 수 없습니다.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Customer {
    const COLLECTION: &'static str = "customers";
    const ID_FIELD: &'static str = "customer_id";
}

impl Customer {
    pub fn identity(&self) -> Identity {
        Identity::Customer {
            email: self.email.clone(),
            name: self.name.clone(),
            customer_id: self.customer_id.clone(),
        }
    }

    pub fn view(&self) -> CustomerView {
        CustomerView {
            customer_id: self.customer_id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            company: self.company.clone(),
            phone: self.phone.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// 응답/내보내기용 고객 정보
#[derive(Debug, Clone, Serialize)]
pub struct CustomerView {
    pub customer_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 고객 가입 요청. JSON 가져오기에도 같은 형태를 사용합니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerSignUp {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

/// 검증된 고객 정보
#[derive(Debug, Clone)]
pub struct ValidCustomer {
    pub name: String,
    pub email: String,
    pub password: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

impl CustomerSignUp {
    /// 가입 검증 (비밀번호 필수)
    pub fn validate(self) -> Result<ValidCustomer, ApiError> {
        let password = require_text("password", self.password.clone())?;
        validate_password(&password)?;
        self.validate_import()
    }

    /// 가져오기 검증 (비밀번호 선택)
    pub fn validate_import(self) -> Result<ValidCustomer, ApiError> {
        let name = require_text("name", self.name)?;
        let email = require_text("email", self.email)?;
        validate_email(&email)?;
        if let Some(password) = &self.password {
            validate_password(password)?;
        }

        Ok(ValidCustomer {
            name,
            email,
            password: self.password,
            company: self.company.filter(|c| !c.is_empty()),
            phone: self.phone.filter(|p| !p.is_empty()),
        })
    }
}

impl ValidCustomer {
    pub fn into_record(self, customer_id: String, password_hash: Option<String>) -> Customer {
        let now = Utc::now();
        Customer {
            customer_id,
            name: self.name,
            email: self.email,
            password: password_hash,
            company: self.company,
            phone: self.phone,
            token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 고객 정보 부분 수정
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
}

impl CustomerPatch {
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

    pub fn into_set(self, password_hash: Option<String>) -> Document {
        PatchBuilder::new()
            .field("name", self.name)
            .field("email", self.email)
            .field("password", password_hash)
            .field("company", self.company)
            .field("phone", self.phone)
            .finish()
    }
}
