//! 공통 에러 타입
//!
//! 요청 수락(admission)과 인증/인가 단계에서 발생하는 에러를 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// CRM 코어 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Authentication Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("No Authorization header found")]
    MissingCredential,

    #[error("the token is malformed: {reason}")]
    MalformedToken { reason: String },

    #[error("the token signature is invalid")]
    InvalidSignature,

    #[error("the token has expired")]
    TokenExpired,

    #[error("error signing token: {reason}")]
    TokenSigning { reason: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Authorization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("UnAuthenticated to access this resource")]
    Unauthorized,

    // ─────────────────────────────────────────────────────────────────────────────
    // Admission Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("Too many requests")]
    RateLimited,

    // ─────────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },
}

impl Error {
    /// HTTP 상태 코드로 변환
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request (권한 부족, 원 서비스 동작 유지)
            Error::Unauthorized => 400,

            // 401 Unauthorized
            Error::MissingCredential
            | Error::MalformedToken { .. }
            | Error::InvalidSignature
            | Error::TokenExpired => 401,

            // 429 Too Many Requests
            Error::RateLimited => 429,

            // 500 Internal Server Error
            Error::TokenSigning { .. } | Error::Configuration { .. } => 500,
        }
    }

    /// 에러 코드 (로그/클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingCredential => "MISSING_CREDENTIAL",
            Error::MalformedToken { .. } => "MALFORMED_TOKEN",
            Error::InvalidSignature => "INVALID_SIGNATURE",
            Error::TokenExpired => "TOKEN_EXPIRED",
            Error::TokenSigning { .. } => "TOKEN_SIGNING",
            Error::Unauthorized => "UNAUTHORIZED",
            Error::RateLimited => "RATE_LIMITED",
            Error::Configuration { .. } => "CONFIGURATION",
        }
    }

    /// 인증 실패(토큰 문제)인지 여부
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Error::MissingCredential
                | Error::MalformedToken { .. }
                | Error::InvalidSignature
                | Error::TokenExpired
        )
    }
}
