//! crm-core: CRM 요청 수락 및 인증 핵심 라이브러리
//!
//! API 서버가 모든 요청 앞단에서 사용하는 상태/보안 로직을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `auth`: 토큰 발급/검증, Claims, 인가 정책
//! - `ratelimit`: 클라이언트별 token bucket 기반 요청 수락 제어
//! - `error`: 공통 에러 타입
//! - `id`: 레코드 ID 생성 (ULID)

pub mod auth;
pub mod error;
pub mod id;
pub mod ratelimit;

pub use error::{Error, Result};
