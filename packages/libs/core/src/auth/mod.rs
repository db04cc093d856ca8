//! 인증 관련 타입 및 로직
//!
//! # 개요
//!
//! CRM의 인증은 두 가지 주체를 다룹니다:
//!
//! - **Staff**: CRM을 사용하는 내부 직원 (`ADMIN` 또는 `USER` role)
//! - **Customer**: 자기 정보와 티켓만 다루는 고객
//!
//! 두 주체의 토큰은 서로 다른 시크릿으로 서명되며 `token` 헤더로 전달됩니다.
//! 폐기(revocation) 목록은 없고, 토큰은 만료 시점에 암묵적으로 무효화됩니다.

mod claims;
mod policy;
mod token;

pub use claims::{
    Claims, CustomerClaims, Identity, PrincipalKind, Role, StaffClaims, TOKEN_TTL_HOURS,
};
pub use policy::AccessPolicy;
pub use token::{token_from_header, SignedToken, TokenService, TOKEN_HEADER};
