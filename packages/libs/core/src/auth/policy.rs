//! 인가 정책
//!
//! 검증된 Claims와 대상 리소스 ID로 접근 허용 여부를 결정합니다.
//! 모든 규칙은 I/O 없는 순수 함수이며, 거부 시 `Error::Unauthorized`를 반환합니다.
//!
//! 주체 ID는 항상 검증된 토큰에서 가져오며 경로에서 유도하지 않습니다.

use super::claims::{CustomerClaims, Role, StaffClaims};
use crate::error::{Error, Result};

/// 인가 정책
pub struct AccessPolicy;

impl AccessPolicy {
    /// 특정 role 요구
    ///
    /// 관리자 전용 작업(전체 직원 조회, 고객 데이터 내보내기/가져오기)에 사용합니다.
    pub fn require_role(claims: &StaffClaims, role: Role) -> Result<()> {
        if claims.role == role {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }

    /// 본인 또는 특정 role 요구
    ///
    /// `role` 보유 시 모든 ID에 허용, 아니면 `USER`가 자기 ID에 접근할 때만 허용합니다.
    pub fn require_owner_or_role(claims: &StaffClaims, target_id: &str, role: Role) -> Result<()> {
        if Self::require_role(claims, role).is_ok() {
            return Ok(());
        }

        if claims.staff_id == target_id && claims.role == Role::User {
            return Ok(());
        }

        Err(Error::Unauthorized)
    }

    /// 고객 ID 정확히 일치 요구 (관리자 우회 없음)
    pub fn require_exact_match(claims: &CustomerClaims, target_id: &str) -> Result<()> {
        if claims.customer_id == target_id {
            Ok(())
        } else {
            Err(Error::Unauthorized)
        }
    }
}
