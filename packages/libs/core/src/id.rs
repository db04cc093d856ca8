//! 레코드 ID 생성
//!
//! 모든 엔티티(직원, 고객, 미팅, 티켓)는 ULID 문자열을 ID로 사용합니다.
//! 시간순 정렬이 가능하고 26자 고정 길이입니다.

/// 레코드 ID 생성기
pub struct IdGenerator;

impl IdGenerator {
    /// 새 ID 생성
    pub fn generate() -> String {
        ulid::Ulid::new().to_string()
    }

    /// 경로 등으로 전달된 ID가 올바른 형식인지 확인
    pub fn is_valid(id: &str) -> bool {
        ulid::Ulid::from_string(id).is_ok()
    }
}
