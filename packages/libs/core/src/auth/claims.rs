//! 토큰 Claims
//!
//! 직원(Staff)과 고객(Customer) 토큰의 페이로드 구조입니다.
//! 두 종류는 서로 다른 시크릿으로 서명되며 절대 상호 교환되지 않습니다.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// 토큰 기본 유효 기간 (시간)
pub const TOKEN_TTL_HOURS: i64 = 24;

/// 인증 주체 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrincipalKind {
    /// 내부 직원 계정
    Staff,

    /// 고객 계정
    Customer,
}

impl std::fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrincipalKind::Staff => write!(f, "staff"),
            PrincipalKind::Customer => write!(f, "customer"),
        }
    }
}

/// 직원 Role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 직원 토큰 Claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffClaims {
    pub email: String,

    /// 표시 이름
    pub name: String,

    /// 직원 ID (`users.user_id`)
    pub staff_id: String,

    pub role: Role,

    /// 발급 시각 (unix seconds)
    pub iat: i64,

    /// 만료 시각 (unix seconds)
    pub exp: i64,
}

/// 고객 토큰 Claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerClaims {
    pub email: String,

    /// 표시 이름
    pub name: String,

    /// 고객 ID (`customers.customer_id`)
    pub customer_id: String,

    /// 발급 시각 (unix seconds)
    pub iat: i64,

    /// 만료 시각 (unix seconds)
    pub exp: i64,
}

/// 토큰을 발급할 신원 정보
///
/// 만료 시각은 발급 시점에 서버가 결정하므로 포함하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Staff {
        email: String,
        name: String,
        staff_id: String,
        role: Role,
    },
    Customer {
        email: String,
        name: String,
        customer_id: String,
    },
}

impl Identity {
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Identity::Staff { .. } => PrincipalKind::Staff,
            Identity::Customer { .. } => PrincipalKind::Customer,
        }
    }

    /// 주체 ID (staff_id 또는 customer_id)
    pub fn principal_id(&self) -> &str {
        match self {
            Identity::Staff { staff_id, .. } => staff_id,
            Identity::Customer { customer_id, .. } => customer_id,
        }
    }

    /// 발급 시각과 TTL로 Claims 생성
    pub fn into_claims(self, issued_at: DateTime<Utc>, ttl: Duration) -> Claims {
        let iat = issued_at.timestamp();
        let exp = (issued_at + ttl).timestamp();
        match self {
            Identity::Staff {
                email,
                name,
                staff_id,
                role,
            } => Claims::Staff(StaffClaims {
                email,
                name,
                staff_id,
                role,
                iat,
                exp,
            }),
            Identity::Customer {
                email,
                name,
                customer_id,
            } => Claims::Customer(CustomerClaims {
                email,
                name,
                customer_id,
                iat,
                exp,
            }),
        }
    }
}

/// 검증된 토큰 페이로드
///
/// 하나의 토큰은 정확히 하나의 variant로만 디코딩됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claims {
    Staff(StaffClaims),
    Customer(CustomerClaims),
}

impl Claims {
    pub fn kind(&self) -> PrincipalKind {
        match self {
            Claims::Staff(_) => PrincipalKind::Staff,
            Claims::Customer(_) => PrincipalKind::Customer,
        }
    }

    /// 주체 ID (staff_id 또는 customer_id)
    pub fn principal_id(&self) -> &str {
        match self {
            Claims::Staff(c) => &c.staff_id,
            Claims::Customer(c) => &c.customer_id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Claims::Staff(c) => &c.email,
            Claims::Customer(c) => &c.email,
        }
    }

    /// 만료 시각 (unix seconds)
    pub fn exp(&self) -> i64 {
        match self {
            Claims::Staff(c) => c.exp,
            Claims::Customer(c) => c.exp,
        }
    }

    /// 만료 시각
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp(), 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// 주어진 시각 기준 만료 여부 (`exp < now`)
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp() < now.timestamp()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// 직원 Claims로 변환
    pub fn into_staff(self) -> Option<StaffClaims> {
        match self {
            Claims::Staff(c) => Some(c),
            Claims::Customer(_) => None,
        }
    }

    /// 고객 Claims로 변환
    pub fn into_customer(self) -> Option<CustomerClaims> {
        match self {
            Claims::Customer(c) => Some(c),
            Claims::Staff(_) => None,
        }
    }
}
