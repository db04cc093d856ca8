//! 토큰 발급 및 검증
//!
//! 직원/고객 두 종류의 주체에 대해 HS256 서명 토큰을 발급하고 검증합니다.
//! 종류마다 별도의 시크릿을 사용하므로 한쪽 토큰은 다른 쪽 검증을 통과할 수 없습니다.
//!
//! 검증은 순수한 서명/시간 검사이며 DB에 저장된 토큰 사본을 조회하지 않습니다.
//! 같은 주체가 동시에 로그인하면 각 토큰이 만료될 때까지 독립적으로 유효합니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{Claims, CustomerClaims, Identity, PrincipalKind, StaffClaims, TOKEN_TTL_HOURS};
use crate::error::{Error, Result};

/// 토큰을 전달하는 요청 헤더 이름
pub const TOKEN_HEADER: &str = "token";

/// 서명된 토큰 문자열
///
/// 로그에 노출되지 않도록 `Debug` 출력은 가려집니다.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedToken(String);

impl SignedToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for SignedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SignedToken(**redacted**)")
    }
}

/// 헤더 값에서 토큰 추출
///
/// 헤더가 없거나 비어 있으면 `MissingCredential`.
pub fn token_from_header(value: Option<&str>) -> Result<&str> {
    match value.map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(Error::MissingCredential),
    }
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// 토큰 서비스
///
/// 시작 시 한 번 생성되며 이후 불변입니다.
pub struct TokenService {
    staff: SigningKey,
    customer: SigningKey,
    ttl: Duration,
    validation: Validation,
}

impl TokenService {
    /// 새 서비스 생성
    ///
    /// 시크릿이 비어 있거나 두 시크릿이 같으면 설정 에러입니다.
    pub fn new(staff_secret: &str, customer_secret: &str) -> Result<Self> {
        if staff_secret.trim().is_empty() {
            return Err(Error::Configuration {
                reason: "staff secret is empty".to_string(),
            });
        }
        if customer_secret.trim().is_empty() {
            return Err(Error::Configuration {
                reason: "customer secret is empty".to_string(),
            });
        }
        if staff_secret == customer_secret {
            return Err(Error::Configuration {
                reason: "staff and customer secrets must differ".to_string(),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            staff: SigningKey::from_secret(staff_secret),
            customer: SigningKey::from_secret(customer_secret),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
            validation,
        })
    }

    /// 토큰 유효 기간 변경
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn key(&self, kind: PrincipalKind) -> &SigningKey {
        match kind {
            PrincipalKind::Staff => &self.staff,
            PrincipalKind::Customer => &self.customer,
        }
    }

    /// 토큰 발급 (만료 = 현재 + TTL)
    pub fn issue(&self, identity: Identity) -> Result<SignedToken> {
        self.issue_at(identity, Utc::now())
    }

    /// 지정한 발급 시각 기준으로 토큰 발급
    pub fn issue_at(&self, identity: Identity, issued_at: DateTime<Utc>) -> Result<SignedToken> {
        let key = &self.key(identity.kind()).encoding;
        let header = Header::new(Algorithm::HS256);

        let signed = match identity.into_claims(issued_at, self.ttl) {
            Claims::Staff(claims) => encode(&header, &claims, key),
            Claims::Customer(claims) => encode(&header, &claims, key),
        }
        .map_err(|e| Error::TokenSigning {
            reason: e.to_string(),
        })?;

        Ok(SignedToken(signed))
    }

    /// 토큰 검증 및 Claims 추출
    ///
    /// - 파싱 실패 → `MalformedToken`
    /// - 서명 불일치 (다른 종류의 시크릿 포함) → `InvalidSignature`
    /// - `exp < now` → `TokenExpired`
    pub fn validate(&self, token: &str, expected: PrincipalKind) -> Result<Claims> {
        let key = &self.key(expected).decoding;

        let claims = match expected {
            PrincipalKind::Staff => decode::<StaffClaims>(token, key, &self.validation)
                .map(|data| Claims::Staff(data.claims)),
            PrincipalKind::Customer => decode::<CustomerClaims>(token, key, &self.validation)
                .map(|data| Claims::Customer(data.claims)),
        }
        .map_err(map_decode_error)?;

        if claims.is_expired() {
            return Err(Error::TokenExpired);
        }

        Ok(claims)
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> Error {
    match err.kind() {
        ErrorKind::ExpiredSignature => Error::TokenExpired,
        ErrorKind::InvalidSignature => Error::InvalidSignature,
        _ => Error::MalformedToken {
            reason: err.to_string(),
        },
    }
}
