//! CRM API 설정

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};

use crm_core::ratelimit::RateLimitConfig;

/// CRM API 설정
#[derive(Clone)]
pub struct Config {
    /// 서버 포트
    pub port: u16,

    /// Document store 위치 (SQLite URL)
    pub database_url: String,

    /// 직원 토큰 서명 시크릿
    pub staff_secret: String,

    /// 고객 토큰 서명 시크릿
    pub customer_secret: String,

    /// Rate limit 설정 (초당 충전량, bucket 용량)
    pub rate_limit: RateLimitConfig,

    /// idle bucket 정리 기준. `None`이면 정리하지 않음
    pub rate_limit_idle: Option<Duration>,

    /// Store 작업별 timeout
    pub db_timeout: Duration,

    /// bcrypt cost
    pub bcrypt_cost: u32,

    /// X-Forwarded-For 첫 항목을 클라이언트 키로 사용
    pub trust_forwarded_for: bool,
}

// 시크릿이 로그에 남지 않도록 수동 구현
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("database_url", &self.database_url)
            .field("staff_secret", &"**redacted**")
            .field("customer_secret", &"**redacted**")
            .field("rate_limit", &self.rate_limit)
            .field("rate_limit_idle", &self.rate_limit_idle)
            .field("db_timeout", &self.db_timeout)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("trust_forwarded_for", &self.trust_forwarded_for)
            .finish()
    }
}

impl Config {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수에서 설정 로드
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let staff_secret = required(&lookup, "CRM_STAFF_SECRET_KEY")?;
        let customer_secret = required(&lookup, "CRM_CUSTOMER_SECRET_KEY")?;
        if staff_secret == customer_secret {
            bail!("CRM_STAFF_SECRET_KEY and CRM_CUSTOMER_SECRET_KEY must differ");
        }

        let rate_limit = RateLimitConfig::new(
            parsed(&lookup, "CRM_RATE_LIMIT", 1.0)?,
            parsed(&lookup, "CRM_BURST_LIMIT", 5)?,
        )
        .map_err(|e| anyhow!(e))?;

        let idle_secs: u64 = parsed(&lookup, "CRM_RATE_LIMIT_IDLE_SECS", 600)?;

        let bcrypt_cost: u32 = parsed(&lookup, "CRM_BCRYPT_COST", 12)?;
        if !(4..=31).contains(&bcrypt_cost) {
            bail!("CRM_BCRYPT_COST must be between 4 and 31, got {}", bcrypt_cost);
        }

        Ok(Self {
            port: parsed(&lookup, "CRM_PORT", 8080)?,

            database_url: lookup("CRM_DATABASE_URL")
                .unwrap_or_else(|| "sqlite://crm.db".to_string()),

            staff_secret,
            customer_secret,
            rate_limit,

            rate_limit_idle: (idle_secs > 0).then(|| Duration::from_secs(idle_secs)),

            db_timeout: Duration::from_secs(parsed(&lookup, "CRM_DB_TIMEOUT_SECS", 100)?),

            bcrypt_cost,

            trust_forwarded_for: parsed(&lookup, "CRM_TRUST_FORWARDED_FOR", false)?,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> anyhow::Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("{} must be set", key),
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
