//! 클라이언트별 요청 수락 제어 (token bucket)
//!
//! 클라이언트 키(보통 원격 IP)마다 독립적인 token bucket을 둡니다.
//! 각 bucket은 용량 `burst`, 초당 `rate` 개씩 채워지며 요청 하나당 토큰 하나를 소비합니다.
//!
//! 레지스트리 전체와 bucket 상태는 하나의 mutex가 보호합니다.
//! 임계 구역은 map 조회와 산술 연산뿐이며 I/O를 하지 않습니다.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::error::{Error, Result};

/// 기본 초당 충전량
pub const DEFAULT_RATE_LIMIT: f64 = 1.0;

/// 기본 bucket 용량
pub const DEFAULT_BURST_LIMIT: u32 = 5;

/// Rate limit 설정
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimitConfig {
    /// 초당 충전되는 토큰 수
    pub rate: f64,

    /// bucket 최대 용량
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RATE_LIMIT,
            burst: DEFAULT_BURST_LIMIT,
        }
    }
}

impl RateLimitConfig {
    pub fn new(rate: f64, burst: u32) -> Result<Self> {
        let config = Self { rate, burst };
        config.validate()?;
        Ok(config)
    }

    /// 설정 검증 (rate > 0, burst >= 1)
    pub fn validate(&self) -> Result<()> {
        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(Error::Configuration {
                reason: format!("rate limit must be positive, got {}", self.rate),
            });
        }
        if self.burst == 0 {
            return Err(Error::Configuration {
                reason: "burst limit must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn capacity(&self) -> f64 {
        f64::from(self.burst)
    }
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(config: &RateLimitConfig, now: Instant) -> Self {
        Self {
            tokens: config.capacity(),
            last_refill: now,
        }
    }

    /// 마지막 충전 이후 경과 시간만큼 충전 (용량 상한)
    fn refill(&mut self, config: &RateLimitConfig, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens = (self.tokens + elapsed.as_secs_f64() * config.rate).min(config.capacity());
        if now > self.last_refill {
            self.last_refill = now;
        }
    }

    fn try_consume(&mut self) -> bool {
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// 지금 충전하면 가득 차는지 (상태 변경 없음)
    fn would_be_full(&self, config: &RateLimitConfig, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill);
        self.tokens + elapsed.as_secs_f64() * config.rate >= config.capacity()
    }
}

/// 방문자별 Rate Limiter
///
/// 프로세스 전역 싱글턴이 아니라 앱 상태에 주입되는 값입니다.
pub struct VisitorRateLimiter {
    config: RateLimitConfig,
    visitors: Mutex<HashMap<String, TokenBucket>>,
}

impl VisitorRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            visitors: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// 요청 수락 여부 결정
    ///
    /// bucket을 찾거나 새로 만들고, 충전 후 토큰이 남아 있으면 하나를 소비하고 `true`.
    pub fn admit(&self, client_key: &str) -> bool {
        self.admit_at(client_key, Instant::now())
    }

    /// 지정한 시각 기준으로 요청 수락 여부 결정
    pub fn admit_at(&self, client_key: &str, now: Instant) -> bool {
        let mut visitors = self.visitors.lock();

        if let Some(bucket) = visitors.get_mut(client_key) {
            bucket.refill(&self.config, now);
            return bucket.try_consume();
        }

        let mut bucket = TokenBucket::full(&self.config, now);
        let admitted = bucket.try_consume();
        visitors.insert(client_key.to_string(), bucket);
        admitted
    }

    /// `admit`의 Result 버전 (거부 시 `RateLimited`)
    pub fn check(&self, client_key: &str) -> Result<()> {
        if self.admit(client_key) {
            Ok(())
        } else {
            Err(Error::RateLimited)
        }
    }

    /// 오래 사용되지 않은 bucket 제거
    ///
    /// `max_idle` 이상 갱신되지 않았고 다시 가득 찼을 bucket만 제거하므로
    /// 제거가 추가 토큰을 주는 일은 없습니다. 제거한 개수를 반환합니다.
    pub fn reap_idle(&self, max_idle: Duration) -> usize {
        self.reap_idle_at(max_idle, Instant::now())
    }

    pub fn reap_idle_at(&self, max_idle: Duration, now: Instant) -> usize {
        let mut visitors = self.visitors.lock();
        let before = visitors.len();

        visitors.retain(|_, bucket| {
            let idle = now.saturating_duration_since(bucket.last_refill) >= max_idle;
            !(idle && bucket.would_be_full(&self.config, now))
        });

        let removed = before - visitors.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = visitors.len(), "reaped idle rate limit buckets");
        }
        removed
    }

    /// 등록된 클라이언트 수
    pub fn len(&self) -> usize {
        self.visitors.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.lock().is_empty()
    }
}
