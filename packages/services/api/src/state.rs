//! CRM API 앱 상태

use std::sync::Arc;

use tokio::task::JoinHandle;

use crm_core::auth::TokenService;
use crm_core::ratelimit::VisitorRateLimiter;

use crate::config::Config;
use crate::password::PasswordHasher;
use crate::store::{DocumentStore, Records, SqliteStore};

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다.
/// 요청 간에 공유되는 가변 상태는 rate limiter 레지스트리뿐입니다.
pub struct AppState {
    /// 설정
    pub config: Config,

    /// 직원/고객 토큰 발급 및 검증
    pub tokens: TokenService,

    /// 클라이언트별 요청 수락 제어
    pub limiter: VisitorRateLimiter,

    /// 엔티티 레코드 접근
    pub records: Records,

    pub passwords: PasswordHasher,
}

impl AppState {
    /// 새 상태 생성
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let store = SqliteStore::connect(&config.database_url).await?;
        Self::with_store(config, Arc::new(store))
    }

    /// 주어진 store로 상태 생성
    pub fn with_store(config: &Config, store: Arc<dyn DocumentStore>) -> anyhow::Result<Self> {
        let tokens = TokenService::new(&config.staff_secret, &config.customer_secret)?;

        Ok(Self {
            config: config.clone(),
            tokens,
            limiter: VisitorRateLimiter::new(config.rate_limit),
            records: Records::new(store, config.db_timeout),
            passwords: PasswordHasher::new(config.bcrypt_cost)?,
        })
    }
}

/// idle bucket 정리 작업 시작
///
/// 정리가 비활성화되어 있으면 `None`.
pub fn spawn_idle_reaper(state: Arc<AppState>) -> Option<JoinHandle<()>> {
    let max_idle = state.config.rate_limit_idle?;

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(max_idle);
        // 첫 tick은 즉시 완료됨
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = state.limiter.reap_idle(max_idle);
            tracing::debug!(removed, remaining = state.limiter.len(), "rate limiter reap");
        }
    }))
}
