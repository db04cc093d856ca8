//! CRM API 서버
//!
//! 직원(staff)과 고객(customer) 두 종류의 주체를 위한 REST API입니다.
//! 모든 요청은 클라이언트별 rate limit을 먼저 통과해야 하며,
//! 보호된 라우트는 주체 종류별 토큰 게이트를 거칩니다.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod entities;
mod error;
mod handlers;
mod middleware;
mod password;
mod routes;
mod state;
mod store;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "crm_api=debug,crm_core=info,tower_http=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 설정 로드
    let config = Config::from_env()?;
    tracing::info!("Starting CRM API with config: {:?}", config);

    // 앱 상태 초기화
    let state = Arc::new(AppState::new(&config).await?);

    if state::spawn_idle_reaper(state.clone()).is_some() {
        tracing::info!(max_idle = ?config.rate_limit_idle, "rate limiter idle reaper started");
    }

    // 라우터 구성
    let app = routes::create_router(state);

    // 서버 시작
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("CRM API listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
