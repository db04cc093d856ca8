//! 비밀번호 해싱 (bcrypt)
//!
//! bcrypt는 CPU 집약적이므로 blocking 스레드에서 실행합니다.

use std::sync::Arc;

use crate::error::ApiError;

/// 존재하지 않는 계정 로그인 시 비교에 쓰는 값
const DUMMY_PASSWORD: &str = "crm-dummy-password";

#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> anyhow::Result<Self> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost)?;
        Ok(Self {
            cost,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, password: &str) -> Result<String, ApiError> {
        let password = password.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(ApiError::internal)?
            .map_err(ApiError::internal)
    }

    /// 비밀번호 검증
    ///
    /// 저장된 해시가 손상된 경우도 불일치로 처리합니다.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        let password = password.to_string();
        let hash = hash.to_string();

        let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(ApiError::internal)?;

        match verified {
            Ok(matches) => Ok(matches),
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash could not be verified");
                Ok(false)
            }
        }
    }

    /// 계정이 없을 때도 같은 비용의 검증을 수행
    pub async fn verify_dummy(&self, password: &str) -> Result<(), ApiError> {
        let hash = Arc::clone(&self.dummy_hash);
        self.verify(password, &hash).await?;
        Ok(())
    }
}
