//! 타입이 있는 레코드 접근
//!
//! 엔티티 타입을 컬렉션에 매핑하고, 모든 store 호출을 설정된 timeout으로 제한합니다.
//! timeout이 지나면 호출은 포기되지만 이미 반영된 변경은 되돌리지 않습니다.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crm_core::auth::SignedToken;

use super::{Document, DocumentStore, Filter, StoreError, StoreResult, UpdateOutcome};

/// 컬렉션에 저장되는 엔티티
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// 컬렉션 이름
    const COLLECTION: &'static str;

    /// ID 필드 이름 (`user_id`, `customer_id`, ...)
    const ID_FIELD: &'static str;
}

#[derive(Clone)]
pub struct Records {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl Records {
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn bounded<T, F>(&self, op: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "store operation timed out");
                Err(StoreError::Timeout(self.timeout))
            }
        }
    }

    pub fn id_filter<R: Record>(id: &str) -> Filter {
        Filter::new().eq(R::ID_FIELD, id)
    }

    pub async fn insert<R: Record>(&self, record: &R) -> StoreResult<()> {
        let document = to_document(record)?;
        self.bounded(self.store.insert(R::COLLECTION, document)).await
    }

    pub async fn insert_many<R: Record>(&self, records: &[R]) -> StoreResult<u64> {
        let documents = records
            .iter()
            .map(to_document)
            .collect::<StoreResult<Vec<_>>>()?;
        self.bounded(self.store.insert_many(R::COLLECTION, documents))
            .await
    }

    /// 레코드로 읽을 수 없는 문서는 없는 것으로 취급합니다.
    pub async fn find_one<R: Record>(&self, filter: &Filter) -> StoreResult<Option<R>> {
        Ok(self
            .bounded(self.store.find_one(R::COLLECTION, filter))
            .await?
            .and_then(decode_or_skip::<R>))
    }

    pub async fn by_id<R: Record>(&self, id: &str) -> StoreResult<Option<R>> {
        self.find_one(&Self::id_filter::<R>(id)).await
    }

    /// 조건에 맞는 레코드 전체
    ///
    /// 레코드로 읽을 수 없는 문서(삭제된 계정에 대한 토큰 upsert가 남긴 조각 등)는
    /// 경고 로그를 남기고 건너뜁니다.
    pub async fn find<R: Record>(&self, filter: &Filter) -> StoreResult<Vec<R>> {
        Ok(self
            .bounded(self.store.find(R::COLLECTION, filter))
            .await?
            .into_iter()
            .filter_map(decode_or_skip::<R>)
            .collect())
    }

    pub async fn count<R: Record>(&self, filter: &Filter) -> StoreResult<u64> {
        self.bounded(self.store.count(R::COLLECTION, filter)).await
    }

    /// 일치하는 첫 레코드에 필드 병합 (upsert 없음)
    pub async fn update<R: Record>(&self, filter: &Filter, set: Document) -> StoreResult<UpdateOutcome> {
        self.bounded(self.store.update_one(R::COLLECTION, filter, set, false))
            .await
    }

    pub async fn delete<R: Record>(&self, filter: &Filter) -> StoreResult<u64> {
        self.bounded(self.store.delete_one(R::COLLECTION, filter)).await
    }

    /// 발급한 토큰을 계정 레코드에 기록 (ID 기준 upsert)
    ///
    /// 저장된 토큰은 참고용이며 토큰 검증은 이 값을 읽지 않습니다.
    /// 조회와 삭제 사이에 계정이 지워졌다면 ID/토큰만 있는 문서가 생기며,
    /// 읽기 경로는 이 문서를 건너뜁니다.
    pub async fn persist_token<R: Record>(&self, id: &str, token: &SignedToken) -> StoreResult<()> {
        let mut set = Document::new();
        set.insert("token".to_string(), Value::from(token.as_str()));
        set.insert("updated_at".to_string(), serde_json::to_value(Utc::now())?);

        let filter = Self::id_filter::<R>(id);
        self.bounded(self.store.update_one(R::COLLECTION, &filter, set, true))
            .await?;
        Ok(())
    }
}

fn to_document<R: Serialize>(record: &R) -> StoreResult<Document> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::Encoding(serde::ser::Error::custom(
            "record must serialize to a JSON object",
        ))),
    }
}

fn decode_or_skip<R: Record>(document: Document) -> Option<R> {
    let id = document
        .get(R::ID_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    match serde_json::from_value::<R>(Value::Object(document)) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(
                collection = R::COLLECTION,
                id = %id,
                error = %e,
                "skipping undecodable document"
            );
            None
        }
    }
}
