//! Document store
//!
//! 엔티티 레코드를 컬렉션 단위의 JSON 문서로 저장합니다.
//! 질의는 최상위 필드에 대한 동등 비교(`Filter`)만 지원합니다.

mod records;
mod sqlite;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use records::{Record, Records};
pub use sqlite::SqliteStore;

/// 저장 단위 문서 (최상위 JSON object)
pub type Document = Map<String, Value>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Store 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("invalid field name: {0}")]
    InvalidField(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}

/// 동등 비교 필터
///
/// 모든 조건을 AND로 결합합니다. 빈 필터는 컬렉션 전체와 일치합니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `field == value` 조건 추가
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// upsert 시 새 문서의 기본 필드
    pub fn to_document(&self) -> Document {
        self.conditions
            .iter()
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }
}

/// `update_one` 결과
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// 필터와 일치한 문서 수 (0 또는 1)
    pub matched: u64,

    /// upsert로 새 문서를 만들었는지
    pub upserted: bool,
}

/// Document store 인터페이스
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<()>;

    /// 여러 문서를 한 번에 삽입. 하나라도 실패하면 아무것도 남지 않습니다.
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<u64>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>>;

    /// 삽입 순서대로 반환
    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>>;

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// 첫 번째 일치 문서에 `set` 필드를 병합
    ///
    /// 일치 문서가 없고 `upsert`이면 필터 필드 + `set` 필드로 새 문서를 만듭니다.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> StoreResult<UpdateOutcome>;

    /// 첫 번째 일치 문서 삭제. 삭제한 개수(0 또는 1) 반환
    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;
}
