//! SQLite 기반 document store
//!
//! 모든 컬렉션을 `documents(doc_id, collection, body)` 테이블 하나에 저장하고
//! 필드 비교는 `json_extract`로 수행합니다.

use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crm_core::id::IdGenerator;

use super::{Document, DocumentStore, Filter, StoreError, StoreResult, UpdateOutcome};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// URL로 연결 후 스키마 초기화
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        if url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// 메모리 DB (커넥션 하나를 계속 유지)
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> anyhow::Result<()> {
        let queries = [
            r#"CREATE TABLE IF NOT EXISTS documents (
                doc_id TEXT PRIMARY KEY,
                collection TEXT NOT NULL,
                body TEXT NOT NULL
            );"#,
            r#"CREATE INDEX IF NOT EXISTS documents_collection ON documents (collection);"#,
        ];

        for q in queries {
            sqlx::query(q).execute(&self.pool).await?;
        }

        Ok(())
    }
}

/// WHERE 절과 바인딩 값 생성
///
/// 첫 번째 바인딩은 항상 컬렉션 이름입니다.
fn where_clause(collection: &str, filter: &Filter) -> StoreResult<(String, Vec<String>)> {
    let mut sql = String::from("collection = ?");
    let mut binds = vec![collection.to_string()];

    for (field, value) in filter.conditions() {
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(StoreError::InvalidField(field.clone()));
        }
        binds.push(format!("$.{}", field));

        if value.is_null() {
            sql.push_str(" AND json_extract(body, ?) IS NULL");
        } else {
            sql.push_str(" AND json_extract(body, ?) = json_extract(?, '$')");
            binds.push(serde_json::to_string(value)?);
        }
    }

    Ok((sql, binds))
}

fn decode(body: &str) -> StoreResult<Document> {
    Ok(serde_json::from_str(body)?)
}

fn encode(document: &Document) -> StoreResult<String> {
    Ok(serde_json::to_string(document)?)
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn insert(&self, collection: &str, document: Document) -> StoreResult<()> {
        sqlx::query(r#"INSERT INTO documents (doc_id, collection, body) VALUES (?1, ?2, ?3)"#)
            .bind(IdGenerator::generate())
            .bind(collection)
            .bind(encode(&document)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for document in &documents {
            sqlx::query(r#"INSERT INTO documents (doc_id, collection, body) VALUES (?1, ?2, ?3)"#)
                .bind(IdGenerator::generate())
                .bind(collection)
                .bind(encode(document)?)
                .execute(&mut *tx)
                .await?;
            inserted += 1;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let (clause, binds) = where_clause(collection, filter)?;
        let sql = format!(
            "SELECT body FROM documents WHERE {} ORDER BY rowid LIMIT 1",
            clause
        );

        let mut query = sqlx::query_scalar::<_, String>(&sql);
        for value in &binds {
            query = query.bind(value.as_str());
        }

        query
            .fetch_optional(&self.pool)
            .await?
            .map(|body| decode(&body))
            .transpose()
    }

    async fn find(&self, collection: &str, filter: &Filter) -> StoreResult<Vec<Document>> {
        let (clause, binds) = where_clause(collection, filter)?;
        let sql = format!("SELECT body FROM documents WHERE {} ORDER BY rowid", clause);

        let mut query = sqlx::query_scalar::<_, String>(&sql);
        for value in &binds {
            query = query.bind(value.as_str());
        }

        query
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|body| decode(body))
            .collect()
    }

    async fn count(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let (clause, binds) = where_clause(collection, filter)?;
        let sql = format!("SELECT COUNT(*) FROM documents WHERE {}", clause);

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for value in &binds {
            query = query.bind(value.as_str());
        }

        let count = query.fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> StoreResult<UpdateOutcome> {
        let (clause, binds) = where_clause(collection, filter)?;
        let sql = format!(
            "SELECT doc_id, body FROM documents WHERE {} ORDER BY rowid LIMIT 1",
            clause
        );

        let mut tx = self.pool.begin().await?;

        let mut query = sqlx::query_as::<_, (String, String)>(&sql);
        for value in &binds {
            query = query.bind(value.as_str());
        }
        let existing = query.fetch_optional(&mut *tx).await?;

        let outcome = match existing {
            Some((doc_id, body)) => {
                let mut document = decode(&body)?;
                document.extend(set);

                sqlx::query(r#"UPDATE documents SET body = ?1 WHERE doc_id = ?2"#)
                    .bind(encode(&document)?)
                    .bind(doc_id.as_str())
                    .execute(&mut *tx)
                    .await?;

                UpdateOutcome {
                    matched: 1,
                    upserted: false,
                }
            }
            None if upsert => {
                let mut document = filter.to_document();
                document.retain(|_, value| !matches!(value, Value::Null));
                document.extend(set);

                sqlx::query(
                    r#"INSERT INTO documents (doc_id, collection, body) VALUES (?1, ?2, ?3)"#,
                )
                .bind(IdGenerator::generate())
                .bind(collection)
                .bind(encode(&document)?)
                .execute(&mut *tx)
                .await?;

                UpdateOutcome {
                    matched: 0,
                    upserted: true,
                }
            }
            None => UpdateOutcome::default(),
        };

        tx.commit().await?;
        Ok(outcome)
    }

    async fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let (clause, binds) = where_clause(collection, filter)?;
        let sql = format!(
            "DELETE FROM documents WHERE doc_id = \
             (SELECT doc_id FROM documents WHERE {} ORDER BY rowid LIMIT 1)",
            clause
        );

        let mut query = sqlx::query(&sql);
        for value in &binds {
            query = query.bind(value.as_str());
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
