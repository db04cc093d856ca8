//! 고객 데이터 내보내기/가져오기 (관리자 전용)
//!
//! 형식은 `?format=json|csv`로 지정합니다. CSV 열 순서는
//! `customer_id,name,email,company,phone,created_at,updated_at`이며
//! 가져오기는 같은 레이아웃에서 헤더 행을 건너뛰고 1-4열만 사용합니다.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use crm_core::auth::{AccessPolicy, Role, StaffClaims};
use crm_core::id::IdGenerator;

use super::{ensure_unique_email, message};
use crate::entities::{Customer, CustomerSignUp, CustomerView};
use crate::error::{ApiError, Payload, Result};
use crate::state::AppState;
use crate::store::Filter;

/// CSV 헤더
pub const CSV_COLUMNS: [&str; 7] = [
    "customer_id",
    "name",
    "email",
    "company",
    "phone",
    "created_at",
    "updated_at",
];

/// multipart 파일 필드 이름
const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
pub struct FormatQuery {
    pub format: Option<String>,
}

impl FormatQuery {
    fn data_format(&self) -> Result<DataFormat> {
        match self.format.as_deref() {
            Some("json") => Ok(DataFormat::Json),
            Some("csv") => Ok(DataFormat::Csv),
            _ => Err(ApiError::bad_request("Invalid format")),
        }
    }
}

/// GET /export/customer_data
pub async fn export_customers(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<StaffClaims>,
    Query(query): Query<FormatQuery>,
) -> Result<Response> {
    AccessPolicy::require_role(&claims, Role::Admin)?;
    let format = query.data_format()?;

    let customers: Vec<CustomerView> = state
        .records
        .find::<Customer>(&Filter::new())
        .await?
        .iter()
        .map(Customer::view)
        .collect();

    tracing::info!(count = customers.len(), format = ?format, by = %claims.staff_id, "customer data exported");

    match format {
        DataFormat::Json => Ok(Json(customers).into_response()),
        DataFormat::Csv => {
            let body = customers_to_csv(&customers)?;
            Ok((
                [
                    (header::CONTENT_TYPE, "text/csv"),
                    (header::CONTENT_DISPOSITION, "attachment;filename=customers.csv"),
                ],
                body,
            )
                .into_response())
        }
    }
}

/// POST /import/customer_data
///
/// JSON 배열 또는 multipart `file` 필드의 CSV. 가져온 고객은 새 ID를 받고
/// 비밀번호가 있으면 해시로 저장됩니다. 이미 있는 이메일이나 배치 안에서 겹치는
/// 이메일이 하나라도 있으면 아무것도 저장하지 않고 400으로 거부합니다.
pub async fn import_customers(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<StaffClaims>,
    Query(query): Query<FormatQuery>,
    req: Request,
) -> Result<Response> {
    AccessPolicy::require_role(&claims, Role::Admin)?;

    let rows = match query.data_format()? {
        DataFormat::Json => {
            let Payload(rows) = Payload::<Vec<CustomerSignUp>>::from_request(req, &state).await?;
            rows
        }
        DataFormat::Csv => {
            let multipart = Multipart::from_request(req, &state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            let bytes = read_file_field(multipart).await?;
            customers_from_csv(&bytes)?
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    let mut seen_emails = HashSet::new();
    for (index, row) in rows.into_iter().enumerate() {
        let row_error = |e: ApiError| ApiError::bad_request(format!("record {}: {}", index + 1, e));

        let valid = row.validate_import().map_err(row_error)?;
        if !seen_emails.insert(valid.email.clone()) {
            return Err(row_error(ApiError::DuplicateEmail));
        }
        match ensure_unique_email::<Customer>(&state.records, &valid.email, None).await {
            Err(e @ ApiError::DuplicateEmail) => return Err(row_error(e)),
            other => other?,
        }
        let password_hash = match &valid.password {
            Some(password) => Some(state.passwords.hash(password).await?),
            None => None,
        };
        records.push(valid.into_record(IdGenerator::generate(), password_hash));
    }

    let imported = state.records.insert_many(&records).await?;
    tracing::info!(imported, by = %claims.staff_id, "customer data imported");

    Ok(message("Data imported successfully").into_response())
}

async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() == Some(FILE_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::bad_request("missing file field"))
}

/// 고객 목록을 CSV로 직렬화
pub fn customers_to_csv(customers: &[CustomerView]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_COLUMNS).map_err(ApiError::internal)?;

    for customer in customers {
        let created_at = customer.created_at.to_rfc3339();
        let updated_at = customer.updated_at.to_rfc3339();
        writer
            .write_record([
                customer.customer_id.as_str(),
                customer.name.as_str(),
                customer.email.as_str(),
                customer.company.as_deref().unwrap_or(""),
                customer.phone.as_deref().unwrap_or(""),
                created_at.as_str(),
                updated_at.as_str(),
            ])
            .map_err(ApiError::internal)?;
    }

    writer.into_inner().map_err(ApiError::internal)
}

/// CSV에서 가져올 고객 행 파싱 (헤더 행 제외, 1-4열 사용)
pub fn customers_from_csv(bytes: &[u8]) -> Result<Vec<CustomerSignUp>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| ApiError::bad_request(e.to_string()))?;
        if record.len() < 5 {
            return Err(ApiError::bad_request(format!(
                "record {}: expected at least 5 columns, found {}",
                index + 1,
                record.len()
            )));
        }

        let column = |i: usize| record.get(i).map(|v| v.trim().to_string());
        rows.push(CustomerSignUp {
            name: column(1),
            email: column(2),
            password: None,
            company: column(3),
            phone: column(4),
        });
    }

    Ok(rows)
}
