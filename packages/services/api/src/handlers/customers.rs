//! 고객 계정 핸들러
//!
//! 고객은 자기 레코드만 조회/수정/삭제할 수 있습니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crm_core::auth::{AccessPolicy, CustomerClaims};

use super::{ensure_unique_email, message, MessageResponse};
use crate::entities::{Customer, CustomerPatch, CustomerView};
use crate::error::{ApiError, Payload, Result};
use crate::state::AppState;
use crate::store::{Filter, Records};

/// GET /customers
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<CustomerClaims>,
) -> Result<Json<Vec<CustomerView>>> {
    let customers = state.records.find::<Customer>(&Filter::new()).await?;
    Ok(Json(customers.iter().map(Customer::view).collect()))
}

/// GET /customers/{customer_id}
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<CustomerClaims>,
    Path(customer_id): Path<String>,
) -> Result<Json<CustomerView>> {
    AccessPolicy::require_exact_match(&claims, &customer_id)?;

    let customer = state
        .records
        .by_id::<Customer>(&customer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("customer not found"))?;

    Ok(Json(customer.view()))
}

/// PUT /customers/{customer_id}
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<CustomerClaims>,
    Path(customer_id): Path<String>,
    Payload(patch): Payload<CustomerPatch>,
) -> Result<Json<MessageResponse>> {
    AccessPolicy::require_exact_match(&claims, &customer_id)?;
    patch.validate()?;
    if let Some(email) = &patch.email {
        ensure_unique_email::<Customer>(&state.records, email, Some(&customer_id)).await?;
    }

    let password_hash = match &patch.password {
        Some(password) => Some(state.passwords.hash(password).await?),
        None => None,
    };

    let outcome = state
        .records
        .update::<Customer>(
            &Records::id_filter::<Customer>(&customer_id),
            patch.into_set(password_hash),
        )
        .await?;

    if outcome.matched == 0 {
        return Err(ApiError::not_found("customer not found"));
    }

    Ok(message("customer updated successfully"))
}

/// DELETE /customers/{customer_id}
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<CustomerClaims>,
    Path(customer_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    AccessPolicy::require_exact_match(&claims, &customer_id)?;

    let deleted = state
        .records
        .delete::<Customer>(&Records::id_filter::<Customer>(&customer_id))
        .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("customer not found"));
    }

    Ok(message("customer deleted successfully"))
}
