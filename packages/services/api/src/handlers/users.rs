//! 직원 계정 핸들러

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crm_core::auth::{AccessPolicy, Role, StaffClaims};

use super::{ensure_unique_email, message, MessageResponse};
use crate::entities::{StaffUser, StaffUserPatch, StaffUserView};
use crate::error::{ApiError, Payload, Result};
use crate::state::AppState;
use crate::store::{Filter, Records};

/// GET /users (관리자 전용)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<StaffClaims>,
) -> Result<Json<Vec<StaffUserView>>> {
    AccessPolicy::require_role(&claims, Role::Admin)?;

    let users = state.records.find::<StaffUser>(&Filter::new()).await?;
    Ok(Json(users.iter().map(StaffUser::view).collect()))
}

/// GET /users/{user_id}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<StaffClaims>,
    Path(user_id): Path<String>,
) -> Result<Json<StaffUserView>> {
    AccessPolicy::require_owner_or_role(&claims, &user_id, Role::Admin)?;

    let user = state
        .records
        .by_id::<StaffUser>(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(user.view()))
}

/// PUT /users/{user_id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<StaffClaims>,
    Path(user_id): Path<String>,
    Payload(patch): Payload<StaffUserPatch>,
) -> Result<Json<MessageResponse>> {
    AccessPolicy::require_owner_or_role(&claims, &user_id, Role::Admin)?;
    patch.validate()?;
    if let Some(email) = &patch.email {
        ensure_unique_email::<StaffUser>(&state.records, email, Some(&user_id)).await?;
    }

    let password_hash = match &patch.password {
        Some(password) => Some(state.passwords.hash(password).await?),
        None => None,
    };

    let outcome = state
        .records
        .update::<StaffUser>(&Records::id_filter::<StaffUser>(&user_id), patch.into_set(password_hash))
        .await?;

    if outcome.matched == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(message("user updated successfully"))
}

/// DELETE /users/{user_id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<StaffClaims>,
    Path(user_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    AccessPolicy::require_owner_or_role(&claims, &user_id, Role::Admin)?;

    let deleted = state
        .records
        .delete::<StaffUser>(&Records::id_filter::<StaffUser>(&user_id))
        .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id = %user_id, by = %claims.staff_id, "staff user deleted");
    Ok(message("User deleted successfully"))
}
