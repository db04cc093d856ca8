//! 미팅(interaction) 핸들러 (직원 게이트)

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crm_core::auth::{AccessPolicy, Role, StaffClaims};
use crm_core::id::IdGenerator;

use super::{message, require_ulid, MessageResponse};
use crate::entities::{Customer, Interaction, NewInteraction};
use crate::error::{ApiError, Payload, Result};
use crate::state::AppState;
use crate::store::{Filter, Records};

/// GET /users/meetings/ (관리자 전용)
pub async fn list_interactions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<StaffClaims>,
) -> Result<Json<Vec<Interaction>>> {
    AccessPolicy::require_role(&claims, Role::Admin)?;

    let interactions = state.records.find::<Interaction>(&Filter::new()).await?;
    Ok(Json(interactions))
}

/// GET /user/meetings/
///
/// 호출한 직원이 진행한 미팅만 반환합니다.
pub async fn list_own_interactions(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<StaffClaims>,
) -> Result<Json<Vec<Interaction>>> {
    let interactions = state
        .records
        .find::<Interaction>(&Filter::new().eq("user_id", claims.staff_id.as_str()))
        .await?;
    Ok(Json(interactions))
}

/// POST /users/meetings/{customer_id}
pub async fn create_interaction(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<StaffClaims>,
    Path(customer_id): Path<String>,
    Payload(request): Payload<NewInteraction>,
) -> Result<(StatusCode, Json<Interaction>)> {
    let customer_exists = state
        .records
        .count::<Customer>(&Records::id_filter::<Customer>(&customer_id))
        .await?
        > 0;
    if !customer_exists {
        return Err(ApiError::not_found("customer not found"));
    }

    let interaction = request.into_record(IdGenerator::generate(), &claims.staff_id, &customer_id);
    state.records.insert(&interaction).await?;

    tracing::info!(
        interaction_id = %interaction.interaction_id,
        user_id = %claims.staff_id,
        customer_id = %customer_id,
        "interaction created"
    );

    Ok((StatusCode::CREATED, Json(interaction)))
}

/// DELETE /users/meetings/{interaction_id}
///
/// 미팅을 진행한 직원 본인 또는 관리자만 삭제할 수 있습니다.
pub async fn delete_interaction(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<StaffClaims>,
    Path(interaction_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    require_ulid(&interaction_id, "interaction")?;

    let interaction = state
        .records
        .by_id::<Interaction>(&interaction_id)
        .await?
        .ok_or_else(|| ApiError::not_found("interaction not found"))?;

    AccessPolicy::require_owner_or_role(&claims, &interaction.user_id, Role::Admin)?;

    let deleted = state
        .records
        .delete::<Interaction>(&Records::id_filter::<Interaction>(&interaction_id))
        .await?;
    if deleted == 0 {
        return Err(ApiError::not_found("interaction not found"));
    }

    Ok(message("interaction deleted successfully"))
}
