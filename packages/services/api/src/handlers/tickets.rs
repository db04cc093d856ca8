//! 티켓 핸들러 (고객 게이트)
//!
//! `/customers/ticket/{id}`의 `id`는 메서드마다 의미가 다릅니다:
//! POST는 interaction ID, GET은 직원 ID, PUT/DELETE는 ticket ID.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crm_core::auth::CustomerClaims;
use crm_core::id::IdGenerator;

use super::{message, require_ulid, MessageResponse};
use crate::entities::{Interaction, NewTicket, Ticket, TicketPatch};
use crate::error::{ApiError, Payload, Result};
use crate::state::AppState;
use crate::store::Filter;

fn owned_ticket(ticket_id: &str, customer_id: &str) -> Filter {
    Filter::new()
        .eq("ticket_id", ticket_id)
        .eq("customer_id", customer_id)
}

/// GET /customers/tickets/
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<CustomerClaims>,
) -> Result<Json<Vec<Ticket>>> {
    let tickets = state.records.find::<Ticket>(&Filter::new()).await?;
    Ok(Json(tickets))
}

/// POST /customers/ticket/{interaction_id}
///
/// 호출한 고객이 참여한 미팅에만 티켓을 만들 수 있습니다.
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<CustomerClaims>,
    Path(interaction_id): Path<String>,
    Payload(request): Payload<NewTicket>,
) -> Result<(StatusCode, Json<Ticket>)> {
    require_ulid(&interaction_id, "interaction")?;

    let filter = Filter::new()
        .eq("interaction_id", interaction_id.as_str())
        .eq("customer_id", claims.customer_id.as_str());
    if state.records.find_one::<Interaction>(&filter).await?.is_none() {
        return Err(ApiError::not_found(
            "customer not belongs to this interaction or interaction not exists",
        ));
    }

    let ticket = request.into_record(IdGenerator::generate(), &interaction_id, &claims.customer_id);
    state.records.insert(&ticket).await?;

    tracing::info!(ticket_id = %ticket.ticket_id, customer_id = %claims.customer_id, "ticket created");
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// GET /customers/ticket/{user_id}
///
/// 해당 직원이 진행한 미팅에 걸린 티켓 목록.
pub async fn tickets_for_staff(
    State(state): State<Arc<AppState>>,
    Extension(_claims): Extension<CustomerClaims>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Ticket>>> {
    require_ulid(&user_id, "User")?;

    let interactions = state
        .records
        .find::<Interaction>(&Filter::new().eq("user_id", user_id.as_str()))
        .await?;

    let mut tickets = Vec::new();
    for interaction in &interactions {
        let found = state
            .records
            .find::<Ticket>(&Filter::new().eq("interaction_id", interaction.interaction_id.as_str()))
            .await?;
        tickets.extend(found);
    }

    Ok(Json(tickets))
}

/// PUT /customers/ticket/{ticket_id}
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<CustomerClaims>,
    Path(ticket_id): Path<String>,
    Payload(patch): Payload<TicketPatch>,
) -> Result<Json<MessageResponse>> {
    require_ulid(&ticket_id, "ticket")?;

    let outcome = state
        .records
        .update::<Ticket>(&owned_ticket(&ticket_id, &claims.customer_id), patch.into_set())
        .await?;

    if outcome.matched == 0 {
        return Err(ApiError::not_found("ticket not found"));
    }

    Ok(message("ticket updated successfully"))
}

/// DELETE /customers/ticket/{ticket_id}
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<CustomerClaims>,
    Path(ticket_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    require_ulid(&ticket_id, "ticket")?;

    let deleted = state
        .records
        .delete::<Ticket>(&owned_ticket(&ticket_id, &claims.customer_id))
        .await?;

    if deleted == 0 {
        return Err(ApiError::not_found("ticket not found"));
    }

    Ok(message("ticket deleted successfully"))
}
