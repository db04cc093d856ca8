//! 고객 티켓 (`tickets` 컬렉션)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PatchBuilder;
use crate::store::{Document, Record};

/// 티켓 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub interaction_id: String,

    /// 티켓을 연 고객 ID
    pub customer_id: String,

    pub status: TicketStatus,

    #[serde(default)]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Ticket {
    const COLLECTION: &'static str = "tickets";
    const ID_FIELD: &'static str = "ticket_id";
}

/// 티켓 생성 요청
#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    pub status: TicketStatus,
    pub description: Option<String>,
}

impl NewTicket {
    pub fn into_record(self, ticket_id: String, interaction_id: &str, customer_id: &str) -> Ticket {
        let now = Utc::now();
        Ticket {
            ticket_id,
            interaction_id: interaction_id.to_string(),
            customer_id: customer_id.to_string(),
            status: self.status,
            description: self.description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 티켓 상태/설명 수정
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketPatch {
    pub status: Option<TicketStatus>,
    pub description: Option<String>,
}

impl TicketPatch {
    pub fn into_set(self) -> Document {
        PatchBuilder::new()
            .field("status", self.status.map(|s| s.as_str()))
            .field("description", self.description)
            .finish()
    }
}
