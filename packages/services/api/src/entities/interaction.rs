//! 직원-고객 미팅 기록 (`interactions` 컬렉션)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub interaction_id: String,

    /// 미팅을 진행한 직원 ID
    pub user_id: String,

    pub customer_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Interaction {
    const COLLECTION: &'static str = "interactions";
    const ID_FIELD: &'static str = "interaction_id";
}

/// 미팅 생성 요청
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewInteraction {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
}

impl NewInteraction {
    pub fn into_record(self, interaction_id: String, user_id: &str, customer_id: &str) -> Interaction {
        let now = Utc::now();
        Interaction {
            interaction_id,
            user_id: user_id.to_string(),
            customer_id: customer_id.to_string(),
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            created_at: now,
            updated_at: now,
        }
    }
}
