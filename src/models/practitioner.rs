use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Practitioner extension of a profile, keyed by the same id.
///
/// `is_online` is maintained by presence heartbeats, `in_service` by session
/// phase transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    pub id: Uuid,
    pub is_online: bool,
    pub in_service: bool,
    #[serde(default)]
    pub rating: Decimal,
    pub updated_at: DateTime<Utc>,
}
