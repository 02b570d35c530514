//! SLA policy row and DTOs.

use chamado_core::sla::{CandidatePolicy, PolicyHours};
use chamado_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Scope key: policy attached to a client.
pub const SCOPE_CLIENT: &str = "client";

/// Scope key: policy attached to a product.
pub const SCOPE_PRODUCT: &str = "product";

/// A row from the `sla_policies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SlaPolicy {
    pub id: DbId,
    pub name: String,
    pub entity_type: String,
    pub entity_id: DbId,
    pub hours_baixo: i64,
    pub hours_medio: i64,
    pub hours_alto: i64,
    pub priority: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SlaPolicy {
    /// View this row as a resolution candidate for the SLA calculator.
    pub fn as_candidate(&self) -> CandidatePolicy {
        CandidatePolicy {
            hours: PolicyHours {
                baixo: self.hours_baixo,
                medio: self.hours_medio,
                alto: self.hours_alto,
            },
            priority: self.priority,
        }
    }
}

/// DTO for creating an SLA policy.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSlaPolicy {
    pub name: String,
    pub entity_type: String,
    pub entity_id: DbId,
    pub hours_baixo: i64,
    pub hours_medio: i64,
    pub hours_alto: i64,
    #[serde(default)]
    pub priority: i32,
}
