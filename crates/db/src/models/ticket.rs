//! Ticket row and creation DTO.

use chamado_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tickets` table.
///
/// `status` and `impact` are stored as their string keys; the workflow
/// engine parses them through `chamado_core` before acting. `version` is the
/// optimistic-concurrency token bumped on every workflow mutation. The
/// `sla_frozen_*` columns are written once, when the ticket enters the
/// terminal status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: DbId,
    pub origin_channel: String,
    pub origin_contact: String,
    pub origin_reference: Option<String>,
    pub client_id: DbId,
    pub product_id: Option<DbId>,
    pub category_id: DbId,
    pub subcategory: Option<String>,
    pub impact: String,
    pub description: String,
    pub area_id: DbId,
    pub status: String,
    pub version: i32,
    pub sla_frozen_status: Option<String>,
    pub sla_frozen_hours: Option<i64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new ticket. Status is always `novo` at creation and
/// is not part of the DTO.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTicket {
    pub origin_channel: String,
    pub origin_contact: String,
    pub origin_reference: Option<String>,
    pub client_id: DbId,
    pub product_id: Option<DbId>,
    pub category_id: DbId,
    pub subcategory: Option<String>,
    pub impact: String,
    pub description: String,
    pub area_id: DbId,
}

/// Slim joined row used by the board projection: ticket status plus the
/// inputs the SLA calculator and VIP aggregate need.
#[derive(Debug, Clone, FromRow)]
pub struct TicketBoardRow {
    pub id: DbId,
    pub status: String,
    pub impact: String,
    pub client_id: DbId,
    pub product_id: Option<DbId>,
    pub client_vip: bool,
    pub sla_frozen_status: Option<String>,
    pub created_at: Timestamp,
}
