use chamado_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `areas` table: an organizational queue that owns tickets.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Area {
    pub id: DbId,
    pub name: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
