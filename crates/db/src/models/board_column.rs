//! Custom board column rows.
//!
//! Columns relabel/recolor the six status keys for display. They never add
//! edges to the transition graph.

use chamado_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `board_columns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BoardColumn {
    pub id: DbId,
    pub label: String,
    pub color: Option<String>,
    pub status_key: String,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for one column in a full-set replacement.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBoardColumn {
    pub label: String,
    pub color: Option<String>,
    pub status_key: String,
}
