//! Attachment row and creation DTO.

use chamado_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `attachments` table.
///
/// `history_entry_id` is null until a transition binds the attachment as its
/// evidence; `storage_key` is the server-side file name under the configured
/// storage directory.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attachment {
    pub id: DbId,
    pub ticket_id: DbId,
    pub history_entry_id: Option<DbId>,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub uploaded_by: DbId,
    pub created_at: Timestamp,
}

/// DTO for inserting an uploaded attachment.
#[derive(Debug, Clone)]
pub struct CreateAttachment {
    pub ticket_id: DbId,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub storage_key: String,
    pub uploaded_by: DbId,
}
