//! Ticket history models.
//!
//! History is append-only: one `creation` entry when the ticket is opened,
//! one entry per successful status change, transfer, or comment. Entries are
//! discriminated by the explicit `entry_kind` column rather than by sniffing
//! which nullable columns happen to be set.

use chamado_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Entry kind key: ticket creation.
pub const ENTRY_KIND_CREATION: &str = "creation";

/// Entry kind key: status change through the workflow engine.
pub const ENTRY_KIND_STATUS_CHANGE: &str = "status_change";

/// Entry kind key: cross-area transfer (status axis untouched).
pub const ENTRY_KIND_TRANSFER: &str = "transfer";

/// Entry kind key: free-form agent comment.
pub const ENTRY_KIND_COMMENT: &str = "comment";

/// A row from the `ticket_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HistoryEntry {
    pub id: DbId,
    pub ticket_id: DbId,
    pub entry_kind: String,
    pub from_status: Option<String>,
    pub to_status: String,
    pub from_area_id: Option<DbId>,
    pub to_area_id: Option<DbId>,
    pub changed_by: DbId,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for appending a history entry.
#[derive(Debug, Clone)]
pub struct CreateHistoryEntry {
    pub ticket_id: DbId,
    pub entry_kind: &'static str,
    pub from_status: Option<String>,
    pub to_status: String,
    pub from_area_id: Option<DbId>,
    pub to_area_id: Option<DbId>,
    pub changed_by: DbId,
    pub notes: Option<String>,
}

/// History entry joined with the acting user's display name.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryEntryRow {
    pub id: DbId,
    pub entry_kind: String,
    pub from_status: Option<String>,
    pub to_status: String,
    pub from_area_id: Option<DbId>,
    pub to_area_id: Option<DbId>,
    pub changed_by_name: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// Attachment metadata joined to its history entry, for grouping into views.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryAttachmentRow {
    pub history_entry_id: DbId,
    pub id: DbId,
    pub original_name: String,
    pub mime_type: String,
}

/// Attachment metadata nested under a history entry in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentMeta {
    pub id: DbId,
    pub original_name: String,
    pub mime_type: String,
}

/// The persisted history shape consumed verbatim by clients.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntryView {
    pub entry_kind: String,
    pub from_status: Option<String>,
    pub to_status: String,
    pub from_area_id: Option<DbId>,
    pub to_area_id: Option<DbId>,
    pub changed_by_name: String,
    pub notes: Option<String>,
    pub changed_at: Timestamp,
    pub attachments: Vec<AttachmentMeta>,
}
