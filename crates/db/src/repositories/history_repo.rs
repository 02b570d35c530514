//! Repository for the `ticket_history` table.
//!
//! Append and read only. No update or delete method exists here; the audit
//! trail is immutable once written.

use chamado_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::history::{
    CreateHistoryEntry, HistoryAttachmentRow, HistoryEntry, HistoryEntryRow,
};

const COLUMNS: &str = "id, ticket_id, entry_kind, from_status, to_status, from_area_id, \
    to_area_id, changed_by, notes, created_at";

pub struct HistoryRepo;

impl HistoryRepo {
    /// Append a history entry, returning the created row.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &CreateHistoryEntry,
    ) -> Result<HistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO ticket_history
                (ticket_id, entry_kind, from_status, to_status, from_area_id, to_area_id,
                 changed_by, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(input.ticket_id)
            .bind(input.entry_kind)
            .bind(&input.from_status)
            .bind(&input.to_status)
            .bind(input.from_area_id)
            .bind(input.to_area_id)
            .bind(input.changed_by)
            .bind(&input.notes)
            .fetch_one(conn)
            .await
    }

    /// List a ticket's history in creation order, joined with the acting
    /// user's display name.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<HistoryEntryRow>, sqlx::Error> {
        sqlx::query_as::<_, HistoryEntryRow>(
            "SELECT h.id, h.entry_kind, h.from_status, h.to_status, h.from_area_id,
                    h.to_area_id, u.display_name AS changed_by_name, h.notes, h.created_at
             FROM ticket_history h
             JOIN users u ON u.id = h.changed_by
             WHERE h.ticket_id = $1
             ORDER BY h.created_at ASC, h.id ASC",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
    }

    /// Attachment metadata for every entry of a ticket, for nesting under
    /// the history view.
    pub async fn list_attachments_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<HistoryAttachmentRow>, sqlx::Error> {
        sqlx::query_as::<_, HistoryAttachmentRow>(
            "SELECT a.history_entry_id, a.id, a.original_name, a.mime_type
             FROM attachments a
             WHERE a.ticket_id = $1 AND a.history_entry_id IS NOT NULL
             ORDER BY a.id ASC",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
    }

    /// Count entries for a ticket.
    pub async fn count_for_ticket(pool: &PgPool, ticket_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ticket_history WHERE ticket_id = $1")
                .bind(ticket_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
