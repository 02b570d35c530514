//! Repository for the `attachments` table.

use chamado_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::attachment::{Attachment, CreateAttachment};

const COLUMNS: &str = "id, ticket_id, history_entry_id, original_name, mime_type, \
    size_bytes, storage_key, uploaded_by, created_at";

pub struct AttachmentRepo;

impl AttachmentRepo {
    /// Insert an uploaded attachment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAttachment,
    ) -> Result<Attachment, sqlx::Error> {
        let query = format!(
            "INSERT INTO attachments
                (ticket_id, original_name, mime_type, size_bytes, storage_key, uploaded_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attachment>(&query)
            .bind(input.ticket_id)
            .bind(&input.original_name)
            .bind(&input.mime_type)
            .bind(input.size_bytes)
            .bind(&input.storage_key)
            .bind(input.uploaded_by)
            .fetch_one(pool)
            .await
    }

    /// List all attachments of a ticket, oldest first.
    pub async fn list_for_ticket(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<Attachment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM attachments WHERE ticket_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Attachment>(&query)
            .bind(ticket_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve a set of attachment ids belonging to one ticket.
    ///
    /// The engine compares the returned length against the requested ids to
    /// detect references to missing or foreign attachments.
    pub async fn find_for_ticket_by_ids(
        conn: &mut PgConnection,
        ticket_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Attachment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attachments
             WHERE ticket_id = $1 AND id = ANY($2)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Attachment>(&query)
            .bind(ticket_id)
            .bind(ids)
            .fetch_all(conn)
            .await
    }

    /// Bind not-yet-bound attachments to a history entry as its evidence.
    /// Returns the number of rows bound.
    pub async fn bind_to_entry(
        conn: &mut PgConnection,
        history_entry_id: DbId,
        ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE attachments SET history_entry_id = $1
             WHERE id = ANY($2) AND history_entry_id IS NULL",
        )
        .bind(history_entry_id)
        .bind(ids)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete an attachment of a ticket. Returns `false` if no row matched.
    pub async fn delete(
        pool: &PgPool,
        ticket_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attachments WHERE id = $1 AND ticket_id = $2")
            .bind(id)
            .bind(ticket_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
