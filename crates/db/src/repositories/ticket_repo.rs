//! Repository for the `tickets` table.

use chamado_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::ticket::{CreateTicket, Ticket, TicketBoardRow};

/// Column list for tickets queries.
const COLUMNS: &str = "id, origin_channel, origin_contact, origin_reference, client_id, \
    product_id, category_id, subcategory, impact, description, area_id, status, version, \
    sla_frozen_status, sla_frozen_hours, created_at, updated_at";

/// Provides CRUD and conditional-update operations for tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Insert a new ticket in status `novo`, returning the created row.
    ///
    /// Takes a connection so the caller can bundle the insert with the
    /// initial history entry in one transaction.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateTicket,
    ) -> Result<Ticket, sqlx::Error> {
        let query = format!(
            "INSERT INTO tickets
                (origin_channel, origin_contact, origin_reference, client_id, product_id,
                 category_id, subcategory, impact, description, area_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(&input.origin_channel)
            .bind(&input.origin_contact)
            .bind(&input.origin_reference)
            .bind(input.client_id)
            .bind(input.product_id)
            .bind(input.category_id)
            .bind(&input.subcategory)
            .bind(&input.impact)
            .bind(&input.description)
            .bind(input.area_id)
            .fetch_one(conn)
            .await
    }

    /// Find a ticket by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tickets, optionally filtered by area and/or status, newest first.
    pub async fn list(
        pool: &PgPool,
        area_id: Option<DbId>,
        status: Option<&str>,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE ($1::bigint IS NULL OR area_id = $1)
               AND ($2::text IS NULL OR status = $2)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(area_id)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Board rows: ticket status plus SLA inputs and client VIP flag,
    /// optionally restricted to one area.
    pub async fn list_board_rows(
        pool: &PgPool,
        area_id: Option<DbId>,
    ) -> Result<Vec<TicketBoardRow>, sqlx::Error> {
        sqlx::query_as::<_, TicketBoardRow>(
            "SELECT t.id, t.status, t.impact, t.client_id, t.product_id,
                    c.vip AS client_vip, t.sla_frozen_status, t.created_at
             FROM tickets t
             JOIN clients c ON c.id = t.client_id
             WHERE ($1::bigint IS NULL OR t.area_id = $1)
             ORDER BY t.created_at ASC",
        )
        .bind(area_id)
        .fetch_all(pool)
        .await
    }

    /// Conditionally set a ticket's status, keyed on the version the caller
    /// loaded. Returns `None` when the version is stale (a concurrent writer
    /// won), which the engine reports as `Conflict`.
    pub async fn update_status(
        conn: &mut PgConnection,
        id: DbId,
        new_status: &str,
        expected_version: i32,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets
             SET status = $2, version = version + 1, updated_at = now()
             WHERE id = $1 AND version = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(new_status)
            .bind(expected_version)
            .fetch_optional(conn)
            .await
    }

    /// Conditionally move a ticket to another area, keyed on the loaded
    /// version. The status axis is untouched.
    pub async fn update_area(
        conn: &mut PgConnection,
        id: DbId,
        new_area_id: DbId,
        expected_version: i32,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets
             SET area_id = $2, version = version + 1, updated_at = now()
             WHERE id = $1 AND version = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(new_area_id)
            .bind(expected_version)
            .fetch_optional(conn)
            .await
    }

    /// Persist the SLA snapshot computed when the ticket entered the
    /// terminal status. Called inside the same transaction as the closing
    /// status update.
    pub async fn freeze_sla(
        conn: &mut PgConnection,
        id: DbId,
        tier: &str,
        hours_remaining: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE tickets SET sla_frozen_status = $2, sla_frozen_hours = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(tier)
        .bind(hours_remaining)
        .execute(conn)
        .await?;
        Ok(())
    }
}
