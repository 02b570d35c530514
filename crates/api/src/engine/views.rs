//! Ticket representations returned by the workflow engine.
//!
//! SLA fields are recomputed on every read against the resolved policy;
//! terminal tickets report the snapshot frozen when they were closed instead
//! of tracking the current clock.

use chamado_core::impact::Impact;
use chamado_core::sla::{self, PolicyHours, SlaResult, SlaTier};
use chamado_core::status::TicketStatus;
use chamado_core::types::DbId;
use chamado_db::models::custom_field::CustomFieldValue;
use chamado_db::models::history::{AttachmentMeta, HistoryEntryView};
use chamado_db::models::sla_policy::{SCOPE_CLIENT, SCOPE_PRODUCT};
use chamado_db::models::ticket::Ticket;
use chamado_db::repositories::{CustomFieldRepo, HistoryRepo, SlaPolicyRepo};
use chamado_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// A ticket with its computed SLA fields, as returned by every workflow
/// operation and list endpoint.
#[derive(Debug, Serialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub sla_status: SlaTier,
    pub sla_hours_remaining: i64,
}

/// A ticket plus its full ordered history and captured custom field values.
#[derive(Debug, Serialize)]
pub struct TicketDetailView {
    #[serde(flatten)]
    pub ticket: TicketView,
    pub history: Vec<HistoryEntryView>,
    pub custom_field_values: Vec<CustomFieldValue>,
}

/// Resolve the policy window applicable to a client/product pair:
/// highest priority wins, system defaults when neither has a policy.
pub async fn resolve_policy_hours(
    pool: &DbPool,
    client_id: DbId,
    product_id: Option<DbId>,
) -> Result<PolicyHours, sqlx::Error> {
    let client_policy = SlaPolicyRepo::find_for_entity(pool, SCOPE_CLIENT, client_id)
        .await?
        .map(|p| p.as_candidate());
    let product_policy = match product_id {
        Some(id) => SlaPolicyRepo::find_for_entity(pool, SCOPE_PRODUCT, id)
            .await?
            .map(|p| p.as_candidate()),
        None => None,
    };
    Ok(sla::resolve_policy(client_policy, product_policy))
}

/// Compute the SLA fields for a ticket, preferring the frozen snapshot on
/// terminal tickets.
pub fn sla_for_ticket(ticket: &Ticket, hours: PolicyHours) -> AppResult<SlaResult> {
    let status = TicketStatus::parse(&ticket.status)
        .map_err(|_| AppError::Internal(format!("Ticket {} has corrupt status", ticket.id)))?;

    if status.is_terminal() {
        if let (Some(frozen_tier), Some(frozen_hours)) =
            (&ticket.sla_frozen_status, ticket.sla_frozen_hours)
        {
            let tier = SlaTier::parse(frozen_tier).map_err(|_| {
                AppError::Internal(format!("Ticket {} has corrupt frozen SLA tier", ticket.id))
            })?;
            return Ok(SlaResult {
                sla_status: tier,
                sla_hours_remaining: frozen_hours,
            });
        }
    }

    let impact = Impact::parse(&ticket.impact)
        .map_err(|_| AppError::Internal(format!("Ticket {} has corrupt impact", ticket.id)))?;
    Ok(sla::compute(
        ticket.created_at,
        impact,
        hours,
        chrono::Utc::now(),
    ))
}

/// Attach SLA fields to a ticket row.
pub async fn with_sla(pool: &DbPool, ticket: Ticket) -> AppResult<TicketView> {
    let hours = resolve_policy_hours(pool, ticket.client_id, ticket.product_id).await?;
    let result = sla_for_ticket(&ticket, hours)?;
    Ok(TicketView {
        ticket,
        sla_status: result.sla_status,
        sla_hours_remaining: result.sla_hours_remaining,
    })
}

/// Load a ticket's ordered history with nested attachment metadata.
pub async fn history_view(pool: &DbPool, ticket_id: DbId) -> AppResult<Vec<HistoryEntryView>> {
    let entries = HistoryRepo::list_for_ticket(pool, ticket_id).await?;
    let attachment_rows = HistoryRepo::list_attachments_for_ticket(pool, ticket_id).await?;

    let views = entries
        .into_iter()
        .map(|entry| {
            let attachments = attachment_rows
                .iter()
                .filter(|a| a.history_entry_id == entry.id)
                .map(|a| AttachmentMeta {
                    id: a.id,
                    original_name: a.original_name.clone(),
                    mime_type: a.mime_type.clone(),
                })
                .collect();
            HistoryEntryView {
                entry_kind: entry.entry_kind,
                from_status: entry.from_status,
                to_status: entry.to_status,
                from_area_id: entry.from_area_id,
                to_area_id: entry.to_area_id,
                changed_by_name: entry.changed_by_name,
                notes: entry.notes,
                changed_at: entry.created_at,
                attachments,
            }
        })
        .collect();
    Ok(views)
}

/// Load the full detail view: ticket + SLA + history + custom field values.
pub async fn detail_view(pool: &DbPool, ticket: Ticket) -> AppResult<TicketDetailView> {
    let ticket_id = ticket.id;
    let view = with_sla(pool, ticket).await?;
    let history = history_view(pool, ticket_id).await?;
    let custom_field_values = CustomFieldRepo::list_values_for_ticket(pool, ticket_id).await?;
    Ok(TicketDetailView {
        ticket: view,
        history,
        custom_field_values,
    })
}
