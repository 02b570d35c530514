//! The ticket state machine operations.
//!
//! Every operation loads the ticket, runs the applicable validators from
//! `chamado_core`, and applies the mutation plus its history entry inside a
//! single transaction. Concurrent writers on the same ticket are serialized
//! by a conditional update keyed on the row version: the loser gets
//! `Conflict` and must reload and retry, never a silent overwrite.

use std::collections::BTreeMap;

use chamado_core::custom_fields::{self, FieldSpec};
use chamado_core::error::CoreError;
use chamado_core::evidence::{self, FileCandidate};
use chamado_core::impact::{self, Impact};
use chamado_core::sla;
use chamado_core::status::TicketStatus;
use chamado_core::types::DbId;
use chamado_db::models::attachment::Attachment;
use chamado_db::models::custom_field::{SCOPE_AREA, SCOPE_CATEGORY};
use chamado_db::models::history::{
    CreateHistoryEntry, ENTRY_KIND_COMMENT, ENTRY_KIND_CREATION, ENTRY_KIND_STATUS_CHANGE,
    ENTRY_KIND_TRANSFER,
};
use chamado_db::models::ticket::{CreateTicket, Ticket};
use chamado_db::repositories::{
    AreaRepo, AttachmentRepo, CategoryRepo, ClientRepo, CustomFieldRepo, HistoryRepo,
    ProductRepo, TicketRepo,
};
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgConnection;
use validator::Validate;

use crate::engine::views::{self, TicketView};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Body for `POST /tickets`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, message = "origin_channel is required"))]
    pub origin_channel: String,
    #[validate(length(min = 1, message = "origin_contact is required"))]
    pub origin_contact: String,
    pub origin_reference: Option<String>,
    pub client_id: DbId,
    pub product_id: Option<DbId>,
    pub category_id: DbId,
    pub subcategory: Option<String>,
    pub impact: String,
    pub description: String,
    pub area_id: DbId,
    #[serde(default)]
    pub custom_field_values: BTreeMap<String, Value>,
}

/// Body for `PATCH /tickets/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
    pub notes: String,
    #[serde(default)]
    pub attachment_ids: Vec<DbId>,
}

/// Body for `PATCH /tickets/{id}/transfer`.
#[derive(Debug, Deserialize)]
pub struct TransferAreaRequest {
    pub area_id: DbId,
    pub notes: String,
    #[serde(default)]
    pub attachment_ids: Vec<DbId>,
    #[serde(default)]
    pub custom_field_values: BTreeMap<String, Value>,
}

/// Body for `POST /tickets/{id}/comments`.
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Create a ticket in status `novo` with its initial history entry.
pub async fn create_ticket(
    state: &AppState,
    actor: &AuthUser,
    req: CreateTicketRequest,
) -> AppResult<TicketView> {
    req.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let impact = Impact::parse(&req.impact)?;
    impact::validate_description(impact, &req.description)?;

    validate_references(state, &req).await?;

    let specs =
        load_field_specs(&state.pool, SCOPE_CATEGORY, req.category_id).await?;
    let values = parse_value_keys(&req.custom_field_values)?;
    custom_fields::validate_values(&specs, &values)?;
    let storable = storable_values(&specs, &values);

    let input = CreateTicket {
        origin_channel: req.origin_channel,
        origin_contact: req.origin_contact,
        origin_reference: req.origin_reference,
        client_id: req.client_id,
        product_id: req.product_id,
        category_id: req.category_id,
        subcategory: req.subcategory,
        impact: impact.as_str().to_string(),
        description: req.description,
        area_id: req.area_id,
    };

    let mut tx = state.pool.begin().await?;
    let ticket = TicketRepo::create(&mut tx, &input).await?;
    HistoryRepo::insert(
        &mut tx,
        &CreateHistoryEntry {
            ticket_id: ticket.id,
            entry_kind: ENTRY_KIND_CREATION,
            from_status: None,
            to_status: ticket.status.clone(),
            from_area_id: None,
            to_area_id: Some(ticket.area_id),
            changed_by: actor.user_id,
            notes: None,
        },
    )
    .await?;
    CustomFieldRepo::upsert_values(&mut tx, ticket.id, &storable).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = actor.user_id,
        ticket_id = ticket.id,
        area_id = ticket.area_id,
        impact = %ticket.impact,
        "Ticket created"
    );

    views::with_sla(&state.pool, ticket).await
}

/// Move a ticket along one edge of the transition graph.
pub async fn change_status(
    state: &AppState,
    actor: &AuthUser,
    ticket_id: DbId,
    req: ChangeStatusRequest,
) -> AppResult<TicketView> {
    let ticket = load_ticket(state, ticket_id).await?;
    let current = stored_status(&ticket)?;

    if current.is_terminal() {
        return Err(CoreError::TicketClosed { ticket_id }.into());
    }

    let target = TicketStatus::parse(&req.status)?;
    if !current.can_transition(target) {
        return Err(CoreError::InvalidTransition {
            from: current,
            to: target,
        }
        .into());
    }

    // Resolved up front so the transaction below never waits on reads of
    // unrelated tables.
    let policy_hours = if target.is_terminal() {
        Some(views::resolve_policy_hours(&state.pool, ticket.client_id, ticket.product_id).await?)
    } else {
        None
    };

    let mut tx = state.pool.begin().await?;

    let attachments =
        resolve_evidence(&mut tx, ticket_id, &req.attachment_ids).await?;
    evidence::validate_transition_evidence(&req.notes, &candidates(&attachments))?;

    let mut updated =
        TicketRepo::update_status(&mut tx, ticket_id, target.as_str(), ticket.version)
            .await?
            .ok_or_else(|| stale_write(ticket_id))?;

    let entry = HistoryRepo::insert(
        &mut tx,
        &CreateHistoryEntry {
            ticket_id,
            entry_kind: ENTRY_KIND_STATUS_CHANGE,
            from_status: Some(current.as_str().to_string()),
            to_status: target.as_str().to_string(),
            from_area_id: None,
            to_area_id: None,
            changed_by: actor.user_id,
            notes: Some(req.notes),
        },
    )
    .await?;

    if !req.attachment_ids.is_empty() {
        AttachmentRepo::bind_to_entry(&mut tx, entry.id, &req.attachment_ids).await?;
    }

    // Entering the terminal status freezes the SLA tier at this instant so
    // closed tickets stop tracking the clock.
    if let Some(hours) = policy_hours {
        let impact = Impact::parse(&updated.impact)
            .map_err(|_| AppError::Internal(format!("Ticket {ticket_id} has corrupt impact")))?;
        let snapshot = sla::compute(updated.created_at, impact, hours, chrono::Utc::now());
        TicketRepo::freeze_sla(
            &mut tx,
            ticket_id,
            snapshot.sla_status.as_str(),
            snapshot.sla_hours_remaining,
        )
        .await?;
        updated.sla_frozen_status = Some(snapshot.sla_status.as_str().to_string());
        updated.sla_frozen_hours = Some(snapshot.sla_hours_remaining);
    }

    tx.commit().await?;

    tracing::info!(
        user_id = actor.user_id,
        ticket_id,
        from = %current,
        to = %target,
        "Ticket status changed"
    );

    views::with_sla(&state.pool, updated).await
}

/// Transfer a ticket into another area. The status axis is untouched.
pub async fn transfer_area(
    state: &AppState,
    actor: &AuthUser,
    ticket_id: DbId,
    req: TransferAreaRequest,
) -> AppResult<TicketView> {
    let ticket = load_ticket(state, ticket_id).await?;
    let current = stored_status(&ticket)?;

    if current.is_terminal() {
        return Err(CoreError::TicketClosed { ticket_id }.into());
    }

    // No-op transfers are rejected, not silently accepted.
    if req.area_id == ticket.area_id {
        return Err(CoreError::SameArea {
            area_id: req.area_id,
        }
        .into());
    }

    let area = AreaRepo::find_by_id(&state.pool, req.area_id)
        .await?
        .filter(|a| a.active)
        .ok_or(CoreError::NotFound {
            entity: "Area",
            id: req.area_id,
        })?;

    // The new area's fields only; field ids are scope-unique, so values from
    // the previous area are irrelevant here.
    let specs = load_field_specs(&state.pool, SCOPE_AREA, req.area_id).await?;
    let values = parse_value_keys(&req.custom_field_values)?;

    let mut tx = state.pool.begin().await?;

    let attachments =
        resolve_evidence(&mut tx, ticket_id, &req.attachment_ids).await?;
    evidence::validate_transition_evidence(&req.notes, &candidates(&attachments))?;

    custom_fields::validate_values(&specs, &values)?;
    let storable = storable_values(&specs, &values);

    let updated = TicketRepo::update_area(&mut tx, ticket_id, req.area_id, ticket.version)
        .await?
        .ok_or_else(|| stale_write(ticket_id))?;

    let entry = HistoryRepo::insert(
        &mut tx,
        &CreateHistoryEntry {
            ticket_id,
            entry_kind: ENTRY_KIND_TRANSFER,
            from_status: None,
            to_status: current.as_str().to_string(),
            from_area_id: Some(ticket.area_id),
            to_area_id: Some(req.area_id),
            changed_by: actor.user_id,
            notes: Some(req.notes),
        },
    )
    .await?;

    if !req.attachment_ids.is_empty() {
        AttachmentRepo::bind_to_entry(&mut tx, entry.id, &req.attachment_ids).await?;
    }
    CustomFieldRepo::upsert_values(&mut tx, ticket_id, &storable).await?;

    tx.commit().await?;

    tracing::info!(
        user_id = actor.user_id,
        ticket_id,
        from_area = ticket.area_id,
        to_area = req.area_id,
        area_name = %area.name,
        "Ticket transferred"
    );

    views::with_sla(&state.pool, updated).await
}

/// Append a free-form comment entry to a ticket's history.
///
/// Comments are not transitions: they carry no evidence-gate minimum, but
/// they must not be empty and terminal tickets stay immutable.
pub async fn add_comment(
    state: &AppState,
    actor: &AuthUser,
    ticket_id: DbId,
    req: AddCommentRequest,
) -> AppResult<()> {
    let ticket = load_ticket(state, ticket_id).await?;
    let current = stored_status(&ticket)?;

    if current.is_terminal() {
        return Err(CoreError::TicketClosed { ticket_id }.into());
    }

    let notes = req.notes.trim();
    if notes.is_empty() {
        return Err(CoreError::Validation("Comment must not be empty".to_string()).into());
    }

    let mut tx = state.pool.begin().await?;
    HistoryRepo::insert(
        &mut tx,
        &CreateHistoryEntry {
            ticket_id,
            entry_kind: ENTRY_KIND_COMMENT,
            from_status: None,
            to_status: current.as_str().to_string(),
            from_area_id: None,
            to_area_id: None,
            changed_by: actor.user_id,
            notes: Some(notes.to_string()),
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(user_id = actor.user_id, ticket_id, "Comment added");
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_ticket(state: &AppState, ticket_id: DbId) -> AppResult<Ticket> {
    TicketRepo::find_by_id(&state.pool, ticket_id)
        .await?
        .ok_or_else(|| {
            CoreError::NotFound {
                entity: "Ticket",
                id: ticket_id,
            }
            .into()
        })
}

fn stored_status(ticket: &Ticket) -> AppResult<TicketStatus> {
    TicketStatus::parse(&ticket.status)
        .map_err(|_| AppError::Internal(format!("Ticket {} has corrupt status", ticket.id)))
}

fn stale_write(ticket_id: DbId) -> AppError {
    CoreError::Conflict(format!(
        "Ticket {ticket_id} was modified concurrently; reload and retry"
    ))
    .into()
}

/// Resolve referenced attachment ids to stored rows for the evidence gate.
///
/// Every id must exist, belong to the ticket, and not already be bound to an
/// earlier history entry.
async fn resolve_evidence(
    conn: &mut PgConnection,
    ticket_id: DbId,
    ids: &[DbId],
) -> AppResult<Vec<Attachment>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let attachments = AttachmentRepo::find_for_ticket_by_ids(conn, ticket_id, ids).await?;
    if attachments.len() != ids.len() {
        let found: Vec<DbId> = attachments.iter().map(|a| a.id).collect();
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !found.contains(id))
            .map(|id| id.to_string())
            .collect();
        return Err(CoreError::Validation(format!(
            "Unknown attachment ids for this ticket: {}",
            missing.join(", ")
        ))
        .into());
    }
    if let Some(bound) = attachments.iter().find(|a| a.history_entry_id.is_some()) {
        return Err(CoreError::Validation(format!(
            "Attachment {} is already bound to an earlier transition",
            bound.id
        ))
        .into());
    }
    Ok(attachments)
}

fn candidates(attachments: &[Attachment]) -> Vec<FileCandidate> {
    attachments
        .iter()
        .map(|a| FileCandidate {
            original_name: a.original_name.clone(),
            mime_type: a.mime_type.clone(),
            size_bytes: a.size_bytes,
        })
        .collect()
}

async fn load_field_specs(
    pool: &chamado_db::DbPool,
    entity_type: &str,
    entity_id: DbId,
) -> AppResult<Vec<FieldSpec>> {
    let definitions =
        CustomFieldRepo::list_for_scope(pool, entity_type, entity_id, true).await?;
    definitions
        .iter()
        .map(|d| d.to_spec().map_err(AppError::from))
        .collect()
}

/// Parse JSON object keys into field ids.
fn parse_value_keys(map: &BTreeMap<String, Value>) -> AppResult<BTreeMap<DbId, Value>> {
    let mut parsed = BTreeMap::new();
    for (key, value) in map {
        let id: DbId = key.parse().map_err(|_| {
            CoreError::Validation(format!("Custom field key '{key}' is not a field id"))
        })?;
        parsed.insert(id, value.clone());
    }
    Ok(parsed)
}

/// The non-empty coerced values to persist, keyed by known field ids.
fn storable_values(specs: &[FieldSpec], values: &BTreeMap<DbId, Value>) -> Vec<(DbId, String)> {
    specs
        .iter()
        .filter_map(|spec| {
            values
                .get(&spec.id)
                .map(custom_fields::coerce_to_string)
                .filter(|v| !v.is_empty())
                .map(|v| (spec.id, v))
        })
        .collect()
}

/// Validate the lookup references of a creation request.
async fn validate_references(state: &AppState, req: &CreateTicketRequest) -> AppResult<()> {
    if ClientRepo::find_by_id(&state.pool, req.client_id).await?.is_none() {
        return Err(CoreError::Validation(format!("Unknown client id {}", req.client_id)).into());
    }
    if CategoryRepo::find_by_id(&state.pool, req.category_id)
        .await?
        .is_none()
    {
        return Err(
            CoreError::Validation(format!("Unknown category id {}", req.category_id)).into(),
        );
    }
    if let Some(product_id) = req.product_id {
        if ProductRepo::find_by_id(&state.pool, product_id).await?.is_none() {
            return Err(CoreError::Validation(format!("Unknown product id {product_id}")).into());
        }
    }
    let area = AreaRepo::find_by_id(&state.pool, req.area_id).await?;
    if !area.is_some_and(|a| a.active) {
        return Err(CoreError::Validation(format!(
            "Unknown or inactive area id {}",
            req.area_id
        ))
        .into());
    }
    Ok(())
}
