//! Handlers for the `/tickets` resource: creation, reads, and the workflow
//! operations (status change, transfer, comments).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chamado_core::error::CoreError;
use chamado_core::status::TicketStatus;
use chamado_core::types::DbId;
use chamado_db::repositories::TicketRepo;
use serde::Deserialize;

use crate::engine::views;
use crate::engine::workflow::{
    self, AddCommentRequest, ChangeStatusRequest, CreateTicketRequest, TransferAreaRequest,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for listing tickets.
#[derive(Debug, Deserialize)]
pub struct ListTicketParams {
    pub area_id: Option<DbId>,
    pub status: Option<String>,
}

/// POST /tickets
///
/// Create a ticket. The initial status is always `novo`; category-scoped
/// required custom fields must be satisfied.
pub async fn create_ticket(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTicketRequest>,
) -> AppResult<impl IntoResponse> {
    let ticket = workflow::create_ticket(&state, &auth, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: ticket })))
}

/// GET /tickets?area_id=&status=
///
/// List tickets with SLA fields attached.
pub async fn list_tickets(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListTicketParams>,
) -> AppResult<impl IntoResponse> {
    let status = match &params.status {
        Some(raw) => Some(TicketStatus::parse(raw)?),
        None => None,
    };
    let tickets =
        TicketRepo::list(&state.pool, params.area_id, status.map(|s| s.as_str())).await?;

    let mut data = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        data.push(views::with_sla(&state.pool, ticket).await?);
    }
    Ok(Json(DataResponse { data }))
}

/// GET /tickets/{id}
///
/// A ticket with its full ordered history (nested attachment metadata per
/// entry) and captured custom field values.
pub async fn get_ticket(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let ticket = TicketRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id,
        }))?;
    let detail = views::detail_view(&state.pool, ticket).await?;
    Ok(Json(DataResponse { data: detail }))
}

/// PATCH /tickets/{id}/status
///
/// Drive the ticket along one edge of the transition graph. Gated by the
/// evidence rules; failures come back as structured `{error, kind}` bodies.
pub async fn change_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ChangeStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let ticket = workflow::change_status(&state, &auth, id, input).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// PATCH /tickets/{id}/transfer
///
/// Move the ticket into another area. Requires the same justification
/// minimum as a status change plus the target area's required fields.
pub async fn transfer_area(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<TransferAreaRequest>,
) -> AppResult<impl IntoResponse> {
    let ticket = workflow::transfer_area(&state, &auth, id, input).await?;
    Ok(Json(DataResponse { data: ticket }))
}

/// POST /tickets/{id}/comments
///
/// Append a free-form comment entry to the ticket's history.
pub async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<AddCommentRequest>,
) -> AppResult<impl IntoResponse> {
    workflow::add_comment(&state, &auth, id, input).await?;
    let history = views::history_view(&state.pool, id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: history })))
}
