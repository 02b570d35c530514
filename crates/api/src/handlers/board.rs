//! Board (queue) handlers.
//!
//! Projects the ticket collection into status columns with per-column
//! aggregates, and manages the organization's custom column set.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chamado_core::board::{self, BoardColumnSpec, BoardTicket};
use chamado_core::impact::Impact;
use chamado_core::sla::{self, CandidatePolicy, PolicyHours, SlaTier};
use chamado_core::status::TicketStatus;
use chamado_core::types::DbId;
use chamado_db::models::board_column::CreateBoardColumn;
use chamado_db::models::sla_policy::{SCOPE_CLIENT, SCOPE_PRODUCT};
use chamado_db::models::ticket::TicketBoardRow;
use chamado_db::repositories::{BoardColumnRepo, SlaPolicyRepo, TicketRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the board view.
#[derive(Debug, Deserialize)]
pub struct BoardParams {
    /// Restrict to one area; absent means the all-areas overview.
    pub area_id: Option<DbId>,
}

/// GET /board?area_id=
///
/// Partition tickets into the organization's column set (custom columns if
/// configured, the default six-status set otherwise) with count, SLA-at-risk,
/// and VIP aggregates per column.
pub async fn get_board(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<BoardParams>,
) -> AppResult<impl IntoResponse> {
    let columns = column_specs(&state).await?;
    let rows = TicketRepo::list_board_rows(&state.pool, params.area_id).await?;

    // One policy pass for the whole board instead of a query per ticket.
    let policies = SlaPolicyRepo::list_all(&state.pool).await?;
    let mut client_policies: HashMap<DbId, CandidatePolicy> = HashMap::new();
    let mut product_policies: HashMap<DbId, CandidatePolicy> = HashMap::new();
    for policy in &policies {
        let target = match policy.entity_type.as_str() {
            SCOPE_CLIENT => &mut client_policies,
            SCOPE_PRODUCT => &mut product_policies,
            _ => continue,
        };
        // list_all is ordered by priority descending; first entry wins.
        target.entry(policy.entity_id).or_insert_with(|| policy.as_candidate());
    }

    let now = chrono::Utc::now();
    let tickets: Vec<BoardTicket> = rows
        .iter()
        .map(|row| board_ticket(row, &client_policies, &product_policies, now))
        .collect::<Result<_, _>>()?;

    let projection = board::project(&columns, &tickets);
    Ok(Json(DataResponse { data: projection }))
}

/// GET /board/columns
///
/// The organization's custom column set; empty means defaults apply.
pub async fn list_columns(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let columns = BoardColumnRepo::list_ordered(&state.pool).await?;
    Ok(Json(DataResponse { data: columns }))
}

/// PUT /board/columns
///
/// Replace the custom column set. Every column must map onto one of the six
/// status keys; columns never alter the transition graph.
pub async fn replace_columns(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<Vec<CreateBoardColumn>>,
) -> AppResult<impl IntoResponse> {
    for column in &input {
        TicketStatus::parse(&column.status_key)?;
        if column.label.trim().is_empty() {
            return Err(AppError::BadRequest("Column label is required".to_string()));
        }
    }

    let columns = BoardColumnRepo::replace_all(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        column_count = columns.len(),
        "Board columns replaced"
    );
    Ok(Json(DataResponse { data: columns }))
}

/// The active column specs: custom if configured, defaults otherwise.
async fn column_specs(state: &AppState) -> AppResult<Vec<BoardColumnSpec>> {
    let custom = BoardColumnRepo::list_ordered(&state.pool).await?;
    if custom.is_empty() {
        return Ok(board::default_columns());
    }
    custom
        .into_iter()
        .map(|column| {
            Ok(BoardColumnSpec {
                key: TicketStatus::parse(&column.status_key)?,
                label: column.label,
                color: column.color,
            })
        })
        .collect()
}

/// Compute one board ticket from its row, resolving the SLA tier the same
/// way the detail view does: frozen snapshot for terminal tickets, live
/// computation otherwise.
fn board_ticket(
    row: &TicketBoardRow,
    client_policies: &HashMap<DbId, CandidatePolicy>,
    product_policies: &HashMap<DbId, CandidatePolicy>,
    now: chamado_core::types::Timestamp,
) -> AppResult<BoardTicket> {
    let status = TicketStatus::parse(&row.status)
        .map_err(|_| AppError::Internal(format!("Ticket {} has corrupt status", row.id)))?;

    let sla_tier = if status.is_terminal() {
        match &row.sla_frozen_status {
            Some(frozen) => SlaTier::parse(frozen).map_err(|_| {
                AppError::Internal(format!("Ticket {} has corrupt frozen SLA tier", row.id))
            })?,
            None => SlaTier::Ok,
        }
    } else {
        let hours: PolicyHours = sla::resolve_policy(
            client_policies.get(&row.client_id).copied(),
            row.product_id.and_then(|id| product_policies.get(&id).copied()),
        );
        let impact = Impact::parse(&row.impact)
            .map_err(|_| AppError::Internal(format!("Ticket {} has corrupt impact", row.id)))?;
        sla::compute(row.created_at, impact, hours, now).sla_status
    };

    Ok(BoardTicket {
        id: row.id,
        status,
        sla_tier,
        vip: row.client_vip,
    })
}
