//! SLA policy handlers.
//!
//! Policies attach hour windows to a client or product; the resolver picks
//! the highest-priority applicable one, falling back to system defaults.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chamado_core::error::CoreError;
use chamado_db::models::sla_policy::{CreateSlaPolicy, SCOPE_CLIENT, SCOPE_PRODUCT};
use chamado_db::repositories::SlaPolicyRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /sla-policies
///
/// List all policies, highest priority first.
pub async fn list(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let policies = SlaPolicyRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: policies }))
}

/// POST /sla-policies
///
/// Create a policy for a client or product.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSlaPolicy>,
) -> AppResult<impl IntoResponse> {
    if input.entity_type != SCOPE_CLIENT && input.entity_type != SCOPE_PRODUCT {
        return Err(CoreError::Validation(format!(
            "Invalid entity type '{}'. Must be one of: client, product",
            input.entity_type
        ))
        .into());
    }
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Policy name is required".to_string()));
    }
    if input.hours_baixo <= 0 || input.hours_medio <= 0 || input.hours_alto <= 0 {
        return Err(AppError::BadRequest(
            "Policy hour windows must be positive".to_string(),
        ));
    }

    let policy = SlaPolicyRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        policy_id = policy.id,
        entity_type = %policy.entity_type,
        entity_id = policy.entity_id,
        "SLA policy created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: policy })))
}
