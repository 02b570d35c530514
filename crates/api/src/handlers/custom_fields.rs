//! Custom field directory handlers.
//!
//! The GET endpoint is the directory interface the dynamic field validator
//! depends on; the rest is definition administration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chamado_core::custom_fields::{self, FieldType};
use chamado_core::error::CoreError;
use chamado_core::types::DbId;
use chamado_db::models::custom_field::{
    CreateCustomFieldDefinition, UpdateCustomFieldDefinition, SCOPE_AREA, SCOPE_CATEGORY,
};
use chamado_db::repositories::CustomFieldRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for listing definitions by scope.
#[derive(Debug, Deserialize)]
pub struct ScopeParams {
    pub entity_type: String,
    pub entity_id: DbId,
    pub active: Option<bool>,
}

fn validate_scope(entity_type: &str) -> Result<(), CoreError> {
    if entity_type == SCOPE_CATEGORY || entity_type == SCOPE_AREA {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid entity type '{entity_type}'. Must be one of: category, area"
        )))
    }
}

/// GET /custom-fields?entity_type=&entity_id=&active=
///
/// List field definitions for one scope.
pub async fn list_for_scope(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ScopeParams>,
) -> AppResult<impl IntoResponse> {
    validate_scope(&params.entity_type)?;
    let definitions = CustomFieldRepo::list_for_scope(
        &state.pool,
        &params.entity_type,
        params.entity_id,
        params.active.unwrap_or(true),
    )
    .await?;
    Ok(Json(DataResponse { data: definitions }))
}

/// POST /custom-fields
///
/// Create a field definition. `select` fields must declare options.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCustomFieldDefinition>,
) -> AppResult<impl IntoResponse> {
    validate_scope(&input.entity_type)?;
    if input.label.trim().is_empty() {
        return Err(AppError::BadRequest("Field label is required".to_string()));
    }
    let field_type = FieldType::parse(&input.field_type)?;
    let options = input.options.clone().unwrap_or_default();
    custom_fields::validate_definition(field_type, &options)?;

    let definition = CustomFieldRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        field_id = definition.id,
        entity_type = %definition.entity_type,
        entity_id = definition.entity_id,
        "Custom field created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: definition })))
}

/// PUT /custom-fields/{id}
///
/// Update a definition. The declared type is immutable; the select-options
/// invariant is re-checked against the resulting row.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCustomFieldDefinition>,
) -> AppResult<impl IntoResponse> {
    let existing = CustomFieldRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "CustomFieldDefinition",
            id,
        })?;

    let field_type = FieldType::parse(&existing.field_type)?;
    let options = input
        .options
        .clone()
        .unwrap_or_else(|| existing.option_list());
    custom_fields::validate_definition(field_type, &options)?;

    let definition = CustomFieldRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "CustomFieldDefinition",
            id,
        })?;

    tracing::info!(user_id = auth.user_id, field_id = id, "Custom field updated");

    Ok(Json(DataResponse { data: definition }))
}

/// DELETE /custom-fields/{id}
///
/// Deactivate a definition. Captured ticket values are kept.
pub async fn deactivate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deactivated = CustomFieldRepo::deactivate(&state.pool, id).await?;
    if !deactivated {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "CustomFieldDefinition",
            id,
        }));
    }

    tracing::info!(user_id = auth.user_id, field_id = id, "Custom field deactivated");
    Ok(StatusCode::NO_CONTENT)
}
