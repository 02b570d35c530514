//! Attachment upload and deletion.
//!
//! Upload is a distinct operation from the workflow mutations: the engine
//! accepts pre-uploaded attachment ids only, so upload latency or failure
//! never bleeds into transition atomicity. Each file in a batch is screened
//! individually; one rejected file does not sink the rest.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chamado_core::error::CoreError;
use chamado_core::evidence::{self, AttachmentKind};
use chamado_core::types::DbId;
use chamado_db::models::attachment::{Attachment, CreateAttachment};
use chamado_db::repositories::{AttachmentRepo, TicketRepo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the upload endpoint.
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// `evidence` (default) or `general`.
    pub kind: Option<String>,
}

/// One file the screening rejected, with its reason code.
#[derive(Debug, Serialize)]
pub struct RejectedFile {
    pub original_name: String,
    pub reason: &'static str,
    pub message: String,
}

/// Per-file outcome of an upload batch.
#[derive(Debug, Serialize)]
pub struct UploadOutcome {
    pub accepted: Vec<Attachment>,
    pub rejected: Vec<RejectedFile>,
}

/// POST /tickets/{id}/attachments?kind=
///
/// Multipart upload. Files arrive in `file` fields; each one is screened
/// against the rule set for `kind` and stored under a generated key.
pub async fn upload(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(ticket_id): Path<DbId>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let kind = match params.kind.as_deref() {
        Some(raw) => AttachmentKind::parse(raw)?,
        None => AttachmentKind::Evidence,
    };

    if TicketRepo::find_by_id(&state.pool, ticket_id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Ticket",
            id: ticket_id,
        }));
    }

    let mut outcome = UploadOutcome {
        accepted: Vec::new(),
        rejected: Vec::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue; // ignore unknown fields
        }
        let original_name = field.file_name().unwrap_or("arquivo").to_string();
        let mime_type = field.content_type().unwrap_or("application/octet-stream").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let size_bytes = data.len() as i64;

        if let Err(violation) = evidence::check_file(kind, &mime_type, size_bytes) {
            outcome.rejected.push(RejectedFile {
                original_name,
                reason: violation.code(),
                message: violation.to_string(),
            });
            continue;
        }

        let storage_key = Uuid::new_v4().to_string();
        store_file(&state.config.attachment_dir, &storage_key, &data).await?;

        let attachment = AttachmentRepo::create(
            &state.pool,
            &CreateAttachment {
                ticket_id,
                original_name,
                mime_type,
                size_bytes,
                storage_key,
                uploaded_by: auth.user_id,
            },
        )
        .await?;

        tracing::info!(
            user_id = auth.user_id,
            ticket_id,
            attachment_id = attachment.id,
            size_bytes,
            "Attachment uploaded"
        );
        outcome.accepted.push(attachment);
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: outcome })))
}

/// DELETE /tickets/{id}/attachments/{attachment_id}
///
/// Attachments are deletable independently of the workflow.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((ticket_id, attachment_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let deleted = AttachmentRepo::delete(&state.pool, ticket_id, attachment_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Attachment",
            id: attachment_id,
        }));
    }

    tracing::info!(
        user_id = auth.user_id,
        ticket_id,
        attachment_id,
        "Attachment deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Write the uploaded bytes under the configured attachment directory.
async fn store_file(dir: &str, storage_key: &str, data: &[u8]) -> AppResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create attachment dir: {e}")))?;
    let path = std::path::Path::new(dir).join(storage_key);
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to store attachment: {e}")))?;
    Ok(())
}
