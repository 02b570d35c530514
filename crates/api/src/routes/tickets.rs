//! Route definitions for the ticket workflow.

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::{attachments, tickets};
use crate::state::AppState;

/// Request body cap for multipart uploads: general attachments go up to
/// 10MB, so allow headroom for multipart framing.
const UPLOAD_BODY_LIMIT: usize = 12 * 1024 * 1024;

/// Ticket routes, nested under `/tickets`.
///
/// ```text
/// POST   /                                   create_ticket
/// GET    /                                   list_tickets
/// GET    /{id}                               get_ticket
/// PATCH  /{id}/status                        change_status
/// PATCH  /{id}/transfer                      transfer_area
/// POST   /{id}/comments                      add_comment
/// POST   /{id}/attachments                   upload
/// DELETE /{id}/attachments/{attachment_id}   delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(tickets::create_ticket).get(tickets::list_tickets))
        .route("/{id}", get(tickets::get_ticket))
        .route("/{id}/status", patch(tickets::change_status))
        .route("/{id}/transfer", patch(tickets::transfer_area))
        .route("/{id}/comments", post(tickets::add_comment))
        .route(
            "/{id}/attachments",
            post(attachments::upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/{id}/attachments/{attachment_id}",
            delete(attachments::delete),
        )
}
