pub mod auth;
pub mod board;
pub mod custom_fields;
pub mod health;
pub mod sla_policies;
pub mod tickets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                 login (public)
///
/// /tickets                                    create, list
/// /tickets/{id}                               detail with history
/// /tickets/{id}/status                        change status (PATCH)
/// /tickets/{id}/transfer                      transfer area (PATCH)
/// /tickets/{id}/comments                      add comment (POST)
/// /tickets/{id}/attachments                   upload batch (POST)
/// /tickets/{id}/attachments/{attachment_id}   delete
///
/// /custom-fields                              list by scope, create
/// /custom-fields/{id}                         update, deactivate
///
/// /board                                      queue projection
/// /board/columns                              custom column set (GET, PUT)
///
/// /sla-policies                               list, create
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/tickets", tickets::router())
        .nest("/custom-fields", custom_fields::router())
        .nest("/board", board::router())
        .nest("/sla-policies", sla_policies::router())
}
