use axum::routing::{get, put};
use axum::Router;

use crate::handlers::custom_fields;
use crate::state::AppState;

/// Custom field directory routes, nested under `/custom-fields`.
///
/// ```text
/// GET    /        list_for_scope
/// POST   /        create
/// PUT    /{id}    update
/// DELETE /{id}    deactivate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(custom_fields::list_for_scope).post(custom_fields::create),
        )
        .route(
            "/{id}",
            put(custom_fields::update).delete(custom_fields::deactivate),
        )
}
