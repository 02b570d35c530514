use axum::routing::get;
use axum::Router;

use crate::handlers::health;
use crate::state::AppState;

/// Root-level health route (not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health::health_check))
}
