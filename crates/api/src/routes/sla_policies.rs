use axum::routing::get;
use axum::Router;

use crate::handlers::sla_policies;
use crate::state::AppState;

/// SLA policy routes, nested under `/sla-policies`.
///
/// ```text
/// GET  /    list
/// POST /    create
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(sla_policies::list).post(sla_policies::create))
}
