use axum::routing::{get, put};
use axum::Router;

use crate::handlers::board;
use crate::state::AppState;

/// Board routes, nested under `/board`.
///
/// ```text
/// GET /             get_board
/// GET /columns      list_columns
/// PUT /columns      replace_columns
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(board::get_board))
        .route(
            "/columns",
            get(board::list_columns).put(board::replace_columns),
        )
}
