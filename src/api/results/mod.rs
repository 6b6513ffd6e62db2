mod handlers;
mod queries;

use axum::{routing::delete, routing::get, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_results))
        .route("/pivot", get(handlers::pivot))
        .route("/export", get(handlers::export))
        .route("/:result_id", delete(handlers::delete_result))
}
