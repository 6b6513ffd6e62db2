mod handlers;

use axum::{routing::get, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:session_id/students", get(handlers::list_examined_students))
        .route("/:session_id/students/:student_id", get(handlers::student_breakdown))
        .route("/:session_id/pending", get(handlers::pending_students))
}
