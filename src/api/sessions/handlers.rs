use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::ExamClient;
use crate::backend::models::{ExamResult, Session};
use crate::backend::ExamBackend;
use crate::schemas::results::{
    PendingStudentsResponse, SessionStudentsResponse, StudentBreakdownResponse,
};
use crate::services::enrichment::enrich;
use crate::services::roster;

#[derive(Debug, Deserialize, Validate)]
pub(super) struct PendingQuery {
    #[serde(alias = "skillId")]
    #[validate(range(min = 1, message = "skill_id must be positive"))]
    skill_id: i64,
}

pub(super) async fn list_examined_students(
    ExamClient(backend): ExamClient,
    Path(session_id): Path<i64>,
) -> Result<Json<SessionStudentsResponse>, ApiError> {
    let (session, raw) = load_session(&backend, session_id).await?;
    let rows = enrich(raw, backend).await?;

    Ok(Json(SessionStudentsResponse {
        session_id,
        students: roster::students_with_results(&session.student_numbers, &rows),
    }))
}

pub(super) async fn student_breakdown(
    ExamClient(backend): ExamClient,
    Path((session_id, student_id)): Path<(i64, i64)>,
) -> Result<Json<StudentBreakdownResponse>, ApiError> {
    let (session, raw) = load_session(&backend, session_id).await?;
    if !session.student_numbers.contains(&student_id) {
        return Err(ApiError::NotFound(format!(
            "Student {student_id} is not enrolled in session {session_id}"
        )));
    }

    let raw: Vec<ExamResult> =
        raw.into_iter().filter(|result| result.student_id == student_id).collect();
    let rows = enrich(raw, backend).await?;

    Ok(Json(StudentBreakdownResponse::new(
        session_id,
        roster::student_breakdown(&rows, student_id),
    )))
}

pub(super) async fn pending_students(
    ExamClient(backend): ExamClient,
    Path(session_id): Path<i64>,
    Query(params): Query<PendingQuery>,
) -> Result<Json<PendingStudentsResponse>, ApiError> {
    params.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let (session, raw) = load_session(&backend, session_id).await?;
    let students = roster::pending_students(&session.student_numbers, &raw, params.skill_id);

    tracing::debug!(
        session_id,
        skill_id = params.skill_id,
        pending = students.len(),
        "Resolved pending students"
    );

    Ok(Json(PendingStudentsResponse { session_id, skill_id: params.skill_id, students }))
}

async fn load_session(
    backend: &Arc<dyn ExamBackend>,
    session_id: i64,
) -> Result<(Session, Vec<ExamResult>), ApiError> {
    tokio::try_join!(backend.session(session_id), backend.exam_results(Some(session_id)))
        .map_err(|e| ApiError::backend(e, "Failed to load session results"))
}
