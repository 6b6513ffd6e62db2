use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use validator::Validate;

use super::queries::{ExportQuery, ListResultsQuery, PivotQuery};
use crate::api::errors::ApiError;
use crate::api::guards::ExamClient;
use crate::backend::ExamBackend;
use crate::core::{metrics, state::AppState};
use crate::schemas::results::{ExamResultResponse, PivotResponse};
use crate::services::enrichment::{enrich, EnrichedResult};
use crate::services::export::{write_xlsx, SheetLayout};
use crate::services::pivot::{build_pivot, restrict_to_roster, student_bounds};
use crate::services::sorting::sort_results;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub(super) async fn list_results(
    ExamClient(backend): ExamClient,
    Query(params): Query<ListResultsQuery>,
) -> Result<Json<Vec<ExamResultResponse>>, ApiError> {
    params.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let raw = backend
        .exam_results(params.session_id)
        .await
        .map_err(|e| ApiError::backend(e, "Failed to load exam results"))?;
    let mut rows = enrich(raw, backend).await?;

    if let Some(column) = params.sort {
        sort_results(&mut rows, column, params.direction);
    }

    Ok(Json(rows.into_iter().map(ExamResultResponse::from).collect()))
}

pub(super) async fn pivot(
    ExamClient(backend): ExamClient,
    Query(params): Query<PivotQuery>,
) -> Result<Json<PivotResponse>, ApiError> {
    params.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let rows = load_scoped_rows(backend, params.session_id).await?;
    let bounds = student_bounds(&rows);
    let pivot = build_pivot(&rows, params.range(bounds));

    Ok(Json(PivotResponse::new(pivot, bounds)))
}

pub(super) async fn export(
    State(state): State<AppState>,
    ExamClient(backend): ExamClient,
    Query(params): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    params.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let filename = params
        .filename
        .clone()
        .unwrap_or_else(|| state.settings().export().default_filename.clone());
    if !filename.ends_with(".xlsx") {
        return Err(ApiError::BadRequest("filename must end with .xlsx".to_string()));
    }

    let rows = load_scoped_rows(backend, params.session_id).await?;
    let pivot = build_pivot(&rows, params.range(student_bounds(&rows)));
    let layout = SheetLayout::from_pivot(&pivot);
    let bytes = write_xlsx(&layout).map_err(|e| ApiError::internal(e, "Failed to build export"))?;
    metrics::record_export();

    tracing::info!(
        students = layout.rows.len(),
        columns = layout.column_count(),
        bytes = bytes.len(),
        "Results exported"
    );

    let mut response = (StatusCode::OK, bytes).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE));
    let disposition = HeaderValue::from_str(&content_disposition(&filename))
        .map_err(|e| ApiError::internal(e, "Failed to encode export filename"))?;
    response.headers_mut().insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

pub(super) async fn delete_result(
    ExamClient(backend): ExamClient,
    Path(result_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    backend
        .delete_exam_result(result_id)
        .await
        .map_err(|e| ApiError::backend(e, "Failed to delete exam result"))?;

    tracing::info!(result_id, "Exam result deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Enriched rows, limited to the session roster when a session is given.
async fn load_scoped_rows(
    backend: Arc<dyn ExamBackend>,
    session_id: Option<i64>,
) -> Result<Vec<EnrichedResult>, ApiError> {
    let Some(session_id) = session_id else {
        let raw = backend
            .exam_results(None)
            .await
            .map_err(|e| ApiError::backend(e, "Failed to load exam results"))?;
        return Ok(enrich(raw, backend).await?);
    };

    let (session, raw) =
        tokio::try_join!(backend.session(session_id), backend.exam_results(Some(session_id)))
            .map_err(|e| ApiError::backend(e, "Failed to load session results"))?;
    let rows = enrich(raw, backend).await?;

    Ok(restrict_to_roster(rows, &session.student_numbers))
}

/// RFC 6266 header with a UTF-8 encoded name; the default name is Cyrillic.
fn content_disposition(filename: &str) -> String {
    format!("attachment; filename*=UTF-8''{}", urlencoding::encode(filename))
}
