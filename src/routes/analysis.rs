use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use crate::constants::ERR_INVALID_ANALYSIS_ID;
use crate::error::{AppError, Result};
use crate::history::{HistoryQuery, SaveAnalysisRequest};
use crate::middleware::AuthenticatedUser;
use crate::models::{AnalysisRecord, DeletedAnalysis, HistoryPage, SavedAnalysis};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SaveAnalysisResponse {
    pub message: &'static str,
    pub analysis: SavedAnalysis,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: AnalysisRecord,
}

#[derive(Debug, Serialize)]
pub struct DeleteAnalysisResponse {
    pub message: &'static str,
    pub analysis: DeletedAnalysis,
}

fn analysis_id(path: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    match path {
        Ok(Path(id)) if id > 0 => Ok(id),
        _ => Err(AppError::validation(ERR_INVALID_ANALYSIS_ID)),
    }
}

/// Store a completed analysis for the signed-in user
///
/// POST /api/analysis/save → 201 `{message, analysis: {id, document_name, created_at}}`
pub async fn save_analysis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: std::result::Result<Json<SaveAnalysisRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SaveAnalysisResponse>)> {
    let Json(request) = payload?;
    let analysis = state.history.save(user.user_id, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(SaveAnalysisResponse {
            message: "Analysis saved successfully",
            analysis,
        }),
    ))
}

/// GET /api/analysis/history?page=&limit=
pub async fn list_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    query: std::result::Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<HistoryPage>> {
    let Query(query) = query?;
    let page = state.history.list(user.user_id, query).await?;
    Ok(Json(page))
}

/// GET /api/analysis/history/:id
pub async fn get_analysis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<AnalysisResponse>> {
    let id = analysis_id(path)?;
    let analysis = state.history.get(user.user_id, id).await?;
    Ok(Json(AnalysisResponse { analysis }))
}

/// DELETE /api/analysis/history/:id
pub async fn delete_analysis(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    path: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteAnalysisResponse>> {
    let id = analysis_id(path)?;
    let analysis = state.history.delete(user.user_id, id).await?;

    Ok(Json(DeleteAnalysisResponse {
        message: "Analysis deleted successfully",
        analysis,
    }))
}
