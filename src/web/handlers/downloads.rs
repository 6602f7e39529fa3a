use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json};
use uuid::Uuid;

use crate::app_error::AppError;
use crate::models::download::{
    cancel_download, clear_completed_downloads, list_downloads, pause_download, resume_download,
    retry_download, total_speed, DownloadStatus,
};
use crate::web::responses::{ClearedResponse, DownloadsResponse};
use crate::web::state::AppState;

pub async fn downloads_json(
    State(state): State<AppState>,
) -> Result<Json<DownloadsResponse>, AppError> {
    let downloads = list_downloads(&state.content).await;
    let downloading_count = downloads
        .iter()
        .filter(|item| item.status == DownloadStatus::Downloading)
        .count() as i64;
    let completed_count = downloads
        .iter()
        .filter(|item| item.status == DownloadStatus::Completed)
        .count() as i64;
    let total_speed = total_speed(&state.content).await;

    Ok(Json(DownloadsResponse {
        downloads,
        total_speed,
        downloading_count,
        completed_count,
    }))
}

pub async fn do_resume_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let item = resume_download(&state.content, id)
        .await
        .map_err(|err| AppError::InvalidFormData(err.to_string()))?;

    Ok(Json(item).into_response())
}

pub async fn do_pause_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let item = pause_download(&state.content, id)
        .await
        .map_err(|err| AppError::InvalidFormData(err.to_string()))?;

    Ok(Json(item).into_response())
}

pub async fn do_cancel_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    cancel_download(&state.content, id)
        .await
        .map_err(|_| AppError::NotFound("Download".to_string()))?;

    Ok(Json(serde_json::json!({ "cancelled": true })).into_response())
}

pub async fn do_retry_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let item = retry_download(&state.content, id)
        .await
        .map_err(|err| AppError::InvalidFormData(err.to_string()))?;

    Ok(Json(item).into_response())
}

pub async fn do_clear_completed(
    State(state): State<AppState>,
) -> Result<Json<ClearedResponse>, AppError> {
    let cleared = clear_completed_downloads(&state.content).await;
    Ok(Json(ClearedResponse { cleared }))
}
