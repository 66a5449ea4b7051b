use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::Json,
};
use bytes::Bytes;

use super::optional;
use crate::db;
use crate::error::ApiError;
use crate::models::VideoUpload;
use crate::storage::video_filename;
use crate::AppState;

struct UploadedFile {
    original_name: Option<String>,
    content_type: String,
    data: Bytes,
}

// POST /api/upload/video - multipart `file` plus optional `exerciseId`
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<VideoUpload>), ApiError> {
    let mut file = None;
    let mut exercise_id = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let original_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                file = Some(UploadedFile {
                    original_name,
                    content_type,
                    data,
                });
            }
            Some("exerciseId") => exercise_id = optional(Some(field.text().await?)),
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::bad_request("file is required"))?;
    if !file.content_type.starts_with("video/") {
        return Err(ApiError::bad_request("file must be a video"));
    }
    if file.data.is_empty() {
        return Err(ApiError::bad_request("file is empty"));
    }

    // The exercise must exist before anything is stored.
    if let Some(exercise_id) = &exercise_id {
        if db::get_exercise_by_id(&state.pool, exercise_id).await?.is_none() {
            return Err(ApiError::not_found("Exercise not found"));
        }
    }

    let filename = video_filename(file.original_name.as_deref());
    let size = file.data.len();
    let url = state.videos.put(&filename, &file.content_type, file.data).await?;
    tracing::info!("Stored video {} ({} bytes)", filename, size);

    let exercise = match &exercise_id {
        Some(exercise_id) => Some(
            db::set_exercise_video(&state.pool, exercise_id, &url)
                .await?
                .ok_or_else(|| ApiError::not_found("Exercise not found"))?,
        ),
        None => None,
    };

    Ok((StatusCode::CREATED, Json(VideoUpload { url, filename, exercise })))
}
