use crate::api::error::AppError;
use crate::config::UPLOAD_FIELD;
use crate::models::UploadResponse;
use crate::services::staging;
use axum::{
    Json,
    extract::{Multipart, State},
};

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = String, description = "One or more files under the `myFile` field", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "All files uploaded", body = UploadResponse),
        (status = 400, description = "No files uploaded or malformed body", body = UploadResponse),
        (status = 500, description = "Authorization or transfer failure", body = UploadResponse)
    ),
    tag = "upload"
)]
pub async fn upload_files(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let files =
        staging::stage_multipart(&mut multipart, &state.config.staging_dir, UPLOAD_FIELD).await?;

    let count = state.upload_service.relay(files).await?;

    Ok(Json(UploadResponse::uploaded(count)))
}
