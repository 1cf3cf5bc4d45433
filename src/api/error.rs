use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::UploadResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    Transfer(String),

    #[error("{0}")]
    Filesystem(#[from] std::io::Error),

    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Multipart(#[from] MultipartError),

    #[error("No files uploaded")]
    NoFiles,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Configuration(_)
            | AppError::Authorization(_)
            | AppError::Transfer(_)
            | AppError::Filesystem(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Parse(_) | AppError::NoFiles => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
        }
    }

    /// Message reported to the client
    pub fn client_message(&self) -> String {
        match self {
            AppError::NoFiles => self.to_string(),
            AppError::Multipart(e) => format!("Error: {}", e.body_text()),
            _ => format!("Error: {}", self),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Upload error: {:?}", self);
        } else {
            tracing::debug!("Rejected upload: {}", self);
        }

        (status, Json(UploadResponse::failed(self.client_message()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NoFiles.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Parse("Unexpected field".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Configuration("missing".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Transfer("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_message() {
        assert_eq!(AppError::NoFiles.client_message(), "No files uploaded");
        assert_eq!(
            AppError::Transfer("socket hang up".into()).client_message(),
            "Error: socket hang up"
        );
    }
}
