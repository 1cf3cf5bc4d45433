use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// JSON body of every `/upload` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
}

impl UploadResponse {
    pub fn uploaded(count: usize) -> Self {
        Self {
            success: true,
            message: format!("{} file(s) uploaded successfully!", count),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// A multipart file part materialized on local disk
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub original_name: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Access token obtained for the service account
#[derive(Debug, Clone)]
pub struct CredentialHandle {
    pub access_token: String,
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

/// Metadata sent with a Drive file creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFileMetadata {
    pub name: String,
    pub parents: Vec<String>,
}

/// Identifier Drive assigns to a created file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteObject {
    pub id: String,
}
