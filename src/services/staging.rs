use axum::extract::{Multipart, multipart::MultipartError};
use futures::TryStreamExt;
use std::io;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::error::AppError;
use crate::models::StagedFile;

/// Streams every file part under `field_name` into `staging_dir`.
///
/// Text parts are skipped, as are file inputs submitted without a file. A file
/// part under any other field name rejects the whole request. On error every
/// file already staged for this request is removed.
pub async fn stage_multipart(
    multipart: &mut Multipart,
    staging_dir: &Path,
    field_name: &str,
) -> Result<Vec<StagedFile>, AppError> {
    let mut staged = Vec::new();

    match stage_fields(multipart, staging_dir, field_name, &mut staged).await {
        Ok(()) => Ok(staged),
        Err(e) => {
            discard_all(&staged).await;
            Err(e)
        }
    }
}

async fn stage_fields(
    multipart: &mut Multipart,
    staging_dir: &Path,
    field_name: &str,
    staged: &mut Vec<StagedFile>,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let Some(original_name) = field.file_name().map(|s| s.to_string()) else {
            continue;
        };

        if original_name.is_empty() {
            continue;
        }
        if name != field_name {
            return Err(AppError::Parse(format!("Unexpected field: {}", name)));
        }

        fs::create_dir_all(staging_dir).await?;
        let path = staging_dir.join(Uuid::new_v4().to_string());
        let mut file = fs::File::create(&path).await?;

        let body = field.map_err(io::Error::other);
        let mut reader = StreamReader::new(body);

        let copied = tokio::io::copy(&mut reader, &mut file).await;
        let flushed = match copied {
            Ok(size) => file.flush().await.map(|_| size),
            Err(e) => Err(e),
        };

        match flushed {
            Ok(size) => {
                debug!("Staged {} ({} bytes) at {}", original_name, size, path.display());
                staged.push(StagedFile {
                    original_name,
                    path,
                    size,
                });
            }
            Err(e) => {
                drop(file);
                discard(&path).await;
                return Err(read_error(&original_name, e));
            }
        }
    }

    Ok(())
}

/// Body errors surface wrapped in `io::Error` by `StreamReader`; OS errors come
/// from writing the staged copy.
fn read_error(original_name: &str, e: io::Error) -> AppError {
    if e.get_ref().is_none() {
        return AppError::Filesystem(e);
    }

    let message = e.to_string();
    match e.into_inner().map(|inner| inner.downcast::<MultipartError>()) {
        Some(Ok(multipart)) => AppError::Multipart(*multipart),
        _ => AppError::Parse(format!("Failed to read {}: {}", original_name, message)),
    }
}

/// Remove a staged file, logging instead of failing
pub async fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        warn!("Failed to delete temporary file {}: {}", path.display(), e);
    }
}

pub async fn discard_all(files: &[StagedFile]) {
    for file in files {
        discard(&file.path).await;
    }
}
