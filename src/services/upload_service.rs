use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info};

use crate::api::error::AppError;
use crate::models::{CredentialHandle, RemoteObject, StagedFile};
use crate::services::cloud_providers::{Authorizer, DriveStorage};
use crate::services::staging;

/// Relays staged files to Drive
pub struct UploadService {
    authorizer: Arc<dyn Authorizer>,
    storage: Arc<dyn DriveStorage>,
}

impl UploadService {
    pub fn new(authorizer: Arc<dyn Authorizer>, storage: Arc<dyn DriveStorage>) -> Self {
        Self {
            authorizer,
            storage,
        }
    }

    /// Transfers every file concurrently and reports the batch as a whole.
    ///
    /// One credential is obtained for the batch. Each file's temporary copy is
    /// deleted as soon as its own transfer succeeds; a failed file is left in
    /// the staging directory. If any transfer fails the batch fails with the
    /// first error in request order, even though the other files may already
    /// be stored remotely.
    pub async fn relay(&self, files: Vec<StagedFile>) -> Result<usize, AppError> {
        if files.is_empty() {
            return Err(AppError::NoFiles);
        }

        let handle = match self.authorizer.authorize().await {
            Ok(handle) => handle,
            Err(e) => {
                staging::discard_all(&files).await;
                return Err(e);
            }
        };

        let results = join_all(files.iter().map(|file| self.relay_one(&handle, file))).await;

        let mut first_error = None;
        for (file, result) in files.iter().zip(results) {
            if let Err(e) = result {
                error!(
                    "Transfer of {} failed, leaving {}: {}",
                    file.original_name,
                    file.path.display(),
                    e
                );
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(files.len()),
        }
    }

    async fn relay_one(
        &self,
        handle: &CredentialHandle,
        file: &StagedFile,
    ) -> Result<RemoteObject, AppError> {
        let remote = self
            .storage
            .upload(handle, &file.path, &file.original_name)
            .await?;

        info!(
            "☁️  Uploaded {} ({} bytes) as Drive file {}",
            file.original_name, file.size, remote.id
        );
        staging::discard(&file.path).await;

        Ok(remote)
    }
}
