use async_trait::async_trait;
use std::path::Path;

use crate::api::error::AppError;
use crate::models::{CredentialHandle, RemoteObject};

/// Produces a credential for the storage provider
#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Fails with `AppError::Configuration` when credentials are missing
    async fn authorize(&self) -> Result<CredentialHandle, AppError>;
}

/// Stores local files in the fixed remote folder
#[async_trait]
pub trait DriveStorage: Send + Sync {
    /// Stream `local_path` to the provider under `destination_name`
    async fn upload(
        &self,
        handle: &CredentialHandle,
        local_path: &Path,
        destination_name: &str,
    ) -> Result<RemoteObject, AppError>;
}

pub mod google_drive;
