use super::{Authorizer, DriveStorage};
use crate::api::error::AppError;
use crate::config::GoogleConfig;
use crate::models::{CredentialHandle, DriveFileMetadata, RemoteObject};
use crate::utils::auth::{create_assertion, normalize_private_key};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use futures::{StreamExt, stream};
use reqwest::{Body, Client, StatusCode, header};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::debug;
use uuid::Uuid;

/// Lifetime assumed when the token response omits or garbles `expires_in`
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const MISSING_CREDENTIALS: &str = "Google Cloud credentials (GOOGLE_CLIENT_EMAIL and GOOGLE_PRIVATE_KEY) must be set in environment variables.";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Error body of the OAuth token endpoint
#[derive(Debug, Deserialize)]
struct OAuthError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Error body of the Drive API
#[derive(Debug, Deserialize)]
struct DriveErrorBody {
    error: DriveError,
}

#[derive(Debug, Deserialize)]
struct DriveError {
    message: String,
}

/// Exchanges a signed service-account assertion for an access token
pub struct GoogleAuthorizer {
    config: Arc<GoogleConfig>,
    client: Client,
}

impl GoogleAuthorizer {
    pub fn new(config: Arc<GoogleConfig>, client: Client) -> Self {
        Self { config, client }
    }

    fn credentials(&self) -> Result<(&str, String), AppError> {
        let email = self
            .config
            .client_email
            .as_deref()
            .filter(|v| !v.trim().is_empty());
        let key = self
            .config
            .private_key
            .as_deref()
            .map(normalize_private_key)
            .filter(|v| !v.trim().is_empty());

        match (email, key) {
            (Some(email), Some(key)) => Ok((email, key)),
            _ => Err(AppError::Configuration(MISSING_CREDENTIALS.to_string())),
        }
    }
}

#[async_trait]
impl Authorizer for GoogleAuthorizer {
    async fn authorize(&self) -> Result<CredentialHandle, AppError> {
        let (email, private_key) = self.credentials()?;
        let assertion = create_assertion(
            email,
            &private_key,
            &self.config.scope,
            &self.config.token_uri,
        )?;

        let response = self
            .client
            .post(&self.config.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Authorization(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Authorization(oauth_error_message(status, &text)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Authorization(format!("Invalid token response: {}", e)))?;

        debug!("Obtained access token for {}", email);

        Ok(CredentialHandle {
            access_token: token.access_token,
            token_type: token.token_type,
            expires_at: token_expiry(token.expires_in),
        })
    }
}

fn token_expiry(expires_in: Option<i64>) -> DateTime<Utc> {
    let now = Utc::now();
    expires_in
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or_else(|| now + Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
}

fn oauth_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<OAuthError>(body) {
        Ok(OAuthError {
            error,
            error_description: Some(description),
        }) => format!("{}: {}", error, description),
        Ok(OAuthError { error, .. }) => error,
        Err(_) => format!("Token request failed with status {}", status),
    }
}

fn drive_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<DriveErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| format!("Drive upload failed with status {}", status))
}

/// Creates files in a fixed Drive folder via `multipart/related` uploads
pub struct GoogleDriveStorage {
    config: Arc<GoogleConfig>,
    client: Client,
}

impl GoogleDriveStorage {
    pub fn new(config: Arc<GoogleConfig>, client: Client) -> Self {
        Self { config, client }
    }
}

#[async_trait]
impl DriveStorage for GoogleDriveStorage {
    async fn upload(
        &self,
        handle: &CredentialHandle,
        local_path: &Path,
        destination_name: &str,
    ) -> Result<RemoteObject, AppError> {
        let metadata = DriveFileMetadata {
            name: destination_name.to_string(),
            parents: vec![self.config.folder_id.clone()],
        };
        let metadata_json = serde_json::to_string(&metadata)
            .map_err(|e| AppError::Transfer(e.to_string()))?;

        let boundary = format!("relay-{}", Uuid::new_v4().simple());
        let head = format!(
            "--{boundary}\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {metadata_json}\r\n\
             --{boundary}\r\n\
             Content-Type: {}\r\n\r\n",
            mime::APPLICATION_OCTET_STREAM
        );
        let tail = format!("\r\n--{boundary}--\r\n");

        let file = tokio::fs::File::open(local_path).await?;
        let file_len = file.metadata().await?.len();
        let content_length = head.len() as u64 + file_len + tail.len() as u64;

        let body = stream::once(async move { Ok::<_, std::io::Error>(Bytes::from(head)) })
            .chain(ReaderStream::new(file))
            .chain(stream::once(async move { Ok(Bytes::from(tail)) }));

        debug!(
            "Uploading {} ({} bytes) to Drive folder {}",
            destination_name, file_len, self.config.folder_id
        );

        let response = self
            .client
            .post(&self.config.upload_url)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .bearer_auth(&handle.access_token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .header(header::CONTENT_LENGTH, content_length)
            .body(Body::wrap_stream(body))
            .send()
            .await
            .map_err(|e| AppError::Transfer(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Transfer(drive_error_message(status, &text)));
        }

        response
            .json::<RemoteObject>()
            .await
            .map_err(|e| AppError::Transfer(format!("Invalid Drive response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_error_message() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#;
        assert_eq!(
            oauth_error_message(StatusCode::BAD_REQUEST, body),
            "invalid_grant: Invalid JWT Signature."
        );
        assert_eq!(
            oauth_error_message(StatusCode::BAD_GATEWAY, "<html>"),
            "Token request failed with status 502 Bad Gateway"
        );
    }

    #[test]
    fn test_drive_error_message() {
        let body = r#"{"error":{"code":404,"message":"File not found: folder.","errors":[]}}"#;
        assert_eq!(
            drive_error_message(StatusCode::NOT_FOUND, body),
            "File not found: folder."
        );
    }

    #[test]
    fn test_token_expiry_survives_out_of_range_lifetimes() {
        let before = Utc::now();

        let default = token_expiry(None);
        assert!(default >= before + Duration::seconds(DEFAULT_TOKEN_TTL_SECS));

        let huge = token_expiry(Some(i64::MAX));
        assert!(huge >= before + Duration::seconds(DEFAULT_TOKEN_TTL_SECS));
        assert!(huge <= Utc::now() + Duration::seconds(DEFAULT_TOKEN_TTL_SECS));

        let short = token_expiry(Some(60));
        assert!(short >= before + Duration::seconds(60));
        assert!(short < before + Duration::seconds(DEFAULT_TOKEN_TTL_SECS));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_network() {
        let config = Arc::new(GoogleConfig {
            client_email: Some("relay@project.iam.gserviceaccount.com".into()),
            private_key: None,
            token_uri: "http://127.0.0.1:9/token".into(),
            ..GoogleConfig::default()
        });
        let authorizer = GoogleAuthorizer::new(config, Client::new());

        let err = authorizer.authorize().await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("GOOGLE_CLIENT_EMAIL"));
    }
}
