use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

use crate::api::error::AppError;

/// Lifetime Google accepts for a service-account assertion
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Claims of the JWT exchanged for a Google access token
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Environment variables cannot hold multi-line values, so PEM keys arrive with
/// literal `\n` sequences in place of line breaks.
pub fn normalize_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

/// Sign an RS256 assertion for the service account
pub fn create_assertion(
    client_email: &str,
    private_key_pem: &str,
    scope: &str,
    audience: &str,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = AssertionClaims {
        iss: client_email.to_owned(),
        scope: scope.to_owned(),
        aud: audience.to_owned(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
    };

    let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| AppError::Configuration(format!("Invalid GOOGLE_PRIVATE_KEY: {}", e)))?;

    encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| AppError::Configuration(format!("Failed to sign assertion: {}", e)))
}
