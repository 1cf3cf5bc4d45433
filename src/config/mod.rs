use std::env;
use std::path::PathBuf;

/// Google Drive folder every upload lands in
pub const DRIVE_FOLDER_ID: &str = "1PmgmVBCrN_g-Pw3Ydj-Ia3D3acllv3wV";

/// Full read/write access to Drive
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";

/// Multipart field carrying the uploaded files
pub const UPLOAD_FIELD: &str = "myFile";

/// Service-account settings used by the Drive clients
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Service-account email (`GOOGLE_CLIENT_EMAIL`)
    pub client_email: Option<String>,

    /// Service-account PEM key with literal `\n` escapes (`GOOGLE_PRIVATE_KEY`)
    pub private_key: Option<String>,

    /// Parent folder of every created file
    pub folder_id: String,

    /// OAuth scope requested for the access token
    pub scope: String,

    /// OAuth token endpoint
    pub token_uri: String,

    /// Drive media upload endpoint
    pub upload_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_email: None,
            private_key: None,
            folder_id: DRIVE_FOLDER_ID.to_string(),
            scope: DRIVE_SCOPE.to_string(),
            token_uri: GOOGLE_TOKEN_URI.to_string(),
            upload_url: DRIVE_UPLOAD_URL.to_string(),
        }
    }
}

impl GoogleConfig {
    pub fn has_credentials(&self) -> bool {
        self.client_email.is_some() && self.private_key.is_some()
    }
}

/// Process configuration, built once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Listen port (default: 3000)
    pub port: u16,

    /// Request body limit in bytes (default: 1 GB)
    pub max_file_size: usize,

    /// Directory uploads are staged in before transfer (default: "uploads")
    pub staging_dir: PathBuf,

    /// Directory served for `GET /*` (default: "public")
    pub static_dir: PathBuf,

    pub google: GoogleConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_file_size: 1024 * 1024 * 1024, // 1 GB
            staging_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("public"),
            google: GoogleConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            port: non_empty("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default.port),

            max_file_size: non_empty("MAX_FILE_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default.max_file_size),

            google: GoogleConfig {
                client_email: non_empty("GOOGLE_CLIENT_EMAIL"),
                private_key: non_empty("GOOGLE_PRIVATE_KEY"),
                ..default.google
            },

            ..default
        }
    }
}
