pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::cloud_providers::google_drive::{GoogleAuthorizer, GoogleDriveStorage};
use crate::services::upload_service::UploadService;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::services::ServeDir;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(api::handlers::upload::upload_files),
    components(schemas(models::UploadResponse)),
    tags(
        (name = "upload", description = "Relay files to Google Drive")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub upload_service: Arc<UploadService>,
}

impl AppState {
    /// State backed by the real Google endpoints
    pub fn google(config: AppConfig) -> Self {
        let google = Arc::new(config.google.clone());
        let http = reqwest::Client::new();

        let upload_service = UploadService::new(
            Arc::new(GoogleAuthorizer::new(google.clone(), http.clone())),
            Arc::new(GoogleDriveStorage::new(google, http)),
        );

        Self {
            config: Arc::new(config),
            upload_service: Arc::new(upload_service),
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route(
            "/upload",
            post(api::handlers::upload::upload_files)
                .layer(DefaultBodyLimit::max(state.config.max_file_size)),
        )
        .route("/api-docs/openapi.json", get(openapi_json))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .with_state(state)
}
