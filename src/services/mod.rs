pub mod cloud_providers;
pub mod staging;
pub mod upload_service;
