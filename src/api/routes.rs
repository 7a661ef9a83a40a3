//! API route definitions
//!
//! - /api/v1/well-structure - Run the schematic pipeline
//! - /api/v1/archives - Archived runs and their artifacts
//! - /health - Liveness

use axum::{routing::{get, post}, Router};

use super::handlers::{self, ApiState};

/// Create all v1 API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/well-structure", post(handlers::generate_well_structure))
        .route("/archives", get(handlers::list_archives))
        .route("/archives/:folder", get(handlers::get_archive))
        .route("/archives/:folder/image", get(handlers::get_archive_image))
        .route("/archives/:folder/report", get(handlers::get_archive_report))
        .with_state(state)
}

/// Health endpoint at root level
pub fn health_routes() -> Router {
    Router::new().route("/health", get(handlers::health_check))
}
