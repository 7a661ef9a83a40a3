//! REST API module using Axum
//!
//! HTTP surface over the well schematic pipeline:
//! - `POST /api/v1/well-structure` runs one orchestration
//! - `GET  /api/v1/archives[/...]` reads back archived runs
//! - `GET  /health` liveness probe

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ApiState;

use crate::config::defaults;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `WELL_SCHEMATIC_CORS_ORIGINS` to a comma-separated list of allowed
/// origins to let a browser front-end on another origin call the API.
fn build_cors_layer() -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match std::env::var("WELL_SCHEMATIC_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            base.allow_origin(allowed)
        }
        Err(_) => base,
    }
}

/// Create the complete application router.
pub fn create_app(state: ApiState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes(state))
        .merge(routes::health_routes())
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(defaults::MAX_REQUEST_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}
